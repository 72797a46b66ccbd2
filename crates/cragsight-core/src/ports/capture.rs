//! 캡처 소스 포트.
//!
//! 구현: `cragsight-vision` crate (`FileCaptureSource`, `ChannelCaptureSource`)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::image::CapturedFrame;

/// 캡처 소스: 요청 시 원본 프레임 1장 생성
///
/// 플랫폼 콜백 대신 await 가능한 단일 호출로 완료를 전달한다.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// 프레임 1장 캡처. 실패 사유는 `CoreError::Capture`로 반환.
    async fn capture(&self) -> Result<CapturedFrame, CoreError>;

    /// 캡처 가능한 상태인지 (카메라 바인딩, 파일 존재 등)
    fn is_ready(&self) -> bool {
        true
    }

    /// 소스 이름 (로그용)
    fn source_name(&self) -> &str;
}
