//! 이미지 정규화 포트.
//!
//! 구현: `cragsight-vision::normalizer::JpegNormalizer`

use crate::error::CoreError;
use crate::models::image::{CapturedFrame, EncodedImage};

/// 원본 프레임 → 너비 제한 JPEG + Base64
///
/// CPU 바운드 작업이므로 동기 trait. 호출자가 blocking 스레드에서 실행한다.
/// 프레임 소유권을 받아 인코딩 완료 시점에 원본/중간 버퍼를 해제해야 한다.
pub trait ImageNormalizer: Send + Sync {
    fn normalize(&self, frame: CapturedFrame) -> Result<EncodedImage, CoreError>;
}
