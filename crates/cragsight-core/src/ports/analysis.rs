//! 원격 분석 클라이언트 포트.
//!
//! 구현: `cragsight-network::analysis_client::ChatCompletionClient`

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::analysis::AnalysisResult;
use crate::models::chat::ChatMessage;

/// Chat completion 기반 이미지 분석
///
/// 캡처마다 1회 호출. 재시도/캐시/스트리밍 없음.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// 메시지 시퀀스를 전송하고 첫 choice 텍스트를 반환.
    ///
    /// choice가 없으면 `AnalysisResult::Unavailable`, 호출 실패는 `CoreError::RemoteCall`.
    async fn analyze(&self, messages: Vec<ChatMessage>) -> Result<AnalysisResult, CoreError>;

    /// 모델 식별자 (예: "gpt-4o-mini")
    fn model(&self) -> &str;
}
