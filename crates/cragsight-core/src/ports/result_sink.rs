//! 결과 표시 포트.
//!
//! 포그라운드 컨텍스트만 호출한다. 백그라운드 작업은 채널로 결과를 넘긴다.

/// 분석 텍스트 또는 에러 메시지를 사용자에게 표시
pub trait ResultSink: Send + Sync {
    fn display(&self, text: &str);
}
