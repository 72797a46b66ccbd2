//! CRAGSIGHT 핵심 에러 타입.
//!
//! 캡처 사이클의 모든 단계(캡처 → 정규화 → 프롬프트 → 분석)가
//! 이 에러 하나로 실패를 표현한다. 사이클 경계에서 사용자 메시지로 변환된다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 이미지 디코딩 실패 (손상되었거나 지원하지 않는 포맷)
    #[error("이미지 디코딩 실패: {0}")]
    Decode(String),

    /// 이미지 크기 이상 (높이 0, 너비 0, 비정상 종횡비)
    #[error("잘못된 이미지 크기: {width}x{height}")]
    InvalidDimensions {
        /// 원본 너비
        width: u32,
        /// 원본 높이
        height: u32,
    },

    /// 인코딩 결과가 비어 있음 (프롬프트에 첨부할 이미지 없음)
    #[error("인코딩된 이미지가 비어 있음")]
    EmptyPayload,

    /// 원격 분석 API 호출 실패 (네트워크, 인증, 응답 파싱)
    #[error("원격 호출 실패: {0}")]
    RemoteCall(String),

    /// 캡처 소스 실패
    #[error("캡처 실패: {0}")]
    Capture(String),

    /// 캡처 소스 준비 안 됨
    #[error("캡처 소스 준비 안 됨: {0}")]
    SourceNotReady(String),

    /// 이전 캡처 사이클이 아직 진행 중
    #[error("이전 캡처 사이클 진행 중")]
    CaptureInProgress,

    /// 사용자가 사이클을 취소함
    #[error("캡처 사이클 취소됨")]
    Cancelled,

    /// 사이클 타임아웃
    #[error("실행 타임아웃: {timeout_ms}ms 초과")]
    Timeout {
        /// 초과된 타임아웃 시간 (밀리초)
        timeout_ms: u64,
    },

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패 [{field}]: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 네트워크 호출 이전 단계에서 발생한 에러인지 여부
    ///
    /// `Decode`/`InvalidDimensions`/`EmptyPayload`는 원격 호출 없이 사이클을 끝낸다.
    pub fn is_pre_network(&self) -> bool {
        matches!(
            self,
            CoreError::Decode(_)
                | CoreError::InvalidDimensions { .. }
                | CoreError::EmptyPayload
                | CoreError::Capture(_)
                | CoreError::SourceNotReady(_)
        )
    }
}
