//! 대화형 콘솔 명령.
//!
//! 명령 피드백은 표준 출력에 직접 쓰고, 결과 싱크는 표시 루프만 사용한다.

use cragsight_core::error::CoreError;

/// 표준 입력 한 줄에서 해석한 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enter: 캡처 사이클 시작
    Capture,
    /// `c`: 진행 중 사이클 취소
    Cancel,
    /// `s`: 현재 상태 출력
    Status,
    /// `q`: 종료
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" => Command::Capture,
            "c" | "cancel" => Command::Cancel,
            "s" | "status" => Command::Status,
            "q" | "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// 대화형 모드 도움말
pub const HELP: &str = "[Enter] 캡처  [c] 취소  [s] 상태  [q] 종료";

/// 트리거 거부 피드백 문구
pub fn rejection_notice(err: &CoreError) -> String {
    format!("캡처 거부: {err}")
}
