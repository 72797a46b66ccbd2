//! 캡처 사이클 상태 및 결과 보고 모델.
//!
//! `Idle → Capturing → Normalizing → Requesting → Displaying | Failed → Idle`

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;

/// 캡처 사이클 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleState {
    /// 대기: 새 캡처 가능
    #[default]
    Idle,
    /// 캡처 소스에서 프레임 수신 중
    Capturing,
    /// 디코딩/리사이즈/인코딩 중
    Normalizing,
    /// 원격 분석 API 응답 대기 중
    Requesting,
    /// 결과를 포그라운드로 전달 중
    Displaying,
    /// 에러로 종료 중
    Failed,
}

impl CycleState {
    /// 새 캡처를 시작할 수 있는 상태인지
    pub fn is_idle(&self) -> bool {
        matches!(self, CycleState::Idle)
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Idle => "idle",
            CycleState::Capturing => "capturing",
            CycleState::Normalizing => "normalizing",
            CycleState::Requesting => "requesting",
            CycleState::Displaying => "displaying",
            CycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 사이클 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(Uuid);

impl CycleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 사이클 최종 결과: 분석 텍스트 또는 에러 메시지 중 하나만
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleOutcome {
    Analysis(AnalysisResult),
    Failed(String),
}

/// 백그라운드 작업이 포그라운드로 넘기는 사이클 보고
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn analysis(cycle_id: CycleId, result: AnalysisResult) -> Self {
        Self {
            cycle_id,
            outcome: CycleOutcome::Analysis(result),
        }
    }

    pub fn failed(cycle_id: CycleId, message: impl Into<String>) -> Self {
        Self {
            cycle_id,
            outcome: CycleOutcome::Failed(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Analysis(_))
    }

    /// 결과 싱크에 표시할 단일 문자열
    pub fn display_text(&self) -> &str {
        match &self.outcome {
            CycleOutcome::Analysis(result) => result.text(),
            CycleOutcome::Failed(message) => message,
        }
    }
}
