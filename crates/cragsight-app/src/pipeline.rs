//! 캡처 사이클 파이프라인.
//!
//! 캡처 → 정규화 → 프롬프트 → 원격 분석을 백그라운드 태스크 하나에서 순차 실행하고
//! 결과를 채널로 포그라운드 표시 루프에 넘긴다.
//!
//! `Idle → Capturing → Normalizing → Requesting → Displaying | Failed → Idle`
//!
//! 동시에 하나의 사이클만 허용한다. 진행 중 트리거는 `CaptureInProgress`로 거부.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use cragsight_core::error::CoreError;
use cragsight_core::models::analysis::AnalysisResult;
use cragsight_core::models::cycle::{CycleId, CycleReport, CycleState};
use cragsight_core::ports::analysis::AnalysisClient;
use cragsight_core::ports::capture::CaptureSource;
use cragsight_core::ports::normalizer::ImageNormalizer;
use cragsight_network::prompt::PromptBuilder;

/// 캡처 사이클 파이프라인
pub struct CapturePipeline {
    source: Arc<dyn CaptureSource>,
    normalizer: Arc<dyn ImageNormalizer>,
    prompt: Arc<PromptBuilder>,
    client: Arc<dyn AnalysisClient>,
    state: Arc<Mutex<CycleState>>,
    report_tx: mpsc::UnboundedSender<CycleReport>,
    /// 원격 분석 단계 타임아웃 (None이면 HTTP 클라이언트 타임아웃만 적용)
    request_timeout: Option<Duration>,
}

impl CapturePipeline {
    pub fn new(
        source: Arc<dyn CaptureSource>,
        normalizer: Arc<dyn ImageNormalizer>,
        prompt: PromptBuilder,
        client: Arc<dyn AnalysisClient>,
        report_tx: mpsc::UnboundedSender<CycleReport>,
    ) -> Self {
        Self {
            source,
            normalizer,
            prompt: Arc::new(prompt),
            client,
            state: Arc::new(Mutex::new(CycleState::Idle)),
            report_tx,
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 현재 사이클 상태
    pub fn state(&self) -> CycleState {
        *self.state.lock()
    }

    pub fn source_name(&self) -> &str {
        self.source.source_name()
    }

    /// 새 캡처 사이클 시작
    ///
    /// 상태 확인과 `Capturing` 전이는 같은 락 안에서 수행된다.
    /// tokio 런타임 컨텍스트에서 호출해야 한다.
    pub fn trigger(&self) -> Result<CycleHandle, CoreError> {
        {
            let mut state = self.state.lock();
            if !state.is_idle() {
                let current = *state;
                debug!(state = %current, "사이클 진행 중, 트리거 거부");
                return Err(CoreError::CaptureInProgress);
            }
            if !self.source.is_ready() {
                return Err(CoreError::SourceNotReady(
                    self.source.source_name().to_string(),
                ));
            }
            *state = CycleState::Capturing;
        }

        let cycle_id = CycleId::new();
        info!(cycle = %cycle_id, source = %self.source.source_name(), "캡처 사이클 시작");

        let guard = CycleGuard {
            cycle_id,
            state: Arc::clone(&self.state),
            report_tx: self.report_tx.clone(),
            reported: false,
        };
        let worker = CycleWorker {
            source: Arc::clone(&self.source),
            normalizer: Arc::clone(&self.normalizer),
            prompt: Arc::clone(&self.prompt),
            client: Arc::clone(&self.client),
            request_timeout: self.request_timeout,
        };

        let join = tokio::spawn(async move {
            let result = worker.execute(&guard).await;
            guard.finish(result);
        });

        Ok(CycleHandle { cycle_id, join })
    }
}

// ============================================================
// 사이클 핸들
// ============================================================

/// 실행 중인 사이클 핸들: 취소 및 완료 대기
#[derive(Debug)]
pub struct CycleHandle {
    cycle_id: CycleId,
    join: JoinHandle<()>,
}

impl CycleHandle {
    pub fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    /// 사이클 취소: 다음 중단 지점에서 `Cancelled` 보고 후 `Idle` 복귀
    pub fn cancel(&self) {
        debug!(cycle = %self.cycle_id, "사이클 취소 요청");
        self.join.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// 백그라운드 태스크 종료 대기
    pub async fn wait(self) -> Result<(), CoreError> {
        match self.join.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Err(CoreError::Cancelled),
            Err(e) => Err(CoreError::Internal(format!("사이클 태스크 실패: {e}"))),
        }
    }
}

// ============================================================
// 백그라운드 작업
// ============================================================

struct CycleWorker {
    source: Arc<dyn CaptureSource>,
    normalizer: Arc<dyn ImageNormalizer>,
    prompt: Arc<PromptBuilder>,
    client: Arc<dyn AnalysisClient>,
    request_timeout: Option<Duration>,
}

impl CycleWorker {
    async fn execute(&self, guard: &CycleGuard) -> Result<AnalysisResult, CoreError> {
        let frame = self.source.capture().await?;
        debug!(cycle = %guard.cycle_id, bytes = frame.len(), "프레임 수신");

        guard.transition(CycleState::Normalizing);
        let normalizer = Arc::clone(&self.normalizer);
        let image = tokio::task::spawn_blocking(move || normalizer.normalize(frame))
            .await
            .map_err(|e| CoreError::Internal(format!("정규화 작업 실패: {e}")))??;

        let messages = self.prompt.build(image)?;

        guard.transition(CycleState::Requesting);
        let analysis = self.client.analyze(messages);
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, analysis)
                .await
                .map_err(|_| CoreError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => analysis.await,
        }
    }
}

/// 사이클 종료 가드
///
/// 정상 종료든 취소(abort)든 드롭 시 반드시 `Idle`로 복귀하며,
/// 보고 없이 드롭되면 `Cancelled`를, 패닉 언와인딩 중이면 `Internal`을 보고한다.
struct CycleGuard {
    cycle_id: CycleId,
    state: Arc<Mutex<CycleState>>,
    report_tx: mpsc::UnboundedSender<CycleReport>,
    reported: bool,
}

impl CycleGuard {
    fn transition(&self, next: CycleState) {
        *self.state.lock() = next;
        debug!(cycle = %self.cycle_id, state = %next, "사이클 상태 전이");
    }

    fn finish(mut self, result: Result<AnalysisResult, CoreError>) {
        let report = match result {
            Ok(analysis) => {
                self.transition(CycleState::Displaying);
                info!(
                    cycle = %self.cycle_id,
                    available = analysis.is_available(),
                    "캡처 사이클 완료"
                );
                CycleReport::analysis(self.cycle_id, analysis)
            }
            Err(e) => {
                self.transition(CycleState::Failed);
                if e.is_pre_network() {
                    warn!(cycle = %self.cycle_id, "원격 호출 전 사이클 실패: {}", e);
                } else {
                    warn!(cycle = %self.cycle_id, "캡처 사이클 실패: {}", e);
                }
                CycleReport::failed(self.cycle_id, e.to_string())
            }
        };

        self.reported = true;
        self.transition(CycleState::Idle);
        self.send(report);
    }

    fn send(&self, report: CycleReport) {
        if self.report_tx.send(report).is_err() {
            debug!(cycle = %self.cycle_id, "표시 루프 종료됨, 보고 폐기");
        }
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if self.reported {
            return;
        }
        *self.state.lock() = CycleState::Idle;
        let reason = if std::thread::panicking() {
            error!(cycle = %self.cycle_id, "캡처 사이클 태스크 패닉");
            CoreError::Internal("사이클 태스크 패닉".to_string())
        } else {
            info!(cycle = %self.cycle_id, "캡처 사이클 취소됨");
            CoreError::Cancelled
        };
        self.send(CycleReport::failed(self.cycle_id, reason.to_string()));
    }
}

// ============================================================
// 테스트
// ============================================================
