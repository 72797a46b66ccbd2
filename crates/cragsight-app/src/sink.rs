//! 결과 표시.
//!
//! 포그라운드 표시 루프만 `ResultSink`를 호출한다.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use cragsight_core::models::cycle::CycleReport;
use cragsight_core::ports::result_sink::ResultSink;

/// 콘솔 출력 싱크
pub struct ConsoleSink<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> ResultSink for ConsoleSink<W> {
    fn display(&self, text: &str) {
        let mut out = self.out.lock();
        let written = writeln!(out, "\n{text}\n").and_then(|_| out.flush());
        if let Err(e) = written {
            debug!("결과 출력 실패: {}", e);
        }
    }
}

/// 사이클 보고를 받아 싱크에 표시하는 포그라운드 루프
///
/// 종료 신호 또는 모든 송신측이 닫히면 끝난다. 표시한 보고 수를 반환.
pub async fn run_display_loop(
    mut reports: mpsc::UnboundedReceiver<CycleReport>,
    sink: Arc<dyn ResultSink>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> usize {
    let mut displayed = 0usize;
    loop {
        tokio::select! {
            report = reports.recv() => {
                let Some(report) = report else {
                    debug!("보고 채널 닫힘");
                    break;
                };
                debug!(cycle = %report.cycle_id, success = report.is_success(), "사이클 보고 수신");
                sink.display(report.display_text());
                displayed += 1;
            }
            _ = shutdown_rx.changed() => {
                info!("표시 루프 종료");
                break;
            }
        }
    }
    displayed
}
