//! 라이프사이클 관리.
//!
//! 종료 신호 전파와 Ctrl-C 처리.

use tokio::sync::watch;
use tracing::{error, info};

/// 라이프사이클 관리자
pub struct LifecycleManager {
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    /// 종료 수신기 복제
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// 종료 신호 발송
    pub fn shutdown(&self) {
        if self.is_shutting_down() {
            return;
        }
        info!("종료 신호 발송");
        let _ = self.shutdown_tx.send(true);
    }

    /// Ctrl-C 대기 후 종료 신호 발송
    pub async fn wait_for_signal(&self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C 수신"),
            Err(e) => {
                error!("Ctrl+C 핸들러 등록 실패: {}", e);
                return;
            }
        }
        self.shutdown();
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
