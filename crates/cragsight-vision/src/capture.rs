//! 캡처 소스 어댑터.
//!
//! - [`FileCaptureSource`]: 디스크의 이미지 파일을 한 장 읽는다 (CLI 호스트용)
//! - [`ChannelCaptureSource`]: 카메라 스택을 가진 임베딩 호스트에 캡처를 요청하고
//!   단발성 채널로 완료를 받는다 (콜백 기반 플랫폼 API 브리지)

use async_trait::async_trait;
use cragsight_core::error::CoreError;
use cragsight_core::models::image::CapturedFrame;
use cragsight_core::ports::capture::CaptureSource;
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

// ============================================================
// FileCaptureSource
// ============================================================

/// 파일 캡처 소스: 캡처마다 파일을 새로 읽는다
#[derive(Debug, Clone)]
pub struct FileCaptureSource {
    path: PathBuf,
    name: String,
}

impl FileCaptureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CaptureSource for FileCaptureSource {
    async fn capture(&self) -> Result<CapturedFrame, CoreError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CoreError::Capture(format!("{}: {e}", self.name)))?;

        if data.is_empty() {
            return Err(CoreError::Capture(format!("{}: 빈 파일", self.name)));
        }

        debug!(path = %self.name, bytes = data.len(), "파일 캡처 완료");
        Ok(CapturedFrame::new(data, self.name.clone()))
    }

    fn is_ready(&self) -> bool {
        self.path.is_file()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

// ============================================================
// 단발성 완료 채널
// ============================================================

type CaptureCompletion = Result<Vec<u8>, String>;

/// 캡처 완료 송신측: 호스트가 한 번만 성공/실패를 보고한다
#[derive(Debug)]
pub struct CaptureCompleter {
    tx: oneshot::Sender<CaptureCompletion>,
}

impl CaptureCompleter {
    /// 캡처 성공 (인코딩된 이미지 바이트)
    pub fn succeed(self, data: Vec<u8>) {
        if self.tx.send(Ok(data)).is_err() {
            debug!("캡처 대기측이 이미 종료됨");
        }
    }

    /// 캡처 실패 사유 보고
    pub fn fail(self, reason: impl Into<String>) {
        if self.tx.send(Err(reason.into())).is_err() {
            debug!("캡처 대기측이 이미 종료됨");
        }
    }
}

/// 캡처 완료 수신측
#[derive(Debug)]
pub struct PendingCapture {
    rx: oneshot::Receiver<CaptureCompletion>,
    source: String,
}

impl PendingCapture {
    /// 완료까지 대기
    pub async fn wait(self) -> Result<CapturedFrame, CoreError> {
        match self.rx.await {
            Ok(Ok(data)) => Ok(CapturedFrame::new(data, self.source)),
            Ok(Err(reason)) => Err(CoreError::Capture(reason)),
            Err(_) => Err(CoreError::Capture(format!(
                "{}: 완료 보고 없이 캡처 종료",
                self.source
            ))),
        }
    }
}

/// 단발성 캡처 채널 생성
pub fn capture_channel(source: impl Into<String>) -> (CaptureCompleter, PendingCapture) {
    let (tx, rx) = oneshot::channel();
    (
        CaptureCompleter { tx },
        PendingCapture {
            rx,
            source: source.into(),
        },
    )
}

// ============================================================
// ChannelCaptureSource
// ============================================================

/// 채널 캡처 소스: 캡처 요청마다 `CaptureCompleter`를 호스트로 보낸다
///
/// 호스트는 `mpsc::Receiver<CaptureCompleter>`에서 요청을 받아 카메라 촬영 후 완료를 보고한다.
#[derive(Debug, Clone)]
pub struct ChannelCaptureSource {
    requests: mpsc::Sender<CaptureCompleter>,
    name: String,
}

impl ChannelCaptureSource {
    /// 새 소스와 호스트용 요청 수신기 생성
    pub fn new(name: impl Into<String>) -> (Self, mpsc::Receiver<CaptureCompleter>) {
        let (requests, rx) = mpsc::channel(1);
        (
            Self {
                requests,
                name: name.into(),
            },
            rx,
        )
    }
}

#[async_trait]
impl CaptureSource for ChannelCaptureSource {
    async fn capture(&self) -> Result<CapturedFrame, CoreError> {
        let (completer, pending) = capture_channel(self.name.clone());
        self.requests
            .send(completer)
            .await
            .map_err(|_| CoreError::SourceNotReady(format!("{}: 호스트 연결 끊김", self.name)))?;
        pending.wait().await
    }

    fn is_ready(&self) -> bool {
        !self.requests.is_closed()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn file_capture_reads_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF]).unwrap();

        let source = FileCaptureSource::new(file.path());
        assert!(source.is_ready());
        let frame = source.capture().await.unwrap();
        assert_eq!(frame.data, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(frame.source, source.source_name());
    }

    #[tokio::test]
    async fn file_capture_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileCaptureSource::new(dir.path().join("missing.jpg"));
        assert!(!source.is_ready());
        let err = source.capture().await.unwrap_err();
        assert!(matches!(err, CoreError::Capture(_)));
    }

    #[tokio::test]
    async fn file_capture_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = FileCaptureSource::new(file.path());
        assert!(matches!(
            source.capture().await,
            Err(CoreError::Capture(_))
        ));
    }

    #[tokio::test]
    async fn completer_success() {
        let (completer, pending) = capture_channel("camera-0");
        completer.succeed(vec![1, 2, 3]);
        let frame = pending.wait().await.unwrap();
        assert_eq!(frame.data, vec![1, 2, 3]);
        assert_eq!(frame.source, "camera-0");
    }

    #[tokio::test]
    async fn completer_failure_reason() {
        let (completer, pending) = capture_channel("camera-0");
        completer.fail("셔터 실패");
        let err = pending.wait().await.unwrap_err();
        assert!(err.to_string().contains("셔터 실패"));
    }

    #[tokio::test]
    async fn dropped_completer_is_capture_error() {
        let (completer, pending) = capture_channel("camera-0");
        drop(completer);
        assert!(matches!(pending.wait().await, Err(CoreError::Capture(_))));
    }

    #[tokio::test]
    async fn channel_source_roundtrip() {
        let (source, mut requests) = ChannelCaptureSource::new("camera-back");
        let host = tokio::spawn(async move {
            let completer = requests.recv().await.unwrap();
            completer.succeed(vec![9, 9]);
        });

        let frame = source.capture().await.unwrap();
        assert_eq!(frame.data, vec![9, 9]);
        host.await.unwrap();
    }

    #[tokio::test]
    async fn channel_source_host_gone() {
        let (source, requests) = ChannelCaptureSource::new("camera-back");
        drop(requests);
        assert!(!source.is_ready());
        assert!(matches!(
            source.capture().await,
            Err(CoreError::SourceNotReady(_))
        ));
    }
}
