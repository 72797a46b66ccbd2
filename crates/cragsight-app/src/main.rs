//! # cragsight-app
//!
//! CRAGSIGHT 바이너리 진입점.
//! 어댑터 DI 와이어링, 캡처 사이클 트리거, 포그라운드 결과 표시.

mod command;
mod credentials;
mod lifecycle;
mod pipeline;
mod sink;

use anyhow::{anyhow, Result};
use clap::Parser;
use cragsight_core::config::AppConfig;
use cragsight_core::config_manager::ConfigManager;
use cragsight_core::models::cycle::CycleReport;
use cragsight_core::ports::analysis::AnalysisClient;
use cragsight_core::ports::capture::CaptureSource;
use cragsight_core::ports::normalizer::ImageNormalizer;
use cragsight_core::ports::result_sink::ResultSink;
use cragsight_network::analysis_client::ChatCompletionClient;
use cragsight_network::prompt::PromptBuilder;
use cragsight_vision::capture::FileCaptureSource;
use cragsight_vision::normalizer::JpegNormalizer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::Command;
use crate::lifecycle::LifecycleManager;
use crate::pipeline::{CapturePipeline, CycleHandle};
use crate::sink::ConsoleSink;

/// CRAGSIGHT 볼더링 루트 분석기
///
/// 볼더링 벽 사진을 캡처해 AI로 루트 난이도와 핵심 동작을 평가한다.
#[derive(Parser, Debug)]
#[command(name = "cragsight")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 캡처 소스 이미지 파일 (캡처마다 새로 읽음)
    #[arg(long, short = 'i')]
    image: PathBuf,

    /// 사이클 1회 실행 후 종료
    #[arg(long)]
    once: bool,

    /// 모델 이름 오버라이드 (예: gpt-4o-mini)
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// chat completion 엔드포인트 오버라이드
    #[arg(long)]
    endpoint: Option<String>,

    /// 대상 루트 홀드 색상 (예: blue, yellow)
    #[arg(long, short = 'r')]
    route_color: Option<String>,

    /// 리사이즈 목표 너비 (픽셀)
    #[arg(long)]
    target_width: Option<u32>,

    /// JPEG 품질 (1-100)
    #[arg(long, short = 'q')]
    quality: Option<u8>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

impl Args {
    /// CLI 인자로 설정 오버라이드
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(model) = &self.model {
            config.analysis.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.analysis.endpoint = endpoint.clone();
        }
        if let Some(color) = &self.route_color {
            config.analysis.route_color = color.clone();
        }
        if let Some(width) = self.target_width {
            config.vision.target_width = width;
        }
        if let Some(quality) = self.quality {
            config.vision.jpeg_quality = quality;
        }
    }
}

/// 배너 출력
fn print_banner() {
    println!();
    println!("╔══════════════════════════════════════════════╗");
    println!("║                                              ║");
    println!("║   C R A G S I G H T                          ║");
    println!("║   볼더링 루트 AI 분석기                      ║");
    println!("║                                              ║");
    println!("╚══════════════════════════════════════════════╝");
    println!();
}

/// 설정 로드 (파일 → CLI 오버라이드 → 환경 변수 자격 증명 → 검증)
fn load_config(args: &Args) -> Result<AppConfig> {
    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .map_err(|e| anyhow!("설정 관리자 초기화 실패: {e}"))?;
    info!("설정 파일: {}", config_manager.config_path().display());

    let mut config = config_manager.get();
    args.apply_overrides(&mut config);
    credentials::resolve_api_key(&mut config.analysis);

    config
        .validate()
        .map_err(|e| anyhow!("설정 검증 실패: {e}"))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "cragsight={},cragsight_app={},cragsight_core={},cragsight_vision={},cragsight_network={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    print_banner();
    info!("CRAGSIGHT 시작");

    let config = load_config(&args)?;

    // ── 어댑터 생성 (DI 와이어링) ──

    let source: Arc<dyn CaptureSource> = Arc::new(FileCaptureSource::new(args.image.clone()));
    let normalizer: Arc<dyn ImageNormalizer> = Arc::new(
        JpegNormalizer::from_config(&config.vision)
            .map_err(|e| anyhow!("정규화기 생성 실패: {e}"))?,
    );
    let prompt = PromptBuilder::from_config(&config.analysis, &config.vision);
    let client: Arc<dyn AnalysisClient> = Arc::new(
        ChatCompletionClient::new(&config.analysis)
            .map_err(|e| anyhow!("분석 클라이언트 생성 실패: {e}"))?,
    );
    info!(
        model = %client.model(),
        target_width = config.vision.target_width,
        quality = config.vision.jpeg_quality,
        route_color = %config.analysis.route_color,
        "파이프라인 구성 완료"
    );

    let (report_tx, report_rx) = mpsc::unbounded_channel::<CycleReport>();
    let pipeline = CapturePipeline::new(source, normalizer, prompt, client, report_tx)
        .with_request_timeout(config.cycle.timeout());
    let sink: Arc<dyn ResultSink> = Arc::new(ConsoleSink::stdout());

    if args.once {
        run_once(&pipeline, report_rx, sink.as_ref()).await
    } else {
        run_interactive(pipeline, report_rx, sink).await
    }
}

/// 단일 사이클 실행
async fn run_once(
    pipeline: &CapturePipeline,
    mut report_rx: mpsc::UnboundedReceiver<CycleReport>,
    sink: &dyn ResultSink,
) -> Result<()> {
    if let Err(e) = pipeline.trigger() {
        sink.display(&e.to_string());
        return Ok(());
    }

    tokio::select! {
        report = report_rx.recv() => {
            let report = report.ok_or_else(|| anyhow!("사이클 보고 채널이 닫힘"))?;
            sink.display(report.display_text());
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C 수신, 종료");
        }
    }
    Ok(())
}

/// 대화형 모드: 표준 입력 명령으로 사이클 제어
async fn run_interactive(
    pipeline: CapturePipeline,
    report_rx: mpsc::UnboundedReceiver<CycleReport>,
    sink: Arc<dyn ResultSink>,
) -> Result<()> {
    let lifecycle = Arc::new(LifecycleManager::new());

    let signal_lifecycle = Arc::clone(&lifecycle);
    tokio::spawn(async move {
        signal_lifecycle.wait_for_signal().await;
    });

    let display_task = tokio::spawn(sink::run_display_loop(
        report_rx,
        Arc::clone(&sink),
        lifecycle.subscribe(),
    ));

    println!("{}", command::HELP);
    info!(source = %pipeline.source_name(), "대화형 모드 시작");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shutdown_rx = lifecycle.subscribe();
    let mut current: Option<CycleHandle> = None;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = shutdown_rx.changed() => break,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("표준 입력 종료");
                break;
            }
            Err(e) => {
                error!("표준 입력 읽기 실패: {}", e);
                break;
            }
        };

        match Command::parse(&line) {
            Command::Capture => match pipeline.trigger() {
                Ok(handle) => {
                    println!("캡처 시작 ({})", handle.cycle_id());
                    current = Some(handle);
                }
                Err(e) => {
                    warn!("캡처 트리거 거부: {}", e);
                    println!("{}", command::rejection_notice(&e));
                }
            },
            Command::Cancel => match current.take() {
                Some(handle) if !handle.is_finished() => handle.cancel(),
                _ => println!("진행 중인 사이클 없음"),
            },
            Command::Status => println!("상태: {}", pipeline.state()),
            Command::Quit => break,
            Command::Unknown(input) => {
                println!("알 수 없는 명령: {input}");
                println!("{}", command::HELP);
            }
        }
    }

    if let Some(handle) = current.take() {
        if !handle.is_finished() {
            handle.cancel();
        }
        let _ = handle.wait().await;
    }
    lifecycle.shutdown();

    match display_task.await {
        Ok(count) => info!(displayed = count, "CRAGSIGHT 종료"),
        Err(e) => warn!("표시 루프 종료 실패: {}", e),
    }
    Ok(())
}
