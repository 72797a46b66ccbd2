//! 애플리케이션 설정 구조체.
//!
//! 이미지 정규화, 원격 분석 API, 캡처 사이클 설정을 정의한다.
//! `ConfigManager`를 통해 JSON 파일에서 로드하며, CLI 인자로 덮어쓴다.
//! API 키는 배포물에 포함하지 않고 설정 파일 또는 실행 환경에서 주입한다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;
use crate::models::chat::ImageDetail;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 이미지 정규화 설정
    #[serde(default)]
    pub vision: VisionConfig,
    /// 원격 분석 API 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// 캡처 사이클 설정
    #[serde(default)]
    pub cycle: CycleConfig,
}

// ============================================================
// 비전 설정
// ============================================================

/// 이미지 정규화 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// 리사이즈 목표 너비 (픽셀). 높이는 종횡비 유지.
    #[serde(default = "default_target_width")]
    pub target_width: u32,
    /// JPEG 품질 (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// 원격 모델에 전달할 이미지 해상도 힌트
    #[serde(default)]
    pub image_detail: ImageDetail,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            target_width: default_target_width(),
            jpeg_quality: default_jpeg_quality(),
            image_detail: ImageDetail::Low,
        }
    }
}

// ============================================================
// 분석 API 설정
// ============================================================

/// Chat completion 엔드포인트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// API URL (예: "https://api.openai.com/v1/chat/completions")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API 키 (비어 있으면 실행 환경에서 주입)
    #[serde(default)]
    pub api_key: String,
    /// 모델 식별자
    #[serde(default = "default_model")]
    pub model: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
    /// 응답 최대 토큰 (None이면 서버 기본값)
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// system 프롬프트 교체 (None이면 내장 평가 지침 사용)
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// 분석 대상 루트의 홀드 색상
    #[serde(default = "default_route_color")]
    pub route_color: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            model: default_model(),
            timeout_secs: default_api_timeout_secs(),
            max_tokens: None,
            system_prompt: None,
            route_color: default_route_color(),
        }
    }
}

impl AnalysisConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API 키가 설정되어 있는지
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// ============================================================
// 캡처 사이클 설정
// ============================================================

/// 캡처 사이클 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleConfig {
    /// 원격 분석 단계 타임아웃 (초). None이면 HTTP 요청 타임아웃만 적용.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl CycleConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            vision: VisionConfig::default(),
            analysis: AnalysisConfig::default(),
            cycle: CycleConfig::default(),
        }
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.vision.target_width == 0 {
            return Err(validation("vision.target_width", "0보다 커야 합니다"));
        }
        if !(1..=100).contains(&self.vision.jpeg_quality) {
            return Err(validation(
                "vision.jpeg_quality",
                "1-100 범위여야 합니다",
            ));
        }
        if self.analysis.endpoint.trim().is_empty() {
            return Err(validation("analysis.endpoint", "비어 있습니다"));
        }
        if self.analysis.model.trim().is_empty() {
            return Err(validation("analysis.model", "비어 있습니다"));
        }
        if self.analysis.timeout_secs == 0 {
            return Err(validation("analysis.timeout_secs", "0보다 커야 합니다"));
        }
        if self.cycle.timeout_secs == Some(0) {
            return Err(validation("cycle.timeout_secs", "0보다 커야 합니다"));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn validation(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_target_width() -> u32 {
    512
}
fn default_jpeg_quality() -> u8 {
    80
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_api_timeout_secs() -> u64 {
    30
}
fn default_route_color() -> String {
    "blue".to_string()
}
