//! 프롬프트 빌더.
//!
//! 고정 평가 지침(system) + 이미지 1장을 첨부한 지시문(user) 2개 메시지를 조립한다.
//! 순수 조립 단계로 I/O 없음.

use cragsight_core::config::{AnalysisConfig, VisionConfig};
use cragsight_core::error::CoreError;
use cragsight_core::models::chat::{ChatMessage, ContentPart, ImageDetail, ImageUrl};
use cragsight_core::models::image::EncodedImage;

/// 내장 평가 지침: 볼더링 루트 평가 루브릭 + V 스케일
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
I will give a photo from bouldering and the color of the grips of the target route. \
Provide a short evaluation of the route, containing main challenge, secondary challenge \
and an international bouldering grade.

Evaluate bouldering route by strength, grip, stamina, legs, balance, psychology. \
Based on this evaluation provide a main and secondary challenge for the route.

For the route grades use The Bouldering V Scale (a.k.a the Vermin Scale). \
The V Scale spans from Beginner (V0-V3) to Elite (V17).";

/// 기본 대상 루트 홀드 색상
pub const DEFAULT_ROUTE_COLOR: &str = "blue";

/// 프롬프트 빌더
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_instruction: String,
    route_color: String,
    detail: ImageDetail,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            route_color: DEFAULT_ROUTE_COLOR.to_string(),
            detail: ImageDetail::Low,
        }
    }

    /// 설정에서 생성 (system 프롬프트 교체, 루트 색상, 해상도 힌트)
    pub fn from_config(analysis: &AnalysisConfig, vision: &VisionConfig) -> Self {
        let system_instruction = analysis
            .system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
            .to_string();

        Self {
            system_instruction,
            route_color: analysis.route_color.trim().to_string(),
            detail: vision.image_detail,
        }
    }

    pub fn with_route_color(mut self, color: impl Into<String>) -> Self {
        self.route_color = color.into();
        self
    }

    pub fn with_detail(mut self, detail: ImageDetail) -> Self {
        self.detail = detail;
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// user 메시지 지시문
    pub fn directive(&self) -> String {
        if self.route_color.is_empty() {
            "Analyze the route from the picture below.".to_string()
        } else {
            format!("Analyze the {} route from the picture below.", self.route_color)
        }
    }

    /// system → user 순서의 메시지 2개 조립
    ///
    /// 이미지는 값으로 받아 이 요청에서만 소비한다.
    pub fn build(&self, image: EncodedImage) -> Result<Vec<ChatMessage>, CoreError> {
        if image.is_empty() {
            return Err(CoreError::EmptyPayload);
        }

        let user = ChatMessage::user_parts(vec![
            ContentPart::Text {
                text: self.directive(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.data_uri(),
                    detail: self.detail,
                },
            },
        ]);

        Ok(vec![ChatMessage::system(self.system_instruction.clone()), user])
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
