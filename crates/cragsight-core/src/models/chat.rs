//! Chat completion 와이어 모델.
//!
//! OpenAI 호환 `/v1/chat/completions` 요청/응답 스키마.
//! `content`는 일반 텍스트 또는 타입 태그가 붙은 파트 목록이다.

use serde::{Deserialize, Serialize};

/// 메시지 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// 이미지 해상도 힌트 (`low`는 토큰 비용 최소)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    #[default]
    Low,
    High,
    Auto,
}

/// 이미지 참조 (data URI 또는 URL)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: ImageDetail,
}

/// 구조화된 메시지 파트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// `{"type": "text", "text": ...}`
    Text { text: String },
    /// `{"type": "image_url", "image_url": {"url": ..., "detail": ...}}`
    ImageUrl { image_url: ImageUrl },
}

/// 메시지 본문: 일반 텍스트 또는 파트 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// 포함된 이미지 파트 수
    pub fn image_count(&self) -> usize {
        match self {
            MessageContent::Text(_) => 0,
            MessageContent::Parts(parts) => parts
                .iter()
                .filter(|p| matches!(p, ContentPart::ImageUrl { .. }))
                .count(),
        }
    }
}

/// 역할 + 본문
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: MessageContent,
}

impl ChatMessage {
    /// 텍스트 system 메시지
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: MessageContent::Text(text.into()),
        }
    }

    /// 파트 목록 user 메시지
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: ChatRole::User,
            content: MessageContent::Parts(parts),
        }
    }
}

/// Chat completion 요청 본문
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Chat completion 응답 본문 (필요한 필드만)
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// 첫 번째 choice의 본문 (없으면 None)
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}
