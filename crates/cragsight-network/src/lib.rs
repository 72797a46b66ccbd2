//! # cragsight-network
//!
//! 원격 분석 어댑터.
//! 정규화된 이미지로 chat completion 프롬프트를 조립하고
//! OpenAI 호환 엔드포인트에 전송해 루트 평가 텍스트를 받는다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use cragsight_network::analysis_client::ChatCompletionClient;
//! use cragsight_network::prompt::PromptBuilder;
//!
//! let messages = PromptBuilder::from_config(&config.analysis, &config.vision).build(image)?;
//! let result = ChatCompletionClient::new(&config.analysis)?.analyze(messages).await?;
//! ```

pub mod analysis_client;
pub mod prompt;
