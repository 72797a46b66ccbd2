//! Chat completion 분석 클라이언트.
//!
//! OpenAI 호환 `POST /v1/chat/completions` 엔드포인트에 메시지 시퀀스를 전송하고
//! 첫 번째 choice 텍스트를 반환한다. 캡처마다 1회 호출하며 재시도하지 않는다.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};

use cragsight_core::config::AnalysisConfig;
use cragsight_core::error::CoreError;
use cragsight_core::models::analysis::AnalysisResult;
use cragsight_core::models::chat::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use cragsight_core::ports::analysis::AnalysisClient;

/// 에러 메시지에 포함할 응답 본문 최대 길이 (문자)
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

// ============================================================
// ChatCompletionClient
// ============================================================

/// Chat completion 클라이언트: `AnalysisClient` 포트 구현
///
/// **보안**:
/// - API 키는 설정 또는 환경 변수에서 주입 (소스에 하드코딩 금지)
/// - 키는 메모리에만 유지하며 로그에 남기지 않는다
pub struct ChatCompletionClient {
    /// HTTP 클라이언트
    http_client: reqwest::Client,
    /// API 엔드포인트 URL
    endpoint: String,
    /// API 키
    api_key: String,
    /// 모델 이름
    model: String,
    /// 응답 토큰 상한 (None이면 서버 기본값)
    max_tokens: Option<u32>,
}

impl std::fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionClient {
    /// 새 ChatCompletionClient 생성
    pub fn new(config: &AnalysisConfig) -> Result<Self, CoreError> {
        if config.api_key.trim().is_empty() {
            return Err(CoreError::Config(
                "분석 API 키 미설정. config.json 또는 CRAGSIGHT_API_KEY를 설정하세요.".into(),
            ));
        }
        if config.endpoint.trim().is_empty() {
            return Err(CoreError::Config("분석 API 엔드포인트 미설정".into()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CoreError::Config(format!("HTTP 클라이언트 생성 실패: {e}")))?;

        debug!(
            endpoint = %config.endpoint,
            model = %config.model,
            timeout = config.timeout_secs,
            "ChatCompletionClient 초기화"
        );

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 요청 본문 구성
    fn build_request(&self, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
        }
    }

    /// 응답 본문 파싱 → 분석 결과
    ///
    /// choice가 없거나 본문이 비어 있으면 `Unavailable`. JSON 형식 오류는 `RemoteCall`.
    pub fn parse_completion(body: &str) -> Result<AnalysisResult, CoreError> {
        let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
            CoreError::RemoteCall(format!(
                "응답 JSON 파싱 실패: {} (raw: {})",
                e,
                preview(body)
            ))
        })?;

        Ok(AnalysisResult::from_choice_content(response.first_content()))
    }

    /// 비정상 상태 코드 → 에러
    fn status_error(status: StatusCode, body: &str) -> CoreError {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            CoreError::RemoteCall(format!("인증 실패 ({}): {}", status, preview(body)))
        } else {
            CoreError::RemoteCall(format!("API 오류 ({}): {}", status, preview(body)))
        }
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}

#[async_trait]
impl AnalysisClient for ChatCompletionClient {
    async fn analyze(&self, messages: Vec<ChatMessage>) -> Result<AnalysisResult, CoreError> {
        let request = self.build_request(messages);

        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = request.messages.len(),
            "chat completion 호출"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::RemoteCall(format!("API 호출 실패: {e}")))?;
        drop(request);

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::RemoteCall(format!("API 응답 읽기 실패: {e}")))?;

        if !status.is_success() {
            warn!(status = %status, "chat completion 오류 응답");
            return Err(Self::status_error(status, &body));
        }

        let result = Self::parse_completion(&body)?;

        debug!(
            available = result.is_available(),
            chars = result.text().len(),
            "chat completion 응답 수신"
        );

        Ok(result)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================
// 테스트
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cragsight_core::models::analysis::NO_DESCRIPTION_FALLBACK;
    use cragsight_core::models::chat::{ContentPart, ImageDetail, ImageUrl};
    use mockito::Matcher;

    fn config_for(server: &mockito::ServerGuard) -> AnalysisConfig {
        AnalysisConfig {
            endpoint: format!("{}/v1/chat/completions", server.url()),
            api_key: "sk-test".to_string(),
            timeout_secs: 5,
            ..AnalysisConfig::default()
        }
    }

    fn sample_messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("Evaluate the route."),
            ChatMessage::user_parts(vec![
                ContentPart::Text {
                    text: "Analyze the blue route from the picture below.".to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "data:image/jpeg;base64,/9j/".to_string(),
                        detail: ImageDetail::Low,
                    },
                },
            ]),
        ]
    }

    #[test]
    fn empty_api_key_rejected() {
        let config = AnalysisConfig {
            api_key: "  ".to_string(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            ChatCompletionClient::new(&config),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn debug_hides_api_key() {
        let config = AnalysisConfig {
            api_key: "sk-secret".to_string(),
            ..AnalysisConfig::default()
        };
        let client = ChatCompletionClient::new(&config).unwrap();
        assert!(!format!("{client:?}").contains("sk-secret"));
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn parse_completion_trims_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  V3  "}}]}"#;
        let result = ChatCompletionClient::parse_completion(body).unwrap();
        assert_eq!(result.text(), "V3");
    }

    #[test]
    fn parse_completion_no_choices() {
        let result = ChatCompletionClient::parse_completion(r#"{"choices":[]}"#).unwrap();
        assert!(!result.is_available());
        assert_eq!(result.text(), NO_DESCRIPTION_FALLBACK);
    }

    #[test]
    fn parse_completion_null_content() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        let result = ChatCompletionClient::parse_completion(body).unwrap();
        assert_eq!(result.text(), NO_DESCRIPTION_FALLBACK);
    }

    #[test]
    fn parse_completion_malformed() {
        let err = ChatCompletionClient::parse_completion("<html>gateway</html>").unwrap_err();
        assert!(matches!(err, CoreError::RemoteCall(_)));
        assert!(err.to_string().contains("gateway"));
    }

    #[tokio::test]
    async fn analyze_success_sends_bearer_and_model() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system"},
                    {"role": "user"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"Main: grip. Secondary: balance. V4"}}]}"#,
            )
            .create_async()
            .await;

        let client = ChatCompletionClient::new(&config_for(&server)).unwrap();
        let result = client.analyze(sample_messages()).await.unwrap();

        assert_eq!(result.text(), "Main: grip. Secondary: balance. V4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn analyze_zero_choices_fallback() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"chatcmpl-1","choices":[]}"#)
            .create_async()
            .await;

        let client = ChatCompletionClient::new(&config_for(&server)).unwrap();
        let result = client.analyze(sample_messages()).await.unwrap();

        assert_eq!(result, AnalysisResult::Unavailable);
        assert_eq!(result.text(), "No description available.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn analyze_sends_max_tokens_when_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({"max_tokens": 300})))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"V2"}}]}"#)
            .create_async()
            .await;

        let config = AnalysisConfig {
            max_tokens: Some(300),
            ..config_for(&server)
        };
        let client = ChatCompletionClient::new(&config).unwrap();
        assert_eq!(client.analyze(sample_messages()).await.unwrap().text(), "V2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn analyze_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let client = ChatCompletionClient::new(&config_for(&server)).unwrap();
        let err = client.analyze(sample_messages()).await.unwrap_err();

        assert!(matches!(err, CoreError::RemoteCall(_)));
        let message = err.to_string();
        assert!(message.contains("인증 실패"));
        assert!(message.contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn analyze_server_error_truncates_body() {
        let mut server = mockito::Server::new_async().await;
        let long_body = "x".repeat(1_000);
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body(&long_body)
            .create_async()
            .await;

        let client = ChatCompletionClient::new(&config_for(&server)).unwrap();
        let err = client.analyze(sample_messages()).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(!message.contains(&long_body));
    }

    #[tokio::test]
    async fn analyze_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{not json")
            .create_async()
            .await;

        let client = ChatCompletionClient::new(&config_for(&server)).unwrap();
        assert!(matches!(
            client.analyze(sample_messages()).await,
            Err(CoreError::RemoteCall(_))
        ));
    }

    #[tokio::test]
    async fn analyze_connection_refused() {
        // 바인딩 후 즉시 해제한 포트 → 연결 거부
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = AnalysisConfig {
            endpoint: format!("http://127.0.0.1:{port}/v1/chat/completions"),
            api_key: "sk-test".to_string(),
            timeout_secs: 2,
            ..AnalysisConfig::default()
        };

        let client = ChatCompletionClient::new(&config).unwrap();
        let err = client.analyze(sample_messages()).await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteCall(_)));
    }
}
