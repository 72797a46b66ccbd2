//! 설정 및 DI 와이어링 통합 테스트.
//!
//! config.json → AppConfig → 어댑터 생성 검증.

use cragsight_core::config::AppConfig;
use cragsight_core::config_manager::ConfigManager;
use cragsight_core::error::CoreError;
use cragsight_core::models::chat::ImageDetail;
use cragsight_core::ports::analysis::AnalysisClient;
use cragsight_core::ports::normalizer::ImageNormalizer;
use cragsight_network::analysis_client::ChatCompletionClient;
use cragsight_network::prompt::PromptBuilder;
use cragsight_vision::normalizer::JpegNormalizer;
use std::sync::Arc;

#[test]
fn config_defaults_are_valid() {
    let config = AppConfig::default_config();
    assert!(config.validate().is_ok());

    assert_eq!(config.vision.target_width, 512);
    assert_eq!(config.vision.jpeg_quality, 80);
    assert_eq!(config.vision.image_detail, ImageDetail::Low);
    assert_eq!(config.analysis.model, "gpt-4o-mini");
    assert_eq!(config.analysis.route_color, "blue");
    assert!(!config.analysis.has_api_key());
    assert!(config.cycle.timeout().is_none());
}

#[test]
fn adapters_from_persisted_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cragsight").join("config.json");

    let manager = ConfigManager::with_path(path.clone()).unwrap();
    assert!(path.exists());

    let mut config = manager.get();
    config.vision.target_width = 256;
    config.vision.jpeg_quality = 60;
    config.analysis.api_key = "sk-file".to_string();
    config.analysis.model = "gpt-4o".to_string();
    manager.update(config).unwrap();

    // 같은 경로로 다시 로드
    let reloaded = ConfigManager::with_path(path).unwrap().get();

    let normalizer = JpegNormalizer::from_config(&reloaded.vision).unwrap();
    assert_eq!(normalizer.target_width(), 256);
    assert_eq!(normalizer.quality(), 60);
    let _: Arc<dyn ImageNormalizer> = Arc::new(normalizer);

    let client: Arc<dyn AnalysisClient> =
        Arc::new(ChatCompletionClient::new(&reloaded.analysis).unwrap());
    assert_eq!(client.model(), "gpt-4o");

    let prompt = PromptBuilder::from_config(&reloaded.analysis, &reloaded.vision);
    assert!(prompt.directive().contains("blue"));
}

#[test]
fn missing_credential_blocks_client() {
    let config = AppConfig::default_config();
    assert!(matches!(
        ChatCompletionClient::new(&config.analysis),
        Err(CoreError::Config(_))
    ));
}

#[test]
fn invalid_vision_config_rejected() {
    let mut config = AppConfig::default_config();
    config.vision.jpeg_quality = 0;
    assert!(matches!(
        config.validate(),
        Err(CoreError::Validation { .. })
    ));
    assert!(JpegNormalizer::from_config(&config.vision).is_err());
}
