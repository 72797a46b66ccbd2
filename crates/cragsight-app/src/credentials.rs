//! API 자격 증명 해석.
//!
//! 설정 파일의 키가 우선이며, 비어 있으면 환경 변수에서 읽는다.

use cragsight_core::config::AnalysisConfig;
use tracing::debug;

/// 자격 증명 환경 변수 (우선순위 순)
pub const API_KEY_ENV_VARS: [&str; 2] = ["CRAGSIGHT_API_KEY", "OPENAI_API_KEY"];

/// 프로세스 환경에서 API 키 주입
pub fn resolve_api_key(config: &mut AnalysisConfig) {
    resolve_api_key_with(config, |name| std::env::var(name).ok());
}

/// 조회 함수로 API 키 주입 (설정값이 있으면 유지)
pub fn resolve_api_key_with<F>(config: &mut AnalysisConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if config.has_api_key() {
        debug!("설정 파일의 API 키 사용");
        return;
    }

    for name in API_KEY_ENV_VARS {
        if let Some(key) = lookup(name).filter(|k| !k.trim().is_empty()) {
            debug!(source = name, "환경 변수에서 API 키 로드");
            config.api_key = key.trim().to_string();
            return;
        }
    }
}
