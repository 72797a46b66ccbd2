//! 분석 결과 모델.

use serde::{Deserialize, Serialize};

/// 응답에 choice가 없을 때 표시하는 문구
pub const NO_DESCRIPTION_FALLBACK: &str = "No description available.";

/// 원격 분석 결과: 캡처마다 1회 생성, 표시 후 폐기
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum AnalysisResult {
    /// 첫 번째 choice의 텍스트 (앞뒤 공백 제거됨)
    Described(String),
    /// 응답에 사용할 텍스트 없음
    Unavailable,
}

impl AnalysisResult {
    /// 첫 choice 본문으로부터 생성. 없거나 공백뿐이면 `Unavailable`.
    ///
    /// 공백뿐인 본문은 빈 문자열로 표시하지 않고 의도적으로 대체 문구로 표시한다.
    pub fn from_choice_content(content: Option<&str>) -> Self {
        match content.map(str::trim) {
            Some(text) if !text.is_empty() => AnalysisResult::Described(text.to_string()),
            _ => AnalysisResult::Unavailable,
        }
    }

    /// 결과 싱크에 전달할 문자열
    pub fn text(&self) -> &str {
        match self {
            AnalysisResult::Described(text) => text,
            AnalysisResult::Unavailable => NO_DESCRIPTION_FALLBACK,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AnalysisResult::Described(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_content() {
        let result = AnalysisResult::from_choice_content(Some("  V3  "));
        assert_eq!(result, AnalysisResult::Described("V3".to_string()));
        assert_eq!(result.text(), "V3");
    }

    #[test]
    fn missing_content_falls_back() {
        let result = AnalysisResult::from_choice_content(None);
        assert_eq!(result, AnalysisResult::Unavailable);
        assert_eq!(result.text(), "No description available.");
        assert!(!result.is_available());
    }

    #[test]
    fn whitespace_only_falls_back() {
        let result = AnalysisResult::from_choice_content(Some(" \n\t "));
        assert_eq!(result.text(), NO_DESCRIPTION_FALLBACK);
    }

    #[test]
    fn serde_roundtrip() {
        let result = AnalysisResult::Described("Main challenge: grip".to_string());
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
