//! 캡처 프레임 및 인코딩 이미지 모델.
//!
//! 캡처 소스가 만든 원본 프레임(`CapturedFrame`)과
//! 정규화기가 만든 전송용 JPEG(`EncodedImage`)를 정의한다.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use chrono::{DateTime, Utc};

/// data URI의 JPEG MIME 접두사
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// 캡처 소스가 전달하는 원본 프레임 (디코딩 전 파일 바이트)
///
/// 정규화기로 소유권이 이동되며, 인코딩 완료 후 즉시 해제된다.
#[derive(Debug)]
pub struct CapturedFrame {
    /// 인코딩된 원본 파일 바이트 (JPEG, PNG 등)
    pub data: Vec<u8>,
    /// 캡처 시각
    pub captured_at: DateTime<Utc>,
    /// 캡처 소스 이름 (파일 경로, 카메라 ID 등)
    pub source: String,
}

impl CapturedFrame {
    /// 현재 시각으로 새 프레임 생성
    pub fn new(data: Vec<u8>, source: impl Into<String>) -> Self {
        Self {
            data,
            captured_at: Utc::now(),
            source: source.into(),
        }
    }

    /// 원본 바이트 크기
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 빈 프레임인지 여부
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 너비 제한 + JPEG 압축 + Base64 변환이 끝난 이미지
///
/// 생성 후 불변. 프롬프트 빌더가 값으로 받아 한 번만 소비한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    jpeg: Vec<u8>,
    base64: String,
    width: u32,
    height: u32,
}

impl EncodedImage {
    /// JPEG 바이트로부터 생성 (Base64는 여기서 한 번 계산)
    pub fn from_jpeg(jpeg: Vec<u8>, width: u32, height: u32) -> Self {
        let base64 = B64.encode(&jpeg);
        Self {
            jpeg,
            base64,
            width,
            height,
        }
    }

    /// JPEG 바이트
    pub fn jpeg_bytes(&self) -> &[u8] {
        &self.jpeg
    }

    /// Base64 텍스트
    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.jpeg.is_empty()
    }

    /// `data:image/jpeg;base64,<payload>` 형식 data URI
    pub fn data_uri(&self) -> String {
        let mut uri = String::with_capacity(JPEG_DATA_URI_PREFIX.len() + self.base64.len());
        uri.push_str(JPEG_DATA_URI_PREFIX);
        uri.push_str(&self.base64);
        uri
    }
}
