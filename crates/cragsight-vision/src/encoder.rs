//! JPEG 인코더.
//!
//! 리사이즈된 RGB 버퍼를 지정 품질로 JPEG 압축한다.

use cragsight_core::error::CoreError;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::debug;

/// 기본 JPEG 품질 (80%)
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// JPEG 인코딩
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    if !(1..=100).contains(&quality) {
        return Err(CoreError::Config(format!(
            "JPEG 품질은 1-100 범위여야 함: {quality}"
        )));
    }

    let (w, h) = image.dimensions();
    let raw_size = (w as usize) * (h as usize) * 3;

    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .encode_image(image)
        .map_err(|e| CoreError::Internal(format!("JPEG 인코딩 실패: {e}")))?;

    debug!(
        "JPEG 인코딩: {}x{} → {} bytes (품질 {}, 압축률 {:.1}%)",
        w,
        h,
        encoded.len(),
        quality,
        (encoded.len() as f32 / raw_size.max(1) as f32) * 100.0
    );

    Ok(encoded)
}
