//! 이미지 정규화기.
//!
//! `ImageNormalizer` 포트 구현. 디코딩 → 너비 리사이즈 → JPEG → Base64.
//! 원본 프레임과 디코딩 버퍼, 리사이즈 버퍼는 다음 단계로 넘어가는 즉시 해제되어
//! 최대 메모리는 원본 1장 + 리사이즈 1장 수준으로 유지된다.

use cragsight_core::config::VisionConfig;
use cragsight_core::error::CoreError;
use cragsight_core::models::image::{CapturedFrame, EncodedImage};
use cragsight_core::ports::normalizer::ImageNormalizer;
use image::DynamicImage;
use tracing::debug;

use crate::encoder::{self, DEFAULT_JPEG_QUALITY};
use crate::resize;

/// 기본 목표 너비 (픽셀)
pub const DEFAULT_TARGET_WIDTH: u32 = 512;

/// JPEG 정규화기: `ImageNormalizer` 포트 구현
#[derive(Debug, Clone)]
pub struct JpegNormalizer {
    target_width: u32,
    quality: u8,
}

impl JpegNormalizer {
    /// 새 정규화기 생성
    pub fn new(target_width: u32, quality: u8) -> Result<Self, CoreError> {
        if target_width == 0 {
            return Err(CoreError::Config("목표 너비는 0보다 커야 함".to_string()));
        }
        if !(1..=100).contains(&quality) {
            return Err(CoreError::Config(format!(
                "JPEG 품질은 1-100 범위여야 함: {quality}"
            )));
        }
        Ok(Self {
            target_width,
            quality,
        })
    }

    /// 설정에서 생성
    pub fn from_config(config: &VisionConfig) -> Result<Self, CoreError> {
        Self::new(config.target_width, config.jpeg_quality)
    }

    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// 디코딩된 이미지 정규화 (소유권을 받아 내부에서 해제)
    pub fn normalize_image(&self, image: DynamicImage) -> Result<EncodedImage, CoreError> {
        let (src_w, src_h) = (image.width(), image.height());

        let resized = resize::resize_to_width(image, self.target_width)?;

        let (width, height) = resized.dimensions();
        let jpeg = encoder::encode_jpeg(&resized, self.quality)?;
        drop(resized);

        debug!(
            "정규화 완료: {}x{} → {}x{} ({} bytes)",
            src_w,
            src_h,
            width,
            height,
            jpeg.len()
        );

        Ok(EncodedImage::from_jpeg(jpeg, width, height))
    }
}

impl Default for JpegNormalizer {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageNormalizer for JpegNormalizer {
    fn normalize(&self, frame: CapturedFrame) -> Result<EncodedImage, CoreError> {
        let decoded = image::load_from_memory(&frame.data)
            .map_err(|e| CoreError::Decode(format!("{}: {e}", frame.source)))?;
        debug!(
            source = %frame.source,
            bytes = frame.len(),
            "프레임 디코딩 완료: {}x{}",
            decoded.width(),
            decoded.height()
        );
        drop(frame);

        self.normalize_image(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as B64, Engine};
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_frame(w: u32, h: u32) -> CapturedFrame {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
        }));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        CapturedFrame::new(bytes, "test.png")
    }

    #[test]
    fn default_settings() {
        let normalizer = JpegNormalizer::default();
        assert_eq!(normalizer.target_width(), 512);
        assert_eq!(normalizer.quality(), 80);
    }

    #[test]
    fn normalize_landscape() {
        let normalizer = JpegNormalizer::default();
        let encoded = normalizer.normalize(png_frame(1600, 1200)).unwrap();
        assert_eq!(encoded.width(), 512);
        assert_eq!(encoded.height(), 384);

        // JPEG로 다시 디코딩 가능 + 크기 일치
        let decoded =
            image::load_from_memory_with_format(encoded.jpeg_bytes(), ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (512, 384));
    }

    #[test]
    fn normalize_portrait_height_rounding() {
        let normalizer = JpegNormalizer::new(512, 80).unwrap();
        let encoded = normalizer.normalize(png_frame(300, 700)).unwrap();
        // 512 * 700 / 300 = 1194.67
        assert_eq!(encoded.width(), 512);
        assert!((1194..=1195).contains(&encoded.height()));
    }

    #[test]
    fn base64_roundtrip_exact() {
        let normalizer = JpegNormalizer::default();
        let encoded = normalizer.normalize(png_frame(640, 480)).unwrap();
        let decoded = B64.decode(encoded.base64()).unwrap();
        assert_eq!(decoded.as_slice(), encoded.jpeg_bytes());
    }

    #[test]
    fn custom_target_width() {
        let normalizer = JpegNormalizer::new(128, 60).unwrap();
        let encoded = normalizer.normalize(png_frame(640, 480)).unwrap();
        assert_eq!((encoded.width(), encoded.height()), (128, 96));
    }

    #[test]
    fn corrupt_input_is_decode_error() {
        let normalizer = JpegNormalizer::default();
        let frame = CapturedFrame::new(b"definitely not an image".to_vec(), "broken.jpg");
        let err = normalizer.normalize(frame).unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
        assert!(err.to_string().contains("broken.jpg"));
    }

    #[test]
    fn zero_height_is_invalid_dimensions() {
        let normalizer = JpegNormalizer::default();
        let image = DynamicImage::ImageRgba8(RgbaImage::new(64, 0));
        let err = normalizer.normalize_image(image).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidDimensions {
                width: 64,
                height: 0
            }
        ));
    }

    #[test]
    fn tall_strip_is_invalid_dimensions() {
        let normalizer = JpegNormalizer::default();
        let err = normalizer.normalize(png_frame(1, 100_000)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidDimensions {
                width: 1,
                height: 100_000
            }
        ));
    }

    #[test]
    fn rejects_invalid_settings() {
        assert!(JpegNormalizer::new(0, 80).is_err());
        assert!(JpegNormalizer::new(512, 0).is_err());
        assert!(JpegNormalizer::new(512, 101).is_err());
    }

    #[test]
    fn from_config() {
        let config = VisionConfig {
            target_width: 256,
            jpeg_quality: 70,
            ..VisionConfig::default()
        };
        let normalizer = JpegNormalizer::from_config(&config).unwrap();
        assert_eq!(normalizer.target_width(), 256);
        assert_eq!(normalizer.quality(), 70);
    }
}
