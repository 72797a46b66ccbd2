//! 너비 기준 리사이즈.
//!
//! fast_image_resize 기반 고속 리사이즈. 목표 너비에 맞추고 높이는 종횡비로 계산한다.
//! 캡처마다 새로 계산하며 결과 버퍼를 보관하지 않는다.

use cragsight_core::error::CoreError;
use fast_image_resize::{images::Image as FirImage, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage};
use tracing::debug;

/// 리사이즈 결과 최대 픽셀 수 (RGB8 기준 약 48MB)
pub const MAX_OUTPUT_PIXELS: u64 = 4096 * 4096;

/// 결과 버퍼가 픽셀 예산 안에 들어오는지 확인
fn within_output_budget(width: u32, height: u32) -> bool {
    width as u64 * height as u64 <= MAX_OUTPUT_PIXELS
}

/// 종횡비를 유지한 목표 높이 계산
///
/// `round(target_width / (width / height))`. 높이/너비가 0이거나
/// 결과 높이가 0으로 반올림되거나 결과 버퍼가 `MAX_OUTPUT_PIXELS`를 넘는
/// 비정상 종횡비는 `InvalidDimensions`.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> Result<u32, CoreError> {
    if width == 0 || height == 0 || target_width == 0 {
        return Err(CoreError::InvalidDimensions { width, height });
    }

    let aspect_ratio = width as f64 / height as f64;
    let target_height = (target_width as f64 / aspect_ratio).round();

    if !target_height.is_finite() || target_height < 1.0 || target_height > u32::MAX as f64 {
        return Err(CoreError::InvalidDimensions { width, height });
    }

    let target_height = target_height as u32;
    if !within_output_budget(target_width, target_height) {
        debug!(
            "리사이즈 결과 예산 초과: {}x{} → {}x{}",
            width, height, target_width, target_height
        );
        return Err(CoreError::InvalidDimensions { width, height });
    }

    Ok(target_height)
}

/// RGB8 고속 리사이즈
///
/// 소스 이미지를 소유권으로 받아 RGB8 변환 중에 해제한다.
/// 알파 채널은 버린다 (JPEG 출력 전용). 동일 크기면 변환만 수행.
pub fn fast_resize(image: DynamicImage, width: u32, height: u32) -> Result<RgbImage, CoreError> {
    let (src_w, src_h) = (image.width(), image.height());

    if src_w == 0 || src_h == 0 {
        return Err(CoreError::InvalidDimensions {
            width: src_w,
            height: src_h,
        });
    }
    if width == 0 || height == 0 {
        return Err(CoreError::Internal(format!(
            "목표 이미지 크기 0: {width}x{height}"
        )));
    }
    if !within_output_budget(width, height) {
        return Err(CoreError::Internal(format!(
            "목표 이미지 크기 초과: {width}x{height}"
        )));
    }

    if src_w == width && src_h == height {
        return Ok(image.into_rgb8());
    }

    let src_raw = image.into_rgb8().into_raw();
    let src_image = FirImage::from_vec_u8(src_w, src_h, src_raw, PixelType::U8x3)
        .map_err(|e| CoreError::Internal(format!("소스 이미지 생성 실패: {e}")))?;

    let mut dst_image = FirImage::new(width, height, PixelType::U8x3);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));

    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::Internal(format!("리사이즈 실패: {e}")))?;
    drop(src_image);

    let result = RgbImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| CoreError::Internal("결과 이미지 생성 실패".to_string()))?;

    debug!("리사이즈: {}x{} → {}x{}", src_w, src_h, width, height);

    Ok(result)
}

/// 목표 너비로 리사이즈 (높이는 종횡비 유지)
pub fn resize_to_width(image: DynamicImage, target_width: u32) -> Result<RgbImage, CoreError> {
    let target_height = scaled_height(image.width(), image.height(), target_width)?;
    fast_resize(image, target_width, target_height)
}
