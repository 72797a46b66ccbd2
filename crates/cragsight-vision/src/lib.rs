//! # cragsight-vision
//!
//! 캡처 소스 어댑터와 이미지 정규화 파이프라인.
//! 원본 프레임을 디코딩해 목표 너비로 리사이즈하고 JPEG + Base64로 인코딩한다.

pub mod capture;
pub mod encoder;
pub mod normalizer;
pub mod resize;
