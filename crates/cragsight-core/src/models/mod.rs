//! CRAGSIGHT 도메인 모델.
//!
//! 캡처 프레임, 인코딩 이미지, chat completion 와이어 타입,
//! 분석 결과, 캡처 사이클 상태를 정의한다.

pub mod analysis;
pub mod chat;
pub mod cycle;
pub mod image;
