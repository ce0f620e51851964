//! # perch-storage
//!
//! 로컬 환경설정 저장소 어댑터.
//! 필드 하나당 파일 하나로 저장하며, 모든 쓰기는 임시 파일 → rename으로
//! 원자적으로 교체한다.
//!
//! ## 모듈
//! - `file_store`: 환경설정 저장소 (PreferenceStore 구현)
//! - `atomic`: 원자적 파일 쓰기

pub mod atomic;
pub mod file_store;
