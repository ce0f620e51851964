//! # perch-launcher
//!
//! 런처 엔진.
//! 설치된 앱 카탈로그를 새로고침하고, 숨김/독 환경설정과 조정하여
//! 세 가지 뷰(독, 그리드, 숨김)를 일관되게 유지한다.
//! 새로고침 스로틀링, 시간대별 어시스턴트 메시지, 세션 도구(할 일, 카운트다운)를 포함한다.

pub mod catalog;
pub mod dock;
pub mod messaging;
pub mod reconciler;
pub mod refresh;
pub mod tools;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;
