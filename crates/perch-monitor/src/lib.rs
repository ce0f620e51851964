//! # perch-monitor
//!
//! 데스크톱 플랫폼 어댑터.
//! freedesktop `.desktop` 항목으로 설치된 앱을 조회/실행하고,
//! 앱 디렉토리 변화를 폴링하여 설치 이벤트를 만든다.

pub mod desktop_entries;
pub mod install_watcher;
