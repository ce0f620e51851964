//! 애플리케이션 설정 구조체.
//!
//! 저장 경로, 독 용량, 새로고침 스로틀, 인사 메시지 주기, 데스크톱 앱 디렉토리,
//! 위젯 엔드포인트 등 런타임 설정을 정의한다. `ConfigManager`가 JSON 파일로 관리.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 환경설정 파일 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 독 설정
    #[serde(default)]
    pub dock: DockConfig,
    /// 카탈로그 새로고침 설정
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// 인사 알림 설정
    #[serde(default)]
    pub messaging: MessagingConfig,
    /// 데스크톱 앱 스캔 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 날씨/환율 위젯 설정
    #[serde(default)]
    pub widgets: WidgetConfig,
}

// ============================================================
// 저장소 설정
// ============================================================

/// 저장소 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 환경설정 파일 디렉토리 (None이면 플랫폼 데이터 디렉토리)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

// ============================================================
// 독 설정
// ============================================================

/// 독 설정
///
/// `capacity`번째 슬롯은 표시되지 않는 예비 슬롯이다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockConfig {
    /// 고정 가능한 최대 앱 수
    #[serde(default = "default_dock_capacity")]
    pub capacity: usize,
    /// 독 위젯에 표시하는 앱 수
    #[serde(default = "default_dock_visible_slots")]
    pub visible_slots: usize,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            capacity: default_dock_capacity(),
            visible_slots: default_dock_visible_slots(),
        }
    }
}

// ============================================================
// 새로고침 설정
// ============================================================

/// 카탈로그 새로고침 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// 새로고침 최소 간격 (ms). 이 안의 요청은 버린다
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// 앱 삭제 후 1회 새로고침까지 대기 (ms)
    #[serde(default = "default_uninstall_refresh_delay_ms")]
    pub uninstall_refresh_delay_ms: u64,
    /// 포그라운드 복귀 후 새로고침까지 대기 (ms)
    #[serde(default = "default_foreground_refresh_delay_ms")]
    pub foreground_refresh_delay_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            uninstall_refresh_delay_ms: default_uninstall_refresh_delay_ms(),
            foreground_refresh_delay_ms: default_foreground_refresh_delay_ms(),
        }
    }
}

// ============================================================
// 인사 알림 설정
// ============================================================

/// 인사 알림 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// 인사 알림 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 시간대 변화 확인 주기 (초)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// 일일 알림 리셋 시각 (0-23)
    #[serde(default = "default_daily_reset_hour")]
    pub daily_reset_hour: u32,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: default_poll_interval_secs(),
            daily_reset_hour: default_daily_reset_hour(),
        }
    }
}

// ============================================================
// 데스크톱 앱 스캔 설정
// ============================================================

/// 데스크톱 앱 스캔 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// `.desktop` 파일 디렉토리 (비어 있으면 XDG 기본 경로)
    #[serde(default)]
    pub application_dirs: Vec<PathBuf>,
    /// 설치 변화 감지 주기 (초)
    #[serde(default = "default_install_poll_secs")]
    pub install_poll_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            application_dirs: Vec::new(),
            install_poll_secs: default_install_poll_secs(),
        }
    }
}

// ============================================================
// 위젯 설정
// ============================================================

/// 날씨/환율 위젯 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// 위젯 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 지오코딩 API 베이스 URL
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// 날씨 예보 API 베이스 URL
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// 환율 API 베이스 URL
    #[serde(default = "default_exchange_url")]
    pub exchange_url: String,
    /// 요청 타임아웃 (ms)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            exchange_url: default_exchange_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig::default(),
            dock: DockConfig::default(),
            refresh: RefreshConfig::default(),
            messaging: MessagingConfig::default(),
            monitor: MonitorConfig::default(),
            widgets: WidgetConfig::default(),
        }
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.dock.capacity == 0 {
            return Err(invalid("dock.capacity", "0보다 커야 합니다"));
        }
        if self.dock.visible_slots > self.dock.capacity {
            return Err(invalid(
                "dock.visible_slots",
                "독 용량보다 클 수 없습니다",
            ));
        }
        if self.refresh.throttle_ms == 0 {
            return Err(invalid("refresh.throttle_ms", "0보다 커야 합니다"));
        }
        if self.messaging.poll_interval_secs == 0 {
            return Err(invalid("messaging.poll_interval_secs", "0보다 커야 합니다"));
        }
        if self.messaging.daily_reset_hour >= 24 {
            return Err(invalid("messaging.daily_reset_hour", "0-23 범위여야 합니다"));
        }
        if self.monitor.install_poll_secs == 0 {
            return Err(invalid("monitor.install_poll_secs", "0보다 커야 합니다"));
        }
        Ok(())
    }

    /// 새로고침 스로틀 간격
    pub fn refresh_throttle(&self) -> Duration {
        Duration::from_millis(self.refresh.throttle_ms)
    }

    /// 앱 삭제 후 새로고침 대기
    pub fn uninstall_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh.uninstall_refresh_delay_ms)
    }

    /// 포그라운드 복귀 후 새로고침 대기
    pub fn foreground_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh.foreground_refresh_delay_ms)
    }

    /// 시간대 확인 주기
    pub fn message_poll_interval(&self) -> Duration {
        Duration::from_secs(self.messaging.poll_interval_secs)
    }

    /// 설치 감지 주기
    pub fn install_poll_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.install_poll_secs)
    }

    /// 위젯 요청 타임아웃
    pub fn widget_timeout(&self) -> Duration {
        Duration::from_millis(self.widgets.request_timeout_ms)
    }
}

fn invalid(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

fn default_dock_capacity() -> usize {
    5
}
fn default_dock_visible_slots() -> usize {
    4
}
fn default_throttle_ms() -> u64 {
    5_000
}
fn default_uninstall_refresh_delay_ms() -> u64 {
    2_500
}
fn default_foreground_refresh_delay_ms() -> u64 {
    500
}
fn default_poll_interval_secs() -> u64 {
    60
}
fn default_daily_reset_hour() -> u32 {
    1
}
fn default_install_poll_secs() -> u64 {
    10
}
fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com".to_string()
}
fn default_forecast_url() -> String {
    "https://api.open-meteo.com".to_string()
}
fn default_exchange_url() -> String {
    "https://open.er-api.com".to_string()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default_config().validate().is_ok());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"dock":{"capacity":6}}"#).unwrap();
        assert_eq!(config.dock.capacity, 6);
        assert_eq!(config.dock.visible_slots, 4);
        assert_eq!(config.refresh.throttle_ms, 5_000);
        assert!(config.widgets.enabled);
    }

    #[test]
    fn visible_slots_cannot_exceed_capacity() {
        let mut config = AppConfig::default_config();
        config.dock.visible_slots = 6;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "dock.visible_slots"));
    }

    #[test]
    fn reset_hour_range() {
        let mut config = AppConfig::default_config();
        config.messaging.daily_reset_hour = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn duration_helpers() {
        let config = AppConfig::default_config();
        assert_eq!(config.refresh_throttle(), Duration::from_secs(5));
        assert_eq!(config.uninstall_refresh_delay(), Duration::from_millis(2_500));
        assert_eq!(config.message_poll_interval(), Duration::from_secs(60));
    }
}
