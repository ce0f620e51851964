//! 설정 및 DI 와이어링 통합 테스트.
//!
//! AppConfig → 어댑터 생성 검증.

use mockito::Matcher;
use perch_core::config::AppConfig;
use perch_core::config_manager::ConfigManager;
use perch_core::error::CoreError;
use perch_core::ports::events::EventSource;
use perch_core::ports::package_manager::PackageManager;
use perch_core::ports::widgets::{ExchangeRateProvider, WeatherProvider};
use perch_monitor::desktop_entries::{default_application_dirs, DesktopEntryScanner};
use perch_monitor::install_watcher::InstallWatcher;
use perch_network::exchange::OpenErApiClient;
use perch_network::weather::OpenMeteoClient;
use perch_storage::file_store::FilePreferenceStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

#[test]
fn config_defaults_are_valid() {
    let config = AppConfig::default_config();
    config.validate().unwrap();

    // 독 설정
    assert_eq!(config.dock.capacity, 5);
    assert_eq!(config.dock.visible_slots, 4);

    // 새로고침 설정
    assert_eq!(config.refresh_throttle(), Duration::from_secs(5));
    assert_eq!(config.uninstall_refresh_delay(), Duration::from_millis(2_500));
    assert_eq!(config.foreground_refresh_delay(), Duration::from_millis(500));

    // 메시지 설정
    assert!(config.messaging.enabled);
    assert!(config.message_poll_interval() > Duration::ZERO);
    assert!(config.messaging.daily_reset_hour < 24);

    // 위젯 설정
    assert!(config.widget_timeout() > Duration::ZERO);
}

#[test]
fn partial_config_json_fills_defaults() {
    let config: AppConfig = serde_json::from_str(r#"{"dock":{"capacity":6}}"#).unwrap();
    assert_eq!(config.dock.capacity, 6);
    assert_eq!(config.dock.visible_slots, 4);
    assert_eq!(config.refresh.throttle_ms, 5_000);
    config.validate().unwrap();
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = AppConfig::default_config();
    config.dock.visible_slots = 9;
    assert!(matches!(config.validate(), Err(CoreError::Validation { .. })));
}

#[test]
fn config_manager_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let manager = ConfigManager::with_path(path.clone()).unwrap();
    assert!(path.exists());
    assert_eq!(manager.get().dock.capacity, 5);

    let updated = manager
        .update_with(|c| c.refresh.throttle_ms = 1_000)
        .unwrap();
    assert_eq!(updated.refresh.throttle_ms, 1_000);

    let reopened = ConfigManager::with_path(path).unwrap();
    assert_eq!(reopened.get().refresh_throttle(), Duration::from_secs(1));

    let rejected = manager.update_with(|c| c.dock.capacity = 0);
    assert!(rejected.is_err());
    assert_eq!(manager.get().dock.capacity, 5);
}

#[tokio::test]
async fn adapters_build_from_config() {
    let apps = TempDir::new().unwrap();
    let prefs = TempDir::new().unwrap();
    let mut config = AppConfig::default_config();
    config.monitor.application_dirs = vec![apps.path().to_path_buf()];

    let scanner = DesktopEntryScanner::from_config(&config.monitor);
    assert_eq!(scanner.dirs(), [apps.path().to_path_buf()]);
    assert!(scanner.enumerate_installed_apps().await.unwrap().is_empty());

    let defaults = DesktopEntryScanner::from_config(&AppConfig::default_config().monitor);
    assert_eq!(defaults.dirs(), default_application_dirs().as_slice());

    let store = FilePreferenceStore::open(prefs.path())
        .await
        .unwrap()
        .with_dock_capacity(config.dock.capacity);
    assert_eq!(store.dir(), prefs.path());

    let watcher: Arc<dyn EventSource> = Arc::new(InstallWatcher::from_config(&config.monitor));
    let (tx, _rx) = mpsc::unbounded_channel();
    let subscription = watcher.subscribe(tx);
    subscription.cancel();

    OpenMeteoClient::from_config(&config.widgets).unwrap();
    OpenErApiClient::from_config(&config.widgets).unwrap();
}

#[tokio::test]
async fn widget_clients_use_configured_endpoints() {
    let mut server = mockito::Server::new_async().await;
    let mut config = AppConfig::default_config();
    config.widgets.geocoding_url = server.url();
    config.widgets.forecast_url = server.url();
    config.widgets.exchange_url = server.url();

    let rates = server
        .mock("GET", "/v6/latest/USD")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result":"success","rates":{"EUR":0.5}}"#)
        .create_async()
        .await;
    let geo = server
        .mock("GET", "/v1/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results":[]}"#)
        .create_async()
        .await;

    let exchange = OpenErApiClient::from_config(&config.widgets).unwrap();
    let quote = exchange.convert("USD", "EUR", 10.0).await.unwrap();
    assert_eq!(quote.converted, 5.0);

    let weather = OpenMeteoClient::from_config(&config.widgets).unwrap();
    let err = weather.current_weather("Atlantis").await.unwrap_err();
    assert_eq!(err.user_message(), "Location not found.");

    rates.assert_async().await;
    geo.assert_async().await;
}

#[test]
fn bad_widget_url_is_config_error() {
    let mut config = AppConfig::default_config();
    config.widgets.exchange_url = "not a url".to_string();
    let client = OpenErApiClient::from_config(&config.widgets).unwrap();

    let result = tokio_test::block_on(client.convert("USD", "EUR", 1.0));
    assert!(matches!(result, Err(CoreError::Config(_))));
}
