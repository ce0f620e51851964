//! Cross-crate 에러 경로 테스트.
//!
//! 손상된 저장 파일, 열거 실패, 실행 실패가 마지막 정상 상태를 유지하는지 검증한다.

use perch_core::config::DockConfig;
use perch_core::error::CoreError;
use perch_core::models::preferences::PreferenceKey;
use perch_core::ports::package_manager::PackageManager;
use perch_core::ports::preferences::PreferenceStore;
use perch_launcher::reconciler::Reconciler;
use perch_monitor::desktop_entries::DesktopEntryScanner;
use perch_storage::file_store::FilePreferenceStore;
use std::sync::Arc;
use tempfile::TempDir;

async fn reconciler(apps: &TempDir, prefs: &TempDir) -> Reconciler {
    let pm: Arc<dyn PackageManager> =
        Arc::new(DesktopEntryScanner::new(vec![apps.path().to_path_buf()]));
    let store: Arc<dyn PreferenceStore> =
        Arc::new(FilePreferenceStore::open(prefs.path()).await.unwrap());
    Reconciler::load(pm, store, &DockConfig::default())
        .await
        .unwrap()
}

fn install(apps: &TempDir, id: &str, body: &str) {
    std::fs::write(apps.path().join(format!("{id}.desktop")), body).unwrap();
}

#[tokio::test]
async fn corrupt_files_fall_back_to_defaults() {
    let apps = TempDir::new().unwrap();
    let prefs = TempDir::new().unwrap();
    let store = FilePreferenceStore::open(prefs.path()).await.unwrap();
    std::fs::write(store.path_for(PreferenceKey::DockPackages), "{not json").unwrap();
    std::fs::write(store.path_for(PreferenceKey::ShowNames), "sometimes").unwrap();
    std::fs::write(store.path_for(PreferenceKey::HiddenPackages), r#"["pkg.a"]"#).unwrap();

    let launcher = reconciler(&apps, &prefs).await;
    assert!(launcher.dock().is_empty());
    assert!(launcher.settings().show_names);
    assert_eq!(launcher.hidden().as_slice(), ["pkg.a"]);
}

#[tokio::test]
async fn missing_app_dirs_keep_previous_catalog() {
    let apps = TempDir::new().unwrap();
    let prefs = TempDir::new().unwrap();
    install(
        &apps,
        "org.mail",
        "[Desktop Entry]\nType=Application\nName=Mail\nExec=mail\n",
    );
    let mut launcher = reconciler(&apps, &prefs).await;
    launcher.refresh_catalog().await.unwrap();
    let generation = launcher.catalog_generation();

    let apps_path = apps.path().to_path_buf();
    drop(apps);
    assert!(!apps_path.exists());

    let err = launcher.refresh_catalog().await.unwrap_err();
    assert!(matches!(err, CoreError::Enumeration(_)));
    assert_eq!(launcher.catalog_generation(), generation);
    assert!(launcher.catalog().contains("org.mail"));
    assert_eq!(launcher.views().visible_apps.len(), 1);
}

#[tokio::test]
async fn launch_errors_are_generic_for_users() {
    let apps = TempDir::new().unwrap();
    let prefs = TempDir::new().unwrap();
    install(
        &apps,
        "org.broken",
        "[Desktop Entry]\nType=Application\nName=Broken\nExec=/nonexistent/perch-test-binary\n",
    );
    install(&apps, "org.noexec", "[Desktop Entry]\nType=Application\nName=NoExec\n");
    let mut launcher = reconciler(&apps, &prefs).await;
    launcher.refresh_catalog().await.unwrap();

    for pkg in ["org.broken", "org.noexec", "org.missing"] {
        let err = launcher.launch(pkg).await.unwrap_err();
        assert!(matches!(err, CoreError::Launch { .. }), "{pkg}: {err:?}");
        assert_eq!(err.user_message(), "Cannot Open");
    }
}

#[tokio::test]
async fn operations_on_unknown_packages_are_rejected() {
    let apps = TempDir::new().unwrap();
    let prefs = TempDir::new().unwrap();
    install(
        &apps,
        "org.mail",
        "[Desktop Entry]\nType=Application\nName=Mail\nExec=mail\n",
    );
    let mut launcher = reconciler(&apps, &prefs).await;
    launcher.refresh_catalog().await.unwrap();

    assert!(matches!(
        launcher.hide("org.ghost").await,
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        launcher.pin_to_dock("org.ghost").await,
        Err(CoreError::NotFound { .. })
    ));
    assert!(!launcher.unhide("org.ghost").await.unwrap());
    assert!(launcher.hidden().is_empty());
    assert!(launcher.dock().is_empty());
}

#[tokio::test]
async fn blank_names_are_validation_errors() {
    let apps = TempDir::new().unwrap();
    let prefs = TempDir::new().unwrap();
    let mut launcher = reconciler(&apps, &prefs).await;

    assert!(matches!(
        launcher.set_user_name("   ").await,
        Err(CoreError::Validation { .. })
    ));
    assert!(matches!(
        launcher.set_avatar(Vec::new()).await,
        Err(CoreError::Validation { .. })
    ));
    assert_eq!(launcher.settings().user_name, "User");
}
