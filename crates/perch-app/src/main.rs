//! # perch-app
//!
//! PERCH 런처 바이너리 진입점.
//! 어댑터 조립(DI), 런타임 루프 실행, 일회성 CLI 명령 처리.

mod console;
mod lifecycle;
mod notification_manager;
mod runtime;
mod shell;
#[cfg(test)]
mod testing;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use perch_core::config::AppConfig;
use perch_core::config_manager::ConfigManager;
use perch_core::models::preferences::{parse_flag, LayoutMode};
use perch_core::ports::events::EventSource;
use perch_core::ports::image_picker::ImagePicker;
use perch_core::ports::notifier::Notifier;
use perch_core::ports::package_manager::PackageManager;
use perch_core::ports::preferences::PreferenceStore;
use perch_core::ports::widgets::{ExchangeRateProvider, WeatherProvider};
use perch_launcher::messaging::{greeting_for, TimePeriod};
use perch_launcher::reconciler::{PinOutcome, Reconciler};
use perch_monitor::desktop_entries::DesktopEntryScanner;
use perch_monitor::install_watcher::InstallWatcher;
use perch_network::exchange::OpenErApiClient;
use perch_network::weather::OpenMeteoClient;
use perch_storage::file_store::FilePreferenceStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{render_screen, ConsoleNotifier, PathImagePicker};
use crate::lifecycle::LifecycleManager;
use crate::runtime::LauncherRuntime;

/// PERCH 런처
///
/// 설치된 앱 목록, 독, 숨김 앱, 어시스턴트 인사말 관리
#[derive(Parser, Debug)]
#[command(name = "perch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 환경설정 저장 경로 (기본: 플랫폼 데이터 디렉토리)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 대화형 런처 실행 (기본)
    Run,
    /// 화면 상태 출력
    Apps {
        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },
    /// 앱 숨김
    Hide { package: String },
    /// 앱 숨김 해제
    Unhide { package: String },
    /// 독 고정 토글
    Pin { package: String },
    /// 앱 삭제 요청
    Uninstall { package: String },
    /// 앱 실행
    Launch { package: String },
    /// 사용자 이름 변경
    SetName { name: String },
    /// 어시스턴트 이름 변경
    SetAssistant { name: String },
    /// 숨김 앱 표시 여부 (true/false)
    ShowHidden { value: String },
    /// 앱 이름 표시 여부 (true/false)
    ShowNames { value: String },
    /// 레이아웃 (grid/list)
    Layout { mode: String },
    /// 아바타 이미지 지정
    Avatar { path: PathBuf },
    /// 현재 시간대 인사말 출력
    Greet,
    /// 날씨 조회
    Weather { location: String },
    /// 환율 변환
    Exchange {
        from: String,
        to: String,
        #[arg(default_value_t = 1.0)]
        amount: f64,
    },
}

/// 조립된 어댑터 묶음
struct Services {
    config: AppConfig,
    store: Arc<dyn PreferenceStore>,
    packages: Arc<dyn PackageManager>,
    notifier: Arc<dyn Notifier>,
}

impl Services {
    async fn reconciler(&self) -> Result<Reconciler> {
        let reconciler =
            Reconciler::load(self.packages.clone(), self.store.clone(), &self.config.dock).await?;
        Ok(reconciler)
    }

    /// 일회성 명령용: 카탈로그 새로고침 후 엔진 반환
    async fn refreshed(&self) -> Result<Reconciler> {
        let mut reconciler = self.reconciler().await?;
        if let Err(e) = reconciler.refresh_catalog().await {
            warn!("카탈로그 새로고침 실패 (카탈로그에 없는 앱은 숨김/고정 불가): {e}");
        }
        Ok(reconciler)
    }
}

fn init_tracing(level: &str) {
    let log_filter = format!(
        "perch={level},perch_app={level},perch_core={level},perch_launcher={level},perch_monitor={level},perch_storage={level},perch_network={level}"
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn build_services(args: &Args) -> Result<Services> {
    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("설정 로드 실패")?;
    info!("설정 파일: {:?}", config_manager.config_path());

    let mut config = config_manager.get();
    if let Some(dir) = &args.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    config.validate()?;

    let data_dir = match &config.storage.data_dir {
        Some(dir) => dir.clone(),
        None => ConfigManager::data_dir()?,
    };
    info!("환경설정 경로: {}", data_dir.display());

    let store = FilePreferenceStore::open(&data_dir)
        .await?
        .with_dock_capacity(config.dock.capacity);
    let packages = DesktopEntryScanner::from_config(&config.monitor);

    Ok(Services {
        store: Arc::new(store),
        packages: Arc::new(packages),
        notifier: Arc::new(ConsoleNotifier),
        config,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let services = build_services(&args).await?;
    match args.command.unwrap_or(Command::Run) {
        Command::Run => run_interactive(services).await,
        command => run_once(services, command).await,
    }
}

async fn run_interactive(services: Services) -> Result<()> {
    let reconciler = services.reconciler().await?;
    let runtime = LauncherRuntime::new(reconciler, services.notifier.clone(), &services.config);
    let screen = runtime.screen();

    let lifecycle = LifecycleManager::new();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let events: Arc<dyn EventSource> = Arc::new(InstallWatcher::from_config(&services.config.monitor));
    let runtime_task = tokio::spawn(runtime.run(events, command_rx, lifecycle.subscribe()));

    tokio::select! {
        result = shell::run_shell(command_tx, screen, &lifecycle) => result?,
        result = lifecycle.wait_for_signal() => result?,
    }
    lifecycle.shutdown();

    runtime_task
        .await
        .map_err(|e| anyhow!("런타임 태스크 실패: {e}"))?;
    info!("PERCH 종료");
    Ok(())
}

async fn run_once(services: Services, command: Command) -> Result<()> {
    let notifier = services.notifier.clone();
    let config = &services.config;

    match command {
        Command::Run => return Err(anyhow!("run은 대화형 모드에서만 처리")),
        Command::Apps { json } => {
            let reconciler = services.refreshed().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(reconciler.views())?);
            } else {
                let state = runtime::ScreenState {
                    views: reconciler.views().clone(),
                    settings: reconciler.settings().clone(),
                    notification: None,
                    todos: Vec::new(),
                    countdowns: Vec::new(),
                };
                print!("{}", render_screen(&state, Local::now().date_naive()));
            }
        }
        Command::Hide { package } => {
            if services.refreshed().await?.hide(&package).await? {
                notifier.show_toast("App Hidden").await?;
            }
        }
        Command::Unhide { package } => {
            if services.refreshed().await?.unhide(&package).await? {
                notifier.show_toast("App Unhidden").await?;
            }
        }
        Command::Pin { package } => {
            let outcome = services.refreshed().await?.pin_to_dock(&package).await?;
            match outcome {
                PinOutcome::RejectedFull { .. } => notifier.show_error(&outcome.message()).await?,
                _ => notifier.show_toast(&outcome.message()).await?,
            }
        }
        Command::Uninstall { package } => {
            let mut reconciler = services.refreshed().await?;
            reconciler.uninstall(&package).await?;
            tokio::time::sleep(config.uninstall_refresh_delay()).await;
            reconciler.refresh_catalog().await?;
            if reconciler.catalog().contains(&package) {
                warn!("삭제 후에도 앱이 남아 있음: {package}");
            }
        }
        Command::Launch { package } => {
            if let Err(e) = services.refreshed().await?.launch(&package).await {
                notifier.show_error(&e.user_message()).await?;
                return Err(e.into());
            }
        }
        Command::SetName { name } => services.reconciler().await?.set_user_name(&name).await?,
        Command::SetAssistant { name } => {
            services.reconciler().await?.set_assistant_name(&name).await?
        }
        Command::ShowHidden { value } => {
            let show = parse_flag(&value).ok_or_else(|| anyhow!("true/false 값 필요: {value}"))?;
            services.reconciler().await?.set_show_hidden(show).await?
        }
        Command::ShowNames { value } => {
            let show = parse_flag(&value).ok_or_else(|| anyhow!("true/false 값 필요: {value}"))?;
            services.reconciler().await?.set_show_names(show).await?
        }
        Command::Layout { mode } => {
            let mode: LayoutMode = mode.parse()?;
            services.reconciler().await?.set_layout_mode(mode).await?
        }
        Command::Avatar { path } => {
            let picker = PathImagePicker::new(Some(path));
            if let Some(bytes) = picker.pick_image().await? {
                services.reconciler().await?.set_avatar(bytes).await?;
                notifier.show_toast("Avatar updated").await?;
            }
        }
        Command::Greet => {
            let reconciler = services.reconciler().await?;
            let settings = reconciler.settings();
            let period = TimePeriod::at(&Local::now());
            notifier
                .show_notification(
                    &settings.assistant_name,
                    &greeting_for(period, &settings.user_name),
                )
                .await?;
        }
        Command::Weather { location } => {
            let client = OpenMeteoClient::from_config(&config.widgets)?;
            match client.current_weather(&location).await {
                Ok(report) => println!(
                    "{}: {}°C, {} (wind {} km/h, humidity {}%)",
                    report.city,
                    report.temperature_c,
                    report.description,
                    report.wind_kmh,
                    report.humidity_pct
                ),
                Err(e) => {
                    notifier.show_error(&e.user_message()).await?;
                    return Err(e.into());
                }
            }
        }
        Command::Exchange { from, to, amount } => {
            let client = OpenErApiClient::from_config(&config.widgets)?;
            match client.convert(&from, &to, amount).await {
                Ok(quote) => println!(
                    "{:.2} {} = {:.2} {} (rate {:.4})",
                    quote.amount, quote.from, quote.converted, quote.to, quote.rate
                ),
                Err(e) => {
                    notifier.show_error(&e.user_message()).await?;
                    return Err(e.into());
                }
            }
        }
    }
    Ok(())
}
