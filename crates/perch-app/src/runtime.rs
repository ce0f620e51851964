//! 런처 런타임 루프.
//!
//! 하나의 tokio 태스크가 `Reconciler`를 소유하고 사용자 명령, 플랫폼 이벤트,
//! 지연 새로고침, 알림 주기를 `tokio::select!`로 직렬 처리한다.
//! 엔진 상태에는 락이 없다. 매 처리 후 화면 상태를 `watch` 채널로 발행한다.

use chrono::{Local, NaiveDate, Utc};
use perch_core::config::AppConfig;
use perch_core::error::CoreError;
use perch_core::models::event::PlatformEvent;
use perch_core::ports::events::EventSource;
use perch_core::ports::notifier::Notifier;
use perch_launcher::reconciler::{LauncherSettings, Reconciler};
use perch_launcher::refresh::{DelayedRefresh, RefreshReason, RefreshThrottle};
use perch_launcher::tools::{CountdownItem, CountdownList, TodoItem, TodoList};
use perch_launcher::views::LauncherViews;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::notification_manager::NotificationManager;

/// 런타임에 보내는 사용자 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    Hide(String),
    Unhide(String),
    Pin(String),
    Uninstall(String),
    Launch(String),
    ShowHidden(bool),
    /// 런처 화면 복귀
    Resume,
    /// 런처 화면 이탈
    Pause,
    /// 알림 닫기
    Dismiss,
    Refresh,
    TodoAdd(String),
    /// 1부터 시작하는 표시 순번
    TodoToggle(usize),
    /// 1부터 시작하는 표시 순번
    TodoRemove(usize),
    CountdownAdd { name: String, target: NaiveDate },
    /// 1부터 시작하는 표시 순번
    CountdownRemove(usize),
}

/// 렌더링용 화면 상태
#[derive(Debug, Clone)]
pub struct ScreenState {
    pub views: LauncherViews,
    pub settings: LauncherSettings,
    pub notification: Option<String>,
    pub todos: Vec<TodoItem>,
    pub countdowns: Vec<CountdownItem>,
}

/// 런처 런타임
pub struct LauncherRuntime {
    reconciler: Reconciler,
    notifier: Arc<dyn Notifier>,
    notifications: NotificationManager,
    throttle: RefreshThrottle,
    delayed: DelayedRefresh,
    refresh_rx: mpsc::UnboundedReceiver<RefreshReason>,
    uninstall_refresh_delay: Duration,
    foreground_refresh_delay: Duration,
    message_poll_interval: Duration,
    todos: TodoList,
    countdowns: CountdownList,
    screen_tx: watch::Sender<ScreenState>,
}

impl LauncherRuntime {
    pub fn new(reconciler: Reconciler, notifier: Arc<dyn Notifier>, config: &AppConfig) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let notifications = NotificationManager::new(config.messaging.clone(), notifier.clone());
        let (screen_tx, _) = watch::channel(ScreenState {
            views: reconciler.views().clone(),
            settings: reconciler.settings().clone(),
            notification: None,
            todos: Vec::new(),
            countdowns: Vec::new(),
        });

        Self {
            reconciler,
            notifier,
            notifications,
            throttle: RefreshThrottle::new(config.refresh_throttle()),
            delayed: DelayedRefresh::new(refresh_tx),
            refresh_rx,
            uninstall_refresh_delay: config.uninstall_refresh_delay(),
            foreground_refresh_delay: config.foreground_refresh_delay(),
            message_poll_interval: config.message_poll_interval(),
            todos: TodoList::new(),
            countdowns: CountdownList::new(),
            screen_tx,
        }
    }

    /// 화면 상태 구독
    pub fn screen(&self) -> watch::Receiver<ScreenState> {
        self.screen_tx.subscribe()
    }

    /// 종료 신호 또는 명령 채널 종료까지 실행
    pub async fn run(
        mut self,
        events: Arc<dyn EventSource>,
        mut commands: mpsc::UnboundedReceiver<RuntimeCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let _subscription = events.subscribe(event_tx);

        self.request_refresh(RefreshReason::Startup).await;
        self.notifications
            .check_daily(&Local::now(), self.reconciler.settings())
            .await;
        self.publish();

        let mut ticker = tokio::time::interval(self.message_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        info!("런처 런타임 시작");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("종료 신호 수신");
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("명령 채널 종료");
                        break;
                    }
                },
                Some(event) = event_rx.recv() => self.handle_event(event).await,
                Some(reason) = self.refresh_rx.recv() => self.request_refresh(reason).await,
                _ = ticker.tick() => {
                    self.notifications
                        .on_tick(&Local::now(), self.reconciler.settings())
                        .await;
                }
            }
            self.publish();
        }

        self.delayed.cancel();
        info!("런처 런타임 종료");
    }

    /// 모든 새로고침 트리거의 단일 진입점 (스로틀 적용)
    async fn request_refresh(&mut self, reason: RefreshReason) {
        if !self.throttle.try_acquire(Instant::now()) {
            if reason == RefreshReason::PostUninstall {
                // 다음 트리거가 올 때까지 낙관적 삭제 상태가 유지됨
                debug!("삭제 확인 새로고침 생략 (스로틀 구간 안)");
            } else {
                debug!("새로고침 생략 (스로틀): {reason:?}");
            }
            return;
        }
        match self.reconciler.refresh_catalog().await {
            Ok(count) => debug!("새로고침 완료 ({reason:?}): {count}개 앱"),
            Err(e) => {
                warn!("새로고침 실패 ({reason:?}): {e}");
                self.error(&e).await;
            }
        }
    }

    async fn handle_event(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::PackagesChanged { package_id } => {
                debug!("패키지 변경 이벤트: {package_id:?}");
                self.request_refresh(RefreshReason::PackagesChanged).await;
            }
            PlatformEvent::Foreground => {
                self.delayed
                    .schedule(self.foreground_refresh_delay, RefreshReason::Foreground);
                self.notifications
                    .check_daily(&Local::now(), self.reconciler.settings())
                    .await;
            }
            PlatformEvent::Background => debug!("런처 비활성"),
        }
    }

    async fn handle_command(&mut self, command: RuntimeCommand) {
        debug!("명령 처리: {command:?}");
        let result = match command {
            RuntimeCommand::Hide(pkg) => match self.reconciler.hide(&pkg).await {
                Ok(true) => self.toast("App Hidden").await,
                Ok(false) => Ok(()),
                Err(e) => Err(e),
            },
            RuntimeCommand::Unhide(pkg) => match self.reconciler.unhide(&pkg).await {
                Ok(true) => self.toast("App Unhidden").await,
                Ok(false) => Ok(()),
                Err(e) => Err(e),
            },
            RuntimeCommand::Pin(pkg) => match self.reconciler.pin_to_dock(&pkg).await {
                Ok(outcome) => self.toast(&outcome.message()).await,
                Err(e) => Err(e),
            },
            RuntimeCommand::Uninstall(pkg) => {
                let result = self.reconciler.uninstall(&pkg).await;
                // 저장 실패와 관계없이 확인용 새로고침은 한 번 예약
                self.delayed
                    .schedule(self.uninstall_refresh_delay, RefreshReason::PostUninstall);
                result
            }
            RuntimeCommand::Launch(pkg) => self.reconciler.launch(&pkg).await,
            RuntimeCommand::ShowHidden(show) => self.reconciler.set_show_hidden(show).await,
            RuntimeCommand::Resume => {
                self.handle_event(PlatformEvent::Foreground).await;
                Ok(())
            }
            RuntimeCommand::Pause => {
                self.handle_event(PlatformEvent::Background).await;
                Ok(())
            }
            RuntimeCommand::Dismiss => {
                self.notifications.dismiss();
                self.reconciler
                    .record_notification_dismissed(Utc::now())
                    .await
            }
            RuntimeCommand::Refresh => {
                self.request_refresh(RefreshReason::Manual).await;
                Ok(())
            }
            RuntimeCommand::TodoAdd(text) => self.todos.add(&text).map(|_| ()),
            RuntimeCommand::TodoToggle(index) => {
                let id = nth(self.todos.items(), index).map(|t| t.id);
                match id.and_then(|id| self.todos.toggle(id)) {
                    Some(_) => Ok(()),
                    None => Err(not_found("Todo", index)),
                }
            }
            RuntimeCommand::TodoRemove(index) => {
                let id = nth(self.todos.items(), index).map(|t| t.id);
                match id {
                    Some(id) if self.todos.remove(id) => Ok(()),
                    _ => Err(not_found("Todo", index)),
                }
            }
            RuntimeCommand::CountdownAdd { name, target } => {
                self.countdowns.add(&name, target).map(|_| ())
            }
            RuntimeCommand::CountdownRemove(index) => {
                let id = nth(self.countdowns.items(), index).map(|c| c.id);
                match id {
                    Some(id) if self.countdowns.remove(id) => Ok(()),
                    _ => Err(not_found("Countdown", index)),
                }
            }
        };

        if let Err(e) = result {
            self.error(&e).await;
        }
    }

    async fn toast(&self, message: &str) -> Result<(), CoreError> {
        if let Err(e) = self.notifier.show_toast(message).await {
            debug!("토스트 실패: {e}");
        }
        Ok(())
    }

    async fn error(&self, error: &CoreError) {
        if let Err(e) = self.notifier.show_error(&error.user_message()).await {
            debug!("에러 표시 실패: {e}");
        }
    }

    fn publish(&self) {
        self.screen_tx.send_replace(ScreenState {
            views: self.reconciler.views().clone(),
            settings: self.reconciler.settings().clone(),
            notification: self.notifications.current().map(str::to_string),
            todos: self.todos.items().to_vec(),
            countdowns: self.countdowns.items().to_vec(),
        });
    }
}

/// 1부터 시작하는 표시 순번으로 항목 조회
fn nth<T>(items: &[T], index: usize) -> Option<&T> {
    index.checked_sub(1).and_then(|i| items.get(i))
}

fn not_found(resource_type: &str, index: usize) -> CoreError {
    CoreError::NotFound {
        resource_type: resource_type.to_string(),
        id: index.to_string(),
    }
}
