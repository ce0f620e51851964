//! 어시스턴트 알림 관리자.
//!
//! 하루 한 번 게이트가 열리면 인사말을 띄우고, 시간 구간이 바뀌면 다시 띄운다.
//! 닫은 시각은 호출자가 `Reconciler`를 통해 저장한다.

use chrono::{DateTime, TimeZone};
use perch_core::config::MessagingConfig;
use perch_core::ports::notifier::Notifier;
use perch_launcher::messaging::{
    greeting_for, should_show_daily_notification, PeriodWatcher, TimePeriod,
};
use perch_launcher::reconciler::LauncherSettings;
use std::sync::Arc;
use tracing::{debug, info};

/// 알림 관리자
pub struct NotificationManager {
    config: MessagingConfig,
    notifier: Arc<dyn Notifier>,
    watcher: PeriodWatcher,
    /// 현재 떠 있는 알림 본문
    showing: Option<String>,
}

impl NotificationManager {
    pub fn new(config: MessagingConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            notifier,
            watcher: PeriodWatcher::new(),
            showing: None,
        }
    }

    /// 현재 떠 있는 알림 본문
    pub fn current(&self) -> Option<&str> {
        self.showing.as_deref()
    }

    /// 일일 게이트 확인 (시작 시, 포그라운드 복귀 시)
    ///
    /// 알림을 띄웠으면 true.
    pub async fn check_daily<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        settings: &LauncherSettings,
    ) -> bool {
        // 첫 관찰은 기준 구간만 기록, 이후 변경은 주기 확인과 같게 처리
        let seeded = self.watcher.current().is_some();
        let changed = self.watcher.observe(now).filter(|_| seeded);

        if !self.config.enabled {
            return false;
        }
        if let Some(period) = changed {
            info!("시간 구간 변경 (포그라운드): {period}");
            return self.show(period, settings).await;
        }
        if self.showing.is_some() {
            return false;
        }
        if !should_show_daily_notification(
            now,
            settings.notification_dismissed_at,
            self.config.daily_reset_hour,
        ) {
            debug!("오늘 이미 닫은 알림, 표시 생략");
            return false;
        }
        self.show(TimePeriod::at(now), settings).await
    }

    /// 주기 확인 (구간이 바뀌었으면 다시 표시)
    pub async fn on_tick<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        settings: &LauncherSettings,
    ) -> bool {
        let Some(period) = self.watcher.observe(now) else {
            return false;
        };
        if !self.config.enabled {
            return false;
        }
        info!("시간 구간 변경: {period}");
        self.show(period, settings).await
    }

    /// 알림 닫기. 떠 있었으면 true
    pub fn dismiss(&mut self) -> bool {
        self.showing.take().is_some()
    }

    async fn show(&mut self, period: TimePeriod, settings: &LauncherSettings) -> bool {
        let body = greeting_for(period, &settings.user_name);
        match self
            .notifier
            .show_notification(&settings.assistant_name, &body)
            .await
        {
            Ok(()) => {
                info!("어시스턴트 알림 표시: {period}");
                self.showing = Some(body);
                true
            }
            Err(e) => {
                debug!("어시스턴트 알림 실패: {e}");
                false
            }
        }
    }
}
