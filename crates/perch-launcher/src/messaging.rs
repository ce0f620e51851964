//! 시간대별 어시스턴트 메시지.
//!
//! 하루를 다섯 구간으로 나누고, 구간마다 인사말을 고른다.
//! `PeriodWatcher`는 구간이 바뀔 때만 신호를 준다.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 하루의 시간 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    /// 22:00 - 03:59
    LateNight,
    /// 04:00 - 10:59
    Morning,
    /// 11:00 - 14:59
    Afternoon,
    /// 15:00 - 17:59
    Evening,
    /// 18:00 - 21:59
    Night,
}

impl TimePeriod {
    /// 시(0-23)로 구간 판정
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            4..=10 => TimePeriod::Morning,
            11..=14 => TimePeriod::Afternoon,
            15..=17 => TimePeriod::Evening,
            18..=21 => TimePeriod::Night,
            _ => TimePeriod::LateNight,
        }
    }

    /// 시각의 구간 (해당 시각의 시간대 기준)
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self::from_hour(now.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::LateNight => "late_night",
            TimePeriod::Morning => "morning",
            TimePeriod::Afternoon => "afternoon",
            TimePeriod::Evening => "evening",
            TimePeriod::Night => "night",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 구간별 인사말
pub fn greeting_for(period: TimePeriod, user_name: &str) -> String {
    match period {
        TimePeriod::Morning => format!(
            "Good morning, {user_name}! Rise and conquer the day. I'm always cheering for you!"
        ),
        TimePeriod::Afternoon => format!(
            "Take a break! Have you had lunch yet, {user_name}? Don't skip meals!"
        ),
        TimePeriod::Evening => {
            format!("You must be tired, {user_name}. Go ahead and take a breather, okay?")
        }
        TimePeriod::Night => format!(
            "All done for the day? Time to wind down and relax, {user_name}. You deserve it."
        ),
        TimePeriod::LateNight => format!(
            "It's late, {user_name}. Put the phone down and get some rest! Your health comes first."
        ),
    }
}

/// 구간 변경 감지기
#[derive(Debug, Clone, Default)]
pub struct PeriodWatcher {
    last: Option<TimePeriod>,
}

impl PeriodWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이미 알고 있는 구간으로 시작 (첫 관찰에서 신호를 주지 않음)
    pub fn starting_at(period: TimePeriod) -> Self {
        Self { last: Some(period) }
    }

    /// 현재 시각 관찰. 구간이 바뀌었으면 새 구간
    pub fn observe<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Option<TimePeriod> {
        let period = TimePeriod::at(now);
        if self.last == Some(period) {
            return None;
        }
        self.last = Some(period);
        Some(period)
    }

    pub fn current(&self) -> Option<TimePeriod> {
        self.last
    }
}

/// 하루 한 번 알림을 띄울지 판단
///
/// `now`와 같은 날짜(`now`의 시간대 기준)에 닫은 기록이 없고
/// 현재 시가 `reset_hour` 이상이면 true.
pub fn should_show_daily_notification<Tz: TimeZone>(
    now: &DateTime<Tz>,
    dismissed_at: Option<DateTime<Utc>>,
    reset_hour: u32,
) -> bool {
    if now.hour() < reset_hour {
        return false;
    }
    match dismissed_at {
        Some(at) => at.with_timezone(&now.timezone()).date_naive() != now.date_naive(),
        None => true,
    }
}
