//! 날씨/환율 위젯 포트.
//!
//! 구현: `perch-network` crate (reqwest). 재시도/백오프 없음.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::widgets::{ExchangeQuote, WeatherReport};

/// 현재 날씨 조회
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// 지명으로 현재 날씨 조회
    async fn current_weather(&self, location: &str) -> Result<WeatherReport, CoreError>;
}

/// 환율 조회
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// `amount` 만큼의 `from` 통화를 `to` 통화로 환산
    async fn convert(&self, from: &str, to: &str, amount: f64)
        -> Result<ExchangeQuote, CoreError>;
}
