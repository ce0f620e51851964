//! open.er-api 환율 어댑터.

use async_trait::async_trait;
use perch_core::config::WidgetConfig;
use perch_core::error::CoreError;
use perch_core::models::widgets::{is_supported_currency, ExchangeQuote};
use perch_core::ports::widgets::ExchangeRateProvider;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::http::{build_client, endpoint, get_json};

#[derive(Debug, Deserialize)]
struct LatestRates {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// open.er-api 클라이언트 (ExchangeRateProvider 구현)
pub struct OpenErApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenErApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.to_string(),
        })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, CoreError> {
        Self::new(
            &config.exchange_url,
            Duration::from_millis(config.request_timeout_ms),
        )
    }
}

fn currency(field: &str, code: &str) -> Result<String, CoreError> {
    let code = code.trim().to_uppercase();
    if !is_supported_currency(&code) {
        return Err(CoreError::Validation {
            field: field.to_string(),
            message: format!("지원하지 않는 통화: {code}"),
        });
    }
    Ok(code)
}

#[async_trait]
impl ExchangeRateProvider for OpenErApiClient {
    async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<ExchangeQuote, CoreError> {
        let from = currency("from", from)?;
        let to = currency("to", to)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::Validation {
                field: "amount".to_string(),
                message: format!("잘못된 금액: {amount}"),
            });
        }

        let url = endpoint(&self.base_url, &format!("/v6/latest/{from}"), &[])?;
        let latest: LatestRates = get_json(&self.client, url).await?;
        if latest.result != "success" {
            return Err(CoreError::Network(format!(
                "환율 API 실패 응답: {}",
                latest.result
            )));
        }

        let rate = *latest.rates.get(&to).ok_or_else(|| CoreError::NotFound {
            resource_type: "ExchangeRate".to_string(),
            id: format!("{from}/{to}"),
        })?;

        debug!("환율 {from}/{to} = {rate}");
        Ok(ExchangeQuote {
            from,
            to,
            amount,
            rate,
            converted: amount * rate,
        })
    }
}
