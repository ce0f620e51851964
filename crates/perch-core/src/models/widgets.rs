//! 날씨/환율 위젯 응답 모델.

use serde::{Deserialize, Serialize};

/// 환율 위젯에서 선택 가능한 통화
pub const SUPPORTED_CURRENCIES: [&str; 12] = [
    "USD", "EUR", "IDR", "GBP", "JPY", "CNY", "SGD", "AUD", "KRW", "MYR", "THB", "INR",
];

/// 현재 날씨
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// "도시, 국가"
    pub city: String,
    /// 기온 (반올림, °C)
    pub temperature_c: i32,
    /// WMO 날씨 코드
    pub weather_code: u32,
    pub description: String,
    /// 풍속 (반올림, km/h)
    pub wind_kmh: i32,
    /// 상대 습도 (%)
    pub humidity_pct: u32,
}

/// 환율 조회 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeQuote {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub rate: f64,
    pub converted: f64,
}

/// WMO 날씨 코드 → 설명
pub fn weather_description(code: u32) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Partly cloudy",
        4..=9 => "Foggy",
        10..=29 => "Rain",
        30..=39 => "Snow",
        40..=69 => "Drizzle / Rain",
        70..=79 => "Snow showers",
        80..=84 => "Rain showers",
        _ => "Thunderstorm",
    }
}

/// 지원 통화인지 확인 (대소문자 무시)
pub fn is_supported_currency(code: &str) -> bool {
    SUPPORTED_CURRENCIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_code_buckets() {
        assert_eq!(weather_description(0), "Clear sky");
        assert_eq!(weather_description(3), "Partly cloudy");
        assert_eq!(weather_description(45), "Drizzle / Rain");
        assert_eq!(weather_description(61), "Drizzle / Rain");
        assert_eq!(weather_description(80), "Rain showers");
        assert_eq!(weather_description(95), "Thunderstorm");
    }

    #[test]
    fn currency_support() {
        assert!(is_supported_currency("usd"));
        assert!(is_supported_currency("IDR"));
        assert!(!is_supported_currency("BTC"));
    }
}
