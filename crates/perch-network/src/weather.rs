//! open-meteo 날씨 어댑터.
//!
//! 지명 → 좌표(geocoding API) → 현재 날씨(forecast API) 두 단계로 조회한다.

use async_trait::async_trait;
use perch_core::config::WidgetConfig;
use perch_core::error::CoreError;
use perch_core::models::widgets::{weather_description, WeatherReport};
use perch_core::ports::widgets::WeatherProvider;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::http::{build_client, endpoint, get_json};

/// 현재 날씨로 요청하는 변수
const CURRENT_FIELDS: &str = "temperature_2m,weathercode,windspeed_10m,relativehumidity_2m";

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
}

impl GeocodingResult {
    /// "도시, 국가" 표시 이름
    fn display_name(&self) -> String {
        match &self.country {
            Some(country) if !country.is_empty() => format!("{}, {country}", self.name),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: f64,
    weathercode: u32,
    windspeed_10m: f64,
    relativehumidity_2m: f64,
}

/// open-meteo 클라이언트 (WeatherProvider 구현)
pub struct OpenMeteoClient {
    client: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(geocoding_url: &str, forecast_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        Ok(Self {
            client: build_client(timeout)?,
            geocoding_url: geocoding_url.to_string(),
            forecast_url: forecast_url.to_string(),
        })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, CoreError> {
        Self::new(
            &config.geocoding_url,
            &config.forecast_url,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    async fn geocode(&self, location: &str) -> Result<GeocodingResult, CoreError> {
        let url = endpoint(
            &self.geocoding_url,
            "/v1/search",
            &[
                ("name", location),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ],
        )?;
        let resp: GeocodingResponse = get_json(&self.client, url).await?;
        resp.results
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::NotFound {
                resource_type: "Location".to_string(),
                id: location.to_string(),
            })
    }

    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentWeather, CoreError> {
        let latitude = latitude.to_string();
        let longitude = longitude.to_string();
        let url = endpoint(
            &self.forecast_url,
            "/v1/forecast",
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("timezone", "auto"),
            ],
        )?;
        let resp: ForecastResponse = get_json(&self.client, url).await?;
        Ok(resp.current)
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current_weather(&self, location: &str) -> Result<WeatherReport, CoreError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(CoreError::Validation {
                field: "location".to_string(),
                message: "지명이 비어 있음".to_string(),
            });
        }

        let place = self.geocode(location).await?;
        debug!(
            "지오코딩: {location} → {} ({}, {})",
            place.name, place.latitude, place.longitude
        );
        let current = self.current(place.latitude, place.longitude).await?;

        let report = WeatherReport {
            city: place.display_name(),
            temperature_c: current.temperature_2m.round() as i32,
            weather_code: current.weathercode,
            description: weather_description(current.weathercode).to_string(),
            wind_kmh: current.windspeed_10m.round() as i32,
            humidity_pct: current.relativehumidity_2m.round().max(0.0) as u32,
        };
        info!(
            "날씨 조회: {} {}°C {}",
            report.city, report.temperature_c, report.description
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> OpenMeteoClient {
        OpenMeteoClient::new(&server.url(), &server.url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn current_weather_success() {
        let mut server = mockito::Server::new_async().await;

        let geo = server
            .mock("GET", "/v1/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "Jakarta".into()),
                Matcher::UrlEncoded("count".into(), "1".into()),
                Matcher::UrlEncoded("language".into(), "en".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "results": [{
                        "name": "Jakarta",
                        "latitude": -6.2,
                        "longitude": 106.8,
                        "country": "Indonesia"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let forecast = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("latitude".into(), "-6.2".into()),
                Matcher::UrlEncoded("longitude".into(), "106.8".into()),
                Matcher::UrlEncoded("current".into(), CURRENT_FIELDS.into()),
                Matcher::UrlEncoded("timezone".into(), "auto".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "current": {
                        "temperature_2m": 30.6,
                        "weathercode": 61,
                        "windspeed_10m": 11.4,
                        "relativehumidity_2m": 78
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let report = client(&server).current_weather(" Jakarta ").await.unwrap();
        assert_eq!(report.city, "Jakarta, Indonesia");
        assert_eq!(report.temperature_c, 31);
        assert_eq!(report.weather_code, 61);
        assert_eq!(report.description, "Drizzle / Rain");
        assert_eq!(report.wind_kmh, 11);
        assert_eq!(report.humidity_pct, 78);

        geo.assert_async().await;
        forecast.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_location_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _geo = server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"generationtime_ms":0.5}"#)
            .create_async()
            .await;

        let err = client(&server)
            .current_weather("Atlantis")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert_eq!(err.user_message(), "Location not found.");
    }

    #[tokio::test]
    async fn empty_location_is_rejected_without_request() {
        let mut server = mockito::Server::new_async().await;
        let geo = server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = client(&server).current_weather("   ").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        geo.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _geo = server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = client(&server).current_weather("Paris").await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
        assert_eq!(err.user_message(), "Network request failed.");
    }

    #[tokio::test]
    async fn malformed_forecast_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _geo = server
            .mock("GET", "/v1/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results":[{"name":"Oslo","latitude":59.9,"longitude":10.7}]}"#)
            .create_async()
            .await;
        let _forecast = server
            .mock("GET", "/v1/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"current":{}}"#)
            .create_async()
            .await;

        assert!(matches!(
            client(&server).current_weather("Oslo").await,
            Err(CoreError::Network(_))
        ));
    }

    #[test]
    fn display_name_without_country() {
        let place = GeocodingResult {
            name: "Oslo".into(),
            latitude: 0.0,
            longitude: 0.0,
            country: None,
        };
        assert_eq!(place.display_name(), "Oslo");
    }
}
