//! 공용 HTTP 도우미.
//!
//! 모든 전송/상태 코드 실패는 `CoreError::Network`로 매핑한다.

use perch_core::error::CoreError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// 타임아웃이 설정된 클라이언트 생성
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, CoreError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))
}

/// 기본 URL + 경로 + 쿼리 파라미터로 요청 URL 생성
pub fn endpoint(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, CoreError> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), path);
    if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params)
    }
    .map_err(|e| CoreError::Config(format!("잘못된 URL {raw}: {e}")))
}

/// 응답 상태 코드 확인
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_else(|e| {
        warn!("응답 본문 읽기 실패: {e}");
        String::new()
    });
    Err(CoreError::Network(format!("HTTP {status}: {text}")))
}

/// GET 후 JSON 역직렬화
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
) -> Result<T, CoreError> {
    debug!("GET {}", url.path());
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| CoreError::Network(format!("요청 실패: {e}")))?;

    check_response(resp)
        .await?
        .json::<T>()
        .await
        .map_err(|e| CoreError::Network(format!("응답 파싱 실패: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_params() {
        let url = endpoint(
            "https://geocoding-api.open-meteo.com/",
            "/v1/search",
            &[("name", "New York"), ("count", "1")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://geocoding-api.open-meteo.com/v1/search?name=New+York&count=1"
        );
    }

    #[test]
    fn endpoint_without_params() {
        let url = endpoint("https://open.er-api.com", "/v6/latest/USD", &[]).unwrap();
        assert_eq!(url.as_str(), "https://open.er-api.com/v6/latest/USD");
    }

    #[test]
    fn bad_base_url_is_config_error() {
        assert!(matches!(
            endpoint("not a url", "/x", &[]),
            Err(CoreError::Config(_))
        ));
    }
}
