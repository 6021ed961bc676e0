//! IP-based position source
//!
//! Resolves the caller's approximate position from their public IP address.
//! The endpoint must be HTTPS (loopback hosts excepted), mirroring the secure
//! context rule browsers apply to location access.

use crate::config::LocationConfig;
use crate::geo::device::{PositionError, PositionOptions, PositionSource};
use crate::model::Coordinates;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

/// IP position lookup
#[derive(Debug, Clone)]
pub struct IpPositionSource {
    client: reqwest::Client,
    url: String,
}

/// Position API response; accepts ipapi.co and ip-api.com field names
#[derive(Debug, Deserialize)]
struct IpPositionResponse {
    #[serde(alias = "lat")]
    latitude: Option<f64>,
    #[serde(alias = "lon")]
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl IpPositionSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        Self::new(config.url.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.url).ok()
    }
}

impl PositionSource for IpPositionSource {
    fn is_supported(&self) -> bool {
        self.parsed_url().is_some()
    }

    fn is_secure_context(&self) -> bool {
        let Some(url) = self.parsed_url() else {
            return false;
        };
        if url.scheme() == "https" {
            return true;
        }
        matches!(
            url.host_str(),
            Some("localhost" | "127.0.0.1" | "[::1]" | "::1")
        )
    }

    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        debug!(url = %self.url, high_accuracy = options.enable_high_accuracy, "requesting IP position");

        let response = self
            .client
            .get(&self.url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PositionError::Timeout
                } else {
                    PositionError::PositionUnavailable
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(PositionError::PermissionDenied)
            }
            status if !status.is_success() => return Err(PositionError::PositionUnavailable),
            _ => {}
        }

        let body: IpPositionResponse = response
            .json()
            .await
            .map_err(|_| PositionError::PositionUnavailable)?;

        if body.error {
            debug!(reason = ?body.reason, "IP position lookup refused");
            return Err(PositionError::PositionUnavailable);
        }

        match (body.latitude, body.longitude) {
            (Some(lat), Some(lng)) => {
                let coords = Coordinates::new(lat, lng);
                coords
                    .validate()
                    .map_err(|_| PositionError::PositionUnavailable)?;
                Ok(coords)
            }
            _ => Err(PositionError::PositionUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_secure_context_rules() {
        assert!(IpPositionSource::new("https://ipapi.co/json/").is_secure_context());
        assert!(IpPositionSource::new("http://localhost:8080/json").is_secure_context());
        assert!(IpPositionSource::new("http://127.0.0.1:9/json").is_secure_context());
        assert!(!IpPositionSource::new("http://ip-api.com/json").is_secure_context());
        assert!(!IpPositionSource::new("not a url").is_secure_context());
    }

    #[test]
    fn test_supported_requires_valid_url() {
        assert!(IpPositionSource::new("https://ipapi.co/json/").is_supported());
        assert!(!IpPositionSource::new("").is_supported());
    }

    async fn source_answering(template: ResponseTemplate) -> (IpPositionSource, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(template)
            .mount(&server)
            .await;
        let source = IpPositionSource::new(format!("{}/json/", server.uri()));
        (source, server)
    }

    #[tokio::test]
    async fn test_position_parsed() {
        let (source, _server) = source_answering(
            ResponseTemplate::new(200)
                .set_body_json(json!({"latitude": 42.36, "longitude": -71.06, "city": "Boston"})),
        )
        .await;

        let coords = source
            .current_position(&PositionOptions::default())
            .await
            .unwrap();
        assert_eq!(coords, Coordinates::new(42.36, -71.06));
    }

    #[tokio::test]
    async fn test_ip_api_field_names() {
        let (source, _server) = source_answering(
            ResponseTemplate::new(200).set_body_json(json!({"status": "success", "lat": 1.5, "lon": 2.5})),
        )
        .await;

        let coords = source
            .current_position(&PositionOptions::default())
            .await
            .unwrap();
        assert_eq!(coords, Coordinates::new(1.5, 2.5));
    }

    #[tokio::test]
    async fn test_forbidden_is_permission_denied() {
        let (source, _server) = source_answering(ResponseTemplate::new(403)).await;
        assert_eq!(
            source.current_position(&PositionOptions::default()).await,
            Err(PositionError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn test_refusal_is_unavailable() {
        let (source, _server) = source_answering(
            ResponseTemplate::new(200).set_body_json(json!({"error": true, "reason": "RateLimited"})),
        )
        .await;
        assert_eq!(
            source.current_position(&PositionOptions::default()).await,
            Err(PositionError::PositionUnavailable)
        );
    }
}
