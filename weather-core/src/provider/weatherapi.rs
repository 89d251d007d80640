use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::TransportError,
    model::{ApiErrorEnvelope, CurrentWeather, RawResponse},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(base_url: impl Into<String>, api_key: String) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, api_key, http: Client::new() }
    }

    fn current_url(&self) -> String {
        format!("{}/current.json", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    #[tracing::instrument(name = "weatherapi_current", level = "debug", skip(self))]
    async fn current(&self, city: &str) -> Result<RawResponse, TransportError> {
        let res = self
            .http
            .get(self.current_url())
            .query(&[("key", self.api_key.as_str()), ("q", city), ("aqi", "no")])
            .send()
            .await
            .map_err(|err| {
                let err = TransportError::from(err);
                tracing::warn!(
                    kind = ?err.kind,
                    error = %err,
                    "WeatherAPI request failed before a response"
                );
                err
            })?;

        let status = res.status();
        let status_text = status
            .canonical_reason()
            .map(str::to_owned)
            .unwrap_or_else(|| status.as_u16().to_string());

        let body = res.text().await.map_err(TransportError::from)?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "WeatherAPI responded");

        if !status.is_success() {
            let error = serde_json::from_str::<ApiErrorEnvelope>(&body).ok().map(|e| e.error);
            if let Some(detail) = &error {
                tracing::debug!(
                    code = detail.code,
                    message = %detail.message,
                    "WeatherAPI error envelope"
                );
            } else {
                tracing::debug!(body = %truncate_body(&body), "WeatherAPI error without envelope");
            }
            return Ok(RawResponse { status: status.as_u16(), status_text, body: None, error });
        }

        let parsed = decode_success_body(&body)?;

        Ok(RawResponse { status: status.as_u16(), status_text, body: parsed, error: None })
    }
}

/// Empty bodies and a literal JSON `null` mean "no data".
fn decode_success_body(body: &str) -> Result<Option<CurrentWeather>, TransportError> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str::<Option<CurrentWeather>>(body).map_err(|err| {
        TransportError::from_message(format!("Failed to parse WeatherAPI current JSON: {err}"))
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
