use serde::{Deserialize, Serialize};

/// A resolved reading of current conditions for one city.
///
/// Only built by [`crate::classify`] from a successful provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// `"{name}, {country}"` as reported by the provider.
    pub location: String,
    /// Whole degrees Celsius, truncated toward zero.
    pub temperature_c: i32,
    pub condition: String,
    pub description: String,
    /// Provider icon reference, usually protocol-relative (`//cdn...`).
    pub icon: String,
}

impl WeatherSnapshot {
    /// Absolute icon URL; protocol-relative references get an `https:` scheme.
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        }
    }

    pub fn temperature_display(&self) -> String {
        format!("{}°C", self.temperature_c)
    }
}

/// One step of a search as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Loading,
    Success(WeatherSnapshot),
    Error(String),
}

impl SearchOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchOutcome::Loading)
    }
}

/// Coarse state derived from [`UiState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

/// Presentation state published by the orchestrator.
///
/// `snapshot` and `error_message` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub is_loading: bool,
    pub snapshot: Option<WeatherSnapshot>,
    pub error_message: Option<String>,
}

impl UiState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.error_message.is_some() {
            Phase::Error
        } else if self.snapshot.is_some() {
            Phase::Success
        } else {
            Phase::Idle
        }
    }

    /// Fold one outcome into the state.
    pub(crate) fn apply(&mut self, outcome: &SearchOutcome) {
        match outcome {
            SearchOutcome::Loading => {
                self.is_loading = true;
                self.error_message = None;
            }
            SearchOutcome::Success(snapshot) => {
                self.is_loading = false;
                self.snapshot = Some(snapshot.clone());
                self.error_message = None;
            }
            SearchOutcome::Error(message) => {
                self.is_loading = false;
                self.snapshot = None;
                self.error_message = Some(message.clone());
            }
        }
    }
}

/// Raw result of one `current.json` call, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, e.g. `"Internal Server Error"`.
    pub status_text: String,
    /// Decoded success payload; only populated for 2xx responses.
    pub body: Option<CurrentWeather>,
    /// Provider error envelope, when a non-2xx response carried one.
    pub error: Option<ApiErrorBody>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// Wire format of WeatherAPI.com `current.json`.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub condition: Condition,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
}

/// `{"error": {"code": .., "message": ..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            location: "London, United Kingdom".into(),
            temperature_c: 20,
            condition: "Partly cloudy".into(),
            description: "Partly cloudy".into(),
            icon: "//cdn.weatherapi.com/weather/64x64/day/116.png".into(),
        }
    }

    #[test]
    fn icon_url_adds_scheme_to_protocol_relative_icon() {
        assert_eq!(
            snapshot().icon_url(),
            "https://cdn.weatherapi.com/weather/64x64/day/116.png"
        );

        let absolute = WeatherSnapshot { icon: "https://x/y.png".into(), ..snapshot() };
        assert_eq!(absolute.icon_url(), "https://x/y.png");
    }

    #[test]
    fn temperature_display_has_unit() {
        assert_eq!(snapshot().temperature_display(), "20°C");
    }

    #[test]
    fn error_clears_snapshot_and_success_clears_error() {
        let mut state = UiState::default();
        assert_eq!(state.phase(), Phase::Idle);

        state.apply(&SearchOutcome::Success(snapshot()));
        assert_eq!(state.phase(), Phase::Success);

        state.apply(&SearchOutcome::Error("boom".into()));
        assert_eq!(state.phase(), Phase::Error);
        assert!(state.snapshot.is_none());

        state.apply(&SearchOutcome::Loading);
        assert_eq!(state.phase(), Phase::Loading);
        assert!(state.error_message.is_none());

        state.apply(&SearchOutcome::Success(snapshot()));
        assert!(state.error_message.is_none());
        assert!(!state.is_loading);
    }

    #[test]
    fn decodes_current_json_payload() {
        let json = r#"{
            "location": {"name": "Paris", "country": "France", "region": "Ile-de-France"},
            "current": {"temp_c": 15.3, "humidity": 60,
                        "condition": {"text": "Clear", "icon": "//cdn/113.png", "code": 1000}}
        }"#;
        let parsed: CurrentWeather = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.location.name, "Paris");
        assert_eq!(parsed.current.condition.text, "Clear");
        assert_eq!(parsed.current.humidity, 60);
    }
}
