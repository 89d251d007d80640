//! Maps a raw provider result onto a snapshot or a [`SearchError`].

use crate::{
    error::{SearchError, TransportError, TransportErrorKind},
    model::{CurrentWeather, RawResponse, SearchOutcome, WeatherSnapshot},
};

/// Classify one provider call. Deterministic: same input, same answer.
pub fn classify(raw: &Result<RawResponse, TransportError>) -> Result<WeatherSnapshot, SearchError> {
    match raw {
        Err(err) => Err(classify_transport(err)),
        Ok(response) => classify_response(response),
    }
}

fn classify_transport(err: &TransportError) -> SearchError {
    match err.kind {
        TransportErrorKind::UnresolvedHost => SearchError::NoConnection,
        TransportErrorKind::Timeout => SearchError::Timeout,
        TransportErrorKind::Other => SearchError::Transport { message: err.message.clone() },
    }
}

fn classify_response(response: &RawResponse) -> Result<WeatherSnapshot, SearchError> {
    if !response.is_success() {
        return Err(match response.status {
            400 => SearchError::CityNotFound,
            401 => SearchError::InvalidApiKey,
            403 => SearchError::QuotaExceeded,
            _ => SearchError::Server { status_text: response.status_text.clone() },
        });
    }

    response.body.as_ref().map(snapshot_from).ok_or(SearchError::EmptyResponse)
}

fn snapshot_from(body: &CurrentWeather) -> WeatherSnapshot {
    WeatherSnapshot {
        location: format!("{}, {}", body.location.name, body.location.country),
        // `as` truncates toward zero and saturates on overflow/NaN.
        temperature_c: body.current.temp_c as i32,
        condition: body.current.condition.text.clone(),
        description: body.current.condition.text.clone(),
        icon: body.current.condition.icon.clone(),
    }
}

impl From<Result<WeatherSnapshot, SearchError>> for SearchOutcome {
    fn from(result: Result<WeatherSnapshot, SearchError>) -> Self {
        match result {
            Ok(snapshot) => SearchOutcome::Success(snapshot),
            Err(err) => SearchOutcome::Error(err.to_string()),
        }
    }
}
