use weather_core::{Phase, SearchOutcome, UiState, WeatherSnapshot};

pub fn progress(outcome: &SearchOutcome) {
    if matches!(outcome, SearchOutcome::Loading) {
        eprintln!("Fetching current weather...");
    }
}

/// Text for the final state of a search.
pub fn state(state: &UiState) -> String {
    match state.phase() {
        Phase::Idle => "No search yet.".to_string(),
        Phase::Loading => "Loading...".to_string(),
        Phase::Error => state.error_message.clone().unwrap_or_default(),
        Phase::Success => state.snapshot.as_ref().map(snapshot).unwrap_or_default(),
    }
}

fn snapshot(s: &WeatherSnapshot) -> String {
    format!(
        "{location}\n  {temp}  {condition}\n  icon: {icon}",
        location = s.location,
        temp = s.temperature_display(),
        condition = s.description,
        icon = s.icon_url(),
    )
}
