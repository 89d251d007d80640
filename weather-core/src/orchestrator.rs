//! Coordinates one search: validate, fetch, classify, persist, publish.
//!
//! Subscribers observe three channels:
//! - [`SearchOrchestrator::state`]: the latest [`UiState`]
//! - [`SearchOrchestrator::city_input`]: the current text of the input field
//! - [`SearchOrchestrator::outcomes`]: every [`SearchOutcome`] in order
//!
//! Searches are not serialized. If a second `submit` starts before the first
//! settles, both run to completion and whichever finishes last owns the
//! published `UiState`. There is no cancellation of a stale in-flight search.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};

use crate::{
    classify::classify,
    error::SearchError,
    model::{SearchOutcome, UiState, WeatherSnapshot},
    provider::WeatherProvider,
    store::PreferenceStore,
};

const OUTCOME_BUFFER: usize = 64;

#[derive(Debug)]
pub struct SearchOrchestrator {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn PreferenceStore>,
    state: watch::Sender<UiState>,
    input: watch::Sender<String>,
    outcomes: broadcast::Sender<SearchOutcome>,
    last_submitted: Mutex<Option<String>>,
}

impl SearchOrchestrator {
    /// Wire up an orchestrator without touching the store or the network.
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<dyn PreferenceStore>) -> Self {
        let (state, _) = watch::channel(UiState::default());
        let (input, _) = watch::channel(String::new());
        let (outcomes, _) = broadcast::channel(OUTCOME_BUFFER);

        Self { provider, store, state, input, outcomes, last_submitted: Mutex::new(None) }
    }

    /// Construct and immediately restore the last searched city, if any.
    pub async fn start(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn PreferenceStore>,
    ) -> Self {
        let orchestrator = Self::new(provider, store);
        orchestrator.restore_last_search().await;
        orchestrator
    }

    pub fn state(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn city_input(&self) -> watch::Receiver<String> {
        self.input.subscribe()
    }

    pub fn outcomes(&self) -> broadcast::Receiver<SearchOutcome> {
        self.outcomes.subscribe()
    }

    pub fn update_input(&self, text: impl Into<String>) {
        self.input.send_replace(text.into());
    }

    /// Read the stored city once; if present, fill the input and search.
    ///
    /// Returns the terminal outcome of that search, or `None` when nothing
    /// was stored.
    pub async fn restore_last_search(&self) -> Option<SearchOutcome> {
        let store = Arc::clone(&self.store);
        let stored = match tokio::task::spawn_blocking(move || store.get()).await {
            Ok(Ok(city)) => city,
            Ok(Err(err)) => {
                tracing::warn!(error = %format!("{err:#}"), "could not read last searched city");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "last city lookup task failed");
                None
            }
        };

        let city = stored.filter(|c| !c.trim().is_empty())?;
        tracing::info!(city = %city, "restoring last searched city");
        Some(self.submit(city).await)
    }

    /// Search with the current contents of the input field.
    pub async fn search(&self) -> SearchOutcome {
        let input = self.input.borrow().clone();
        self.submit(input).await
    }

    /// Set the input field to `input` and search for it.
    ///
    /// Blank input fails validation without emitting `Loading` or calling the
    /// provider. On success the trimmed city is stored before `Success` is
    /// published. Returns the terminal outcome.
    #[tracing::instrument(name = "search", level = "debug", skip(self, input))]
    pub async fn submit(&self, input: impl Into<String>) -> SearchOutcome {
        let input = input.into();
        self.input.send_replace(input.clone());
        self.remember_submitted(&input);

        let city = input.trim();
        if city.is_empty() {
            return self.publish(SearchOutcome::Error(SearchError::Validation.to_string()));
        }

        self.publish(SearchOutcome::Loading);

        let raw = self.provider.current(city).await;
        let result = match classify(&raw) {
            Ok(snapshot) => self.persist(city, snapshot).await,
            Err(err) => {
                tracing::warn!(city, category = ?err.category(), error = %err, "search failed");
                Err(err)
            }
        };

        self.publish(SearchOutcome::from(result))
    }

    /// Re-run the most recently submitted input.
    pub async fn retry(&self) -> SearchOutcome {
        let last = self.last_submitted.lock().ok().and_then(|guard| guard.clone());
        match last {
            Some(input) => self.submit(input).await,
            None => self.search().await,
        }
    }

    /// Error -> Idle. Any other state is left untouched.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error_message.take().is_some());
    }

    async fn persist(
        &self,
        city: &str,
        snapshot: WeatherSnapshot,
    ) -> Result<WeatherSnapshot, SearchError> {
        let store = Arc::clone(&self.store);
        let owned = city.to_owned();

        let stored = tokio::task::spawn_blocking(move || store.put(&owned))
            .await
            .map_err(|err| SearchError::Persistence { message: err.to_string() })
            .and_then(|res| {
                res.map_err(|err| SearchError::Persistence { message: format!("{err:#}") })
            });

        match stored {
            Ok(()) => {
                tracing::info!(city, location = %snapshot.location, "search succeeded");
                Ok(snapshot)
            }
            Err(err) => {
                tracing::warn!(city, error = %err, "could not store last searched city");
                Err(err)
            }
        }
    }

    fn remember_submitted(&self, input: &str) {
        if let Ok(mut last) = self.last_submitted.lock() {
            *last = Some(input.to_owned());
        }
    }

    fn publish(&self, outcome: SearchOutcome) -> SearchOutcome {
        self.state.send_modify(|state| state.apply(&outcome));
        // No subscribers is fine.
        let _ = self.outcomes.send(outcome.clone());
        outcome
    }
}
