//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The WeatherAPI.com client behind the [`WeatherProvider`] trait
//! - Classification of raw responses into user-facing outcomes
//! - Persistence of the last searched city
//! - The [`SearchOrchestrator`] that ties these together and publishes UI state
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod store;

pub use classify::classify;
pub use config::Config;
pub use error::{ErrorCategory, SearchError, TransportError, TransportErrorKind};
pub use model::{Phase, RawResponse, SearchOutcome, UiState, WeatherSnapshot};
pub use orchestrator::SearchOrchestrator;
pub use provider::{WeatherProvider, provider_from_config, weatherapi::WeatherApiProvider};
pub use store::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore};
