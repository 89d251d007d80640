use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use tokio::sync::broadcast;
use weather_core::{
    Config, JsonPreferenceStore, PreferenceStore, SearchOrchestrator, SearchOutcome,
    WeatherProvider, provider_from_config,
};

use crate::{logging, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather from WeatherAPI.com")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com API key.
    Configure {
        /// Skip the prompt and store this key.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show current weather for a city.
    Show {
        /// City name. Without it, the last searched city is used.
        city: Option<String>,
    },

    /// Print the last searched city.
    Last,

    /// Search repeatedly from a prompt.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        logging::init_tracing(&config, self.verbose);

        match self.command {
            Command::Configure { api_key } => configure(&mut config, api_key),
            Command::Show { city } => show(&config, city).await,
            Command::Last => {
                let store = JsonPreferenceStore::open_default()?;
                match store.get()? {
                    Some(city) => println!("{city}"),
                    None => println!("No city searched yet."),
                }
                Ok(())
            }
            Command::Interactive => interactive(&config).await,
        }
    }
}

fn configure(config: &mut Config, api_key: Option<String>) -> anyhow::Result<()> {
    let api_key = match api_key {
        Some(key) => key,
        None => Password::new("WeatherAPI.com API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

fn orchestrator(config: &Config) -> anyhow::Result<SearchOrchestrator> {
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);
    let store = Arc::new(JsonPreferenceStore::open_default()?);
    Ok(SearchOrchestrator::new(provider, store))
}

async fn show(config: &Config, city: Option<String>) -> anyhow::Result<()> {
    let orch = orchestrator(config)?;
    let mut outcomes = orch.outcomes();

    let outcome = match city {
        Some(city) => with_progress(&mut outcomes, orch.submit(city)).await,
        None => with_progress(&mut outcomes, orch.restore_last_search())
            .await
            .ok_or_else(|| {
                anyhow!("No previous search found.\nHint: run `weather show <city>` first.")
            })?,
    };

    match outcome {
        SearchOutcome::Error(message) => Err(anyhow!(message)),
        _ => {
            println!("{}", render::state(&orch.current_state()));
            Ok(())
        }
    }
}

/// Prompt-driven loop mirroring the app screen: restore, search, retry.
async fn interactive(config: &Config) -> anyhow::Result<()> {
    let orch = orchestrator(config)?;
    let mut outcomes = orch.outcomes();

    if with_progress(&mut outcomes, orch.restore_last_search()).await.is_some() {
        println!("{}", render::state(&orch.current_state()));
    }

    loop {
        let initial = orch.city_input().borrow().clone();
        let Some(input) = Text::new("City (Esc to quit):")
            .with_initial_value(&initial)
            .prompt_skippable()
            .context("Failed to read city")?
        else {
            return Ok(());
        };

        let mut outcome = with_progress(&mut outcomes, orch.submit(input)).await;
        println!("{}", render::state(&orch.current_state()));

        while matches!(outcome, SearchOutcome::Error(_)) {
            let again = Confirm::new("Retry?").with_default(false).prompt().unwrap_or(false);
            if !again {
                orch.clear_error();
                break;
            }
            outcome = with_progress(&mut outcomes, orch.retry()).await;
            println!("{}", render::state(&orch.current_state()));
        }
    }
}

/// Drive one search on the calling task, printing its progress before the
/// result is returned.
async fn with_progress<F: Future>(
    outcomes: &mut broadcast::Receiver<SearchOutcome>,
    search: F,
) -> F::Output {
    drive(outcomes, search, render::progress).await
}

async fn drive<F: Future>(
    outcomes: &mut broadcast::Receiver<SearchOutcome>,
    search: F,
    mut on_progress: impl FnMut(&SearchOutcome),
) -> F::Output {
    tokio::pin!(search);
    loop {
        tokio::select! {
            biased;
            Ok(outcome) = outcomes.recv() => on_progress(&outcome),
            done = &mut search => return done,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[tokio::test]
    async fn progress_is_reported_before_the_search_returns() {
        let (tx, mut rx) = broadcast::channel(8);
        let log = RefCell::new(Vec::new());

        let search = async {
            tx.send(SearchOutcome::Loading).unwrap();
            tokio::task::yield_now().await;
            log.borrow_mut().push("done");
            7
        };
        let out = drive(&mut rx, search, |outcome| {
            let entry = if matches!(outcome, SearchOutcome::Loading) { "loading" } else { "other" };
            log.borrow_mut().push(entry);
        })
        .await;

        assert_eq!(out, 7);
        assert_eq!(*log.borrow(), vec!["loading", "done"]);
    }

    #[tokio::test]
    async fn closed_channel_does_not_stall_the_search() {
        let (tx, mut rx) = broadcast::channel::<SearchOutcome>(1);
        drop(tx);

        let out = drive(&mut rx, async { "finished" }, |_| panic!("no progress expected")).await;
        assert_eq!(out, "finished");
    }
}
