//! Terminal journal: every line typed is appended to the entry, and the
//! localized labels are refreshed as the entry grows.
//!
//! Commands: `:clear` discards the draft, `:quit` (or EOF) exits.

mod config;
mod console;
mod logging;
mod persistence;

use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::Context;
use journal_core::UiMessages;
use journal_engine::{
    ensure_dir, ControllerHandle, ControllerInput, ControllerServices, KeyValueStore,
    ReqwestRefresher, UiSink, DRAFT_KEY,
};
use journal_logging::{journal_info, journal_warn};

use crate::config::AppConfig;
use crate::console::ConsoleSink;
use crate::logging::LogDestination;
use crate::persistence::RonFileStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    logging::initialize(
        config
            .log
            .as_deref()
            .map(LogDestination::parse)
            .unwrap_or_default(),
    );
    journal_info!("journal_app starting (endpoint {})", config.endpoint);
    match &config.loaded_from {
        Some(path) => journal_info!("Loaded configuration from {:?}", path),
        None => journal_info!("No configuration file; using defaults"),
    }

    let trigger = config.trigger_config()?;
    ensure_dir(&config.data_dir)
        .with_context(|| format!("preparing data directory {:?}", config.data_dir))?;
    let store = Arc::new(RonFileStore::open(&config.data_dir)?);
    journal_info!("Drafts are kept in {:?}", store.path());
    let refresher = Arc::new(ReqwestRefresher::new(config.refresh_settings())?);
    let sink = Arc::new(ConsoleSink::default());

    sink.apply(&UiMessages::defaults());
    let draft = match store.get(DRAFT_KEY) {
        Ok(draft) => draft.unwrap_or_default(),
        Err(err) => {
            journal_warn!("Could not read saved draft: {}", err);
            String::new()
        }
    };

    let handle = ControllerHandle::spawn(
        trigger,
        ControllerServices {
            refresher,
            sink,
            store,
        },
    );
    let input = handle.input();
    if !draft.is_empty() {
        println!("[draft restored]\n{draft}");
        input.restore_draft(draft.clone());
    }

    // Stdin is blocking; feed the controller from a plain thread.
    std::thread::spawn(move || read_lines(input, draft));

    handle.join().await;
    journal_info!("journal_app stopped");
    Ok(())
}

fn read_lines(input: ControllerInput, mut text: String) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                journal_warn!("Failed to read input: {}", err);
                break;
            }
        };
        match line.trim() {
            ":quit" => break,
            ":clear" => {
                text.clear();
                input.clear_draft();
            }
            _ => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&line);
                if !input.text_changed(text.clone()) {
                    return;
                }
            }
        }
    }
    input.teardown();
}
