use std::io::{self, Write};
use std::sync::Mutex;

use journal_core::UiMessages;
use journal_engine::UiSink;
use journal_logging::journal_warn;

/// Keys shown on the terminal, in display order.
const SHOWN_KEYS: [&str; 4] = ["TITLE", "LABEL", "MINIMUN", "SUBMIT"];

/// Renders the localized labels to stdout whenever they change.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    last_rendered: Mutex<Option<String>>,
}

impl ConsoleSink {
    pub fn render(ui: &UiMessages) -> String {
        SHOWN_KEYS
            .iter()
            .map(|key| format!("  {key:<8} {}", ui.text(key)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl UiSink for ConsoleSink {
    fn apply(&self, ui: &UiMessages) {
        let rendered = Self::render(ui);
        let mut last = self
            .last_rendered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if last.as_deref() == Some(rendered.as_str()) {
            return;
        }

        let mut out = io::stdout().lock();
        if let Err(err) = writeln!(out, "[ui]\n{rendered}").and_then(|_| out.flush()) {
            journal_warn!("Failed to render UI: {}", err);
        }
        *last = Some(rendered);
    }
}
