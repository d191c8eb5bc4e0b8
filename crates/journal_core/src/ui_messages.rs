use std::collections::BTreeMap;

/// Built-in English UI text, shown until a localized mapping arrives.
pub const DEFAULT_UI_MESSAGES: &[(&str, &str)] = &[
    ("TITLE", "Journalearn"),
    (
        "TOOLTIP",
        "A simple journaling tool to practice any language: write about your day, a topic you like, or anything on your mind.",
    ),
    ("LABEL", "Howdy! How is it going? Write your message below."),
    ("PLACEHOLDER", "Type your journal entry here..."),
    ("MINIMUN", "Minimum 400 characters"),
    ("GOOD", "All good! ✅"),
    ("SUBMIT", "Submit"),
    ("SHORTCUT", "Press Ctrl + Enter"),
    ("OR", "Or"),
    ("DAY_NO_JOURNAL", "No journal entry for this day"),
    ("DAY_PAST_RESULT_TITLE", "Entry from"),
];

/// Key to display-text mapping for the UI. Replaced wholesale on every
/// successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiMessages {
    entries: BTreeMap<String, String>,
}

impl Default for UiMessages {
    fn default() -> Self {
        Self::defaults()
    }
}

impl UiMessages {
    pub fn defaults() -> Self {
        Self::from_pairs(DEFAULT_UI_MESSAGES.iter().copied())
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Text for `key`, falling back to the built-in default and finally to the
    /// key itself.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key)
            .or_else(|| default_text(key))
            .unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl From<BTreeMap<String, String>> for UiMessages {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

fn default_text(key: &str) -> Option<&'static str> {
    DEFAULT_UI_MESSAGES
        .iter()
        .find(|(default_key, _)| *default_key == key)
        .map(|(_, text)| *text)
}
