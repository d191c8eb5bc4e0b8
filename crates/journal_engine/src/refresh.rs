use std::collections::BTreeMap;
use std::time::Duration;

use journal_core::UiMessages;
use journal_logging::journal_debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::{FailureKind, RefreshError};

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    /// Translation endpoint, e.g. `http://localhost:3000/api/translate_web`.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/translate_web".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 256 * 1024,
        }
    }
}

/// Produces localized UI text for a sample of the user's writing.
#[async_trait::async_trait]
pub trait Refresher: Send + Sync {
    async fn refresh(&self, text: &str) -> Result<UiMessages, RefreshError>;
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    ui: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestRefresher {
    settings: RefreshSettings,
    endpoint: reqwest::Url,
    client: reqwest::Client,
}

impl ReqwestRefresher {
    pub fn new(settings: RefreshSettings) -> Result<Self, RefreshError> {
        let endpoint = reqwest::Url::parse(&settings.endpoint)
            .map_err(|err| RefreshError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RefreshError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            endpoint,
            client,
        })
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl Refresher for ReqwestRefresher {
    async fn refresh(&self, text: &str) -> Result<UiMessages, RefreshError> {
        let body = serde_json::to_vec(&RefreshRequest { text })
            .map_err(|err| RefreshError::new(FailureKind::MalformedResponse, err.to_string()))?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_response_bytes as u64 {
                return Err(RefreshError::new(
                    FailureKind::MalformedResponse,
                    format!("response too large ({content_len} bytes)"),
                ));
            }
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if bytes.len() > self.settings.max_response_bytes {
            return Err(RefreshError::new(
                FailureKind::MalformedResponse,
                format!("response too large ({} bytes)", bytes.len()),
            ));
        }
        parse_ui(&bytes)
    }
}

/// Extracts the `ui` mapping from a translation response body. Non-string
/// values are dropped; an empty result counts as malformed.
pub(crate) fn parse_ui(body: &[u8]) -> Result<UiMessages, RefreshError> {
    let response: RefreshResponse = serde_json::from_slice(body)
        .map_err(|err| RefreshError::new(FailureKind::MalformedResponse, err.to_string()))?;

    if let Some(error) = response.error.as_deref() {
        journal_debug!("Translation endpoint reported: {}", error);
    }

    let Some(serde_json::Value::Object(map)) = response.ui else {
        return Err(RefreshError::new(
            FailureKind::MalformedResponse,
            "missing `ui` object",
        ));
    };

    let entries: BTreeMap<String, String> = map
        .into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(text) => Some((key, text)),
            _ => None,
        })
        .collect();
    if entries.is_empty() {
        return Err(RefreshError::new(
            FailureKind::MalformedResponse,
            "`ui` object has no text entries",
        ));
    }
    Ok(UiMessages::from(entries))
}

fn map_reqwest_error(err: reqwest::Error) -> RefreshError {
    if err.is_timeout() {
        return RefreshError::new(FailureKind::Timeout, err.to_string());
    }
    RefreshError::new(FailureKind::Network, err.to_string())
}
