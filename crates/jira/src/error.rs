//! Error types for the Jira client.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to Jira.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Jira returned a non-success status.
    #[error("Jira API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The configured base URL cannot be used.
    #[error("invalid Jira base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The access token cannot be placed in a header.
    #[error("invalid access token")]
    InvalidToken,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error body returned by Jira for failed requests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorCollection {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: std::collections::BTreeMap<String, String>,
}

impl Error {
    /// Build an [`Error::Api`] from a status code and raw response body.
    ///
    /// Jira reports failures as `{"errorMessages": [...], "errors": {...}}`.
    /// When the body has that shape the messages are joined, otherwise the raw
    /// body is kept so nothing is lost.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorCollection>(body)
            .ok()
            .map(|collection| {
                collection
                    .error_messages
                    .into_iter()
                    .chain(
                        collection
                            .errors
                            .into_iter()
                            .map(|(field, msg)| format!("{field}: {msg}")),
                    )
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.trim().to_string());

        Self::Api { status, message }
    }
}
