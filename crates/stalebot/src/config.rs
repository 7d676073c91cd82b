//! Stalebot policy configuration.
//!
//! The configuration is read once per run from a YAML file, defaulted, and
//! validated. Validation collects every problem before failing so a broken
//! file can be fixed in one pass.

use jira::Url;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

const DEFAULT_STALE_LABEL: &str = "lifecycle-stale";
const DEFAULT_DAYS_UNTIL_STALE: u32 = 90;
const DEFAULT_DAYS_UNTIL_CLOSE: u32 = 14;
const DEFAULT_LIMIT_PER_RUN: u32 = 100;

static PROJECT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,}$").expect("static pattern"));
static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z-]+$").expect("static pattern"));

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for this schema.
    #[error("parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// One or more settings are invalid.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

/// Every validation failure found in a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Whether no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single}"),
            many => write!(f, "multiple errors: {}", many.join("; ")),
        }
    }
}

impl std::error::Error for ValidationErrors {}

/// Policy configuration consumed by the query builder, the rule evaluator
/// and the run loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Jira instance URL
    #[serde(rename = "jiraBaseURL")]
    pub jira_base_url: String,
    /// Project key (e.g., "PROJ")
    pub project: String,

    /// Days without update before an issue is marked stale
    #[serde(deserialize_with = "lenient_count")]
    pub days_until_stale: u32,
    /// Days a stale issue waits before it is closed
    #[serde(deserialize_with = "lenient_count")]
    pub days_until_close: u32,

    /// Issues carrying all of these labels are skipped
    pub only_labels: Vec<String>,
    /// Issues carrying any of these labels are skipped
    pub exempt_labels: Vec<String>,

    /// Label marking an issue stale
    pub stale_label: String,
    /// Comment posted when marking
    pub mark_comment: String,
    /// Comment posted when unmarking
    pub unmark_comment: String,

    /// Status name the close transition must land in
    pub close_status: String,
    /// Comment posted after closing
    pub close_comment: String,

    /// Maximum operations acted on per run
    #[serde(deserialize_with = "lenient_count")]
    pub limit_per_run: u32,
}

impl Config {
    /// Read, default and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML and apply defaults, without validating.
    pub fn from_yaml(data: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document is an empty config, not an error.
        let mut config: Self = if data.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(data)?
        };
        config.set_defaults();
        Ok(config)
    }

    /// Fill unset settings. Comment templates are derived from the other
    /// settings, so they are filled last.
    pub fn set_defaults(&mut self) {
        if self.stale_label.is_empty() {
            self.stale_label = DEFAULT_STALE_LABEL.to_string();
        }
        if self.days_until_stale == 0 {
            self.days_until_stale = DEFAULT_DAYS_UNTIL_STALE;
        }
        if self.days_until_close == 0 {
            self.days_until_close = DEFAULT_DAYS_UNTIL_CLOSE;
        }
        if self.limit_per_run == 0 {
            self.limit_per_run = DEFAULT_LIMIT_PER_RUN;
        }
        if self.mark_comment.is_empty() {
            self.mark_comment = format!(
                "[STALEBOT COMMENT] This issue is stale because it has not had activity for {} days. \
                 Comment, remove label \"{}\", or make any another update to this issue to avoid closure in {} days.",
                self.days_until_stale, self.stale_label, self.days_until_close
            );
        }
        if self.unmark_comment.is_empty() {
            self.unmark_comment = format!(
                "[STALEBOT COMMENT] A recent update was detected, so this issue is no longer stale. \
                 Removing stale label \"{}\".",
                self.stale_label
            );
        }
        if self.close_comment.is_empty() {
            self.close_comment = format!(
                "[STALEBOT COMMENT] Closing this issue because it has been stale for {} days with no activity.",
                self.days_until_close
            );
        }
    }

    /// Check every rule and report all failures together.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.jira_base_url.trim().is_empty() {
            errors.push("config must specify `jiraBaseURL`");
        } else if let Err(e) = check_base_url(&self.jira_base_url) {
            errors.push(format!(
                "config contains invalid jiraBaseURL `{}`: {e}",
                self.jira_base_url
            ));
        }
        if !PROJECT_KEY.is_match(&self.project) {
            errors.push("config must specify valid project key (two or more uppercase letters)");
        }
        if !self.only_labels.is_empty() && !self.exempt_labels.is_empty() {
            errors.push("config must not specify both onlyLabels and exemptLabels");
        }
        for label in self.only_labels.iter().filter(|l| !is_valid_label(l)) {
            errors.push(format!("config contains invalid label `{label}` in onlyLabels"));
        }
        for label in self.exempt_labels.iter().filter(|l| !is_valid_label(l)) {
            errors.push(format!("config contains invalid label `{label}` in exemptLabels"));
        }
        if !is_valid_label(&self.stale_label) {
            errors.push(format!(
                "config must not specify invalid staleLabel `{}`",
                self.stale_label
            ));
        }
        if !is_valid_status_name(&self.close_status) {
            errors.push(format!(
                "config must not specify invalid closeStatus `{}`",
                self.close_status
            ));
        }

        errors.into_result()
    }
}

fn is_valid_label(label: &str) -> bool {
    LABEL.is_match(label)
}

fn is_valid_status_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('"')
}

/// Base URLs must be absolute http(s) URLs with a host.
fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}

/// Counts accept any integer; zero and negatives mean "use the default".
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}
