//! Jira entity type definitions.
//!
//! Only the fields the stalebot reads are modelled. Every field tolerates
//! absence so that a sparse search response still yields a usable snapshot.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Jira issue snapshot as returned by search with `expand=changelog`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    /// Numeric issue id (as a string)
    #[serde(default)]
    pub id: String,
    /// Human-readable key (e.g., "PROJ-123")
    #[serde(default)]
    pub key: String,
    /// Issue fields
    #[serde(default)]
    pub fields: IssueFields,
    /// Change history, present when expanded
    #[serde(default)]
    pub changelog: Option<Changelog>,
}

impl Issue {
    /// Labels currently on the issue, as a set.
    #[must_use]
    pub fn label_set(&self) -> HashSet<&str> {
        self.fields.labels.iter().map(String::as_str).collect()
    }

    /// Status category of the current status, `Unknown` when absent.
    #[must_use]
    pub fn status_category(&self) -> StatusCategory {
        self.fields
            .status
            .as_ref()
            .map_or(StatusCategory::Unknown, |s| s.status_category.key)
    }

    /// Issue type name, empty when absent.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.fields
            .issuetype
            .as_ref()
            .map_or("", |t| t.name.as_str())
    }

    /// The most recent changelog history entry, if any.
    #[must_use]
    pub fn last_history(&self) -> Option<&ChangelogHistory> {
        self.changelog.as_ref().and_then(|c| c.histories.last())
    }
}

/// Subset of issue fields requested by the bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    /// Issue summary (title)
    #[serde(default)]
    pub summary: String,
    /// Issue type (Bug, Story, ...)
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    /// Labels on the issue
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    /// Current workflow status
    #[serde(default)]
    pub status: Option<Status>,
    /// Last update timestamp
    #[serde(default, deserialize_with = "jira_time::deserialize_opt")]
    pub updated: Option<DateTime<Utc>>,
}

/// Jira issue type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueType {
    /// Type name
    #[serde(default)]
    pub name: String,
}

/// Jira workflow status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Status id
    #[serde(default)]
    pub id: String,
    /// Status name (e.g., "In Progress")
    #[serde(default)]
    pub name: String,
    /// Coarse bucket the status belongs to
    #[serde(default)]
    pub status_category: StatusCategoryRef,
}

/// Status category as embedded in a status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCategoryRef {
    /// Category key
    #[serde(default)]
    pub key: StatusCategory,
}

/// Coarse workflow bucket, independent of the named status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    /// Jira key `new`
    #[serde(rename = "new")]
    ToDo,
    /// Jira key `indeterminate`
    #[serde(rename = "indeterminate")]
    InProgress,
    /// Jira key `done`
    #[serde(rename = "done")]
    Done,
    /// Anything else, including a missing category
    #[default]
    #[serde(other, rename = "undefined")]
    Unknown,
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToDo => write!(f, "to-do"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Done => write!(f, "done"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Issue change history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Changelog {
    /// History entries, oldest first
    #[serde(default)]
    pub histories: Vec<ChangelogHistory>,
}

/// A single change event, possibly touching several fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangelogHistory {
    /// History id
    #[serde(default)]
    pub id: String,
    /// When the change happened
    #[serde(default, deserialize_with = "jira_time::deserialize_opt")]
    pub created: Option<DateTime<Utc>>,
    /// Field-level changes
    #[serde(default)]
    pub items: Vec<ChangelogItem>,
}

/// A field-level change inside a history entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangelogItem {
    /// Field name (e.g., "labels")
    #[serde(default)]
    pub field: String,
    /// Previous value rendered as text
    #[serde(rename = "fromString", default, deserialize_with = "null_as_default")]
    pub from_text: String,
    /// New value rendered as text
    #[serde(rename = "toString", default, deserialize_with = "null_as_default")]
    pub to_text: String,
}

/// One page of search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Offset of the first issue in this page
    #[serde(default)]
    pub start_at: usize,
    /// Page size the server applied
    #[serde(default)]
    pub max_results: usize,
    /// Total number of matching issues
    #[serde(default)]
    pub total: usize,
    /// Issues in this page
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// An available workflow transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transition {
    /// Transition id used to execute it
    #[serde(default)]
    pub id: String,
    /// Transition name (e.g., "Close Issue")
    #[serde(default)]
    pub name: String,
    /// Status the issue lands in
    #[serde(default)]
    pub to: Status,
}

/// Label delta applied through an issue update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelUpdate {
    /// Add a label
    Add(String),
    /// Remove a label
    Remove(String),
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Jira timestamp handling.
///
/// Jira renders offsets without a colon (`2024-01-31T10:00:00.000+0000`),
/// which is not RFC 3339.
pub mod jira_time {
    use super::{DateTime, FixedOffset, Utc};
    use serde::{Deserialize, Deserializer};

    const JIRA_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

    /// Parse a Jira or RFC 3339 timestamp.
    #[must_use]
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::<FixedOffset>::parse_from_str(raw, JIRA_FORMAT))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid Jira timestamp `{s}`"))),
        }
    }
}
