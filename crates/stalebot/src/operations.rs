//! Staleness rules.
//!
//! [`Config::issue_operation`] decides the single lifecycle step to apply to
//! an issue right now. It holds no state: whether an issue was marked and
//! whether anything happened since is re-derived from the live labels, the
//! last update time and the last changelog entry on every run.

use chrono::{DateTime, Duration, Utc};
use jira::{Issue, StatusCategory};
use std::collections::HashSet;
use std::fmt;

use crate::config::Config;

/// Changelog field name carrying label changes.
const LABELS_FIELD: &str = "labels";

/// Lifecycle step chosen for an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// Leave the issue alone.
    None,
    /// Mark the issue stale.
    AddStaleLabel,
    /// Activity happened after marking; unmark it.
    RemoveStaleLabel,
    /// Stale for the full grace period; close it.
    Close,
}

impl Operation {
    /// Every operation, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::AddStaleLabel,
        Self::RemoveStaleLabel,
        Self::Close,
    ];

    /// Name used in logs and prompts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::AddStaleLabel => "AddStaleLabel",
            Self::RemoveStaleLabel => "RemoveStaleLabel",
            Self::Close => "Close",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Config {
    /// Decide which operation applies to `issue` at time `now`.
    ///
    /// Rules, first match wins:
    /// 1. Issues in the done category are never touched.
    /// 2. With `exemptLabels`, any exempt label skips the issue. Otherwise,
    ///    carrying *all* `onlyLabels` skips the issue.
    /// 3. Without the stale label: mark once `daysUntilStale` have passed
    ///    since the last update.
    /// 4. With the stale label, if the last change added it: close once
    ///    `daysUntilClose` have passed since the last update.
    /// 5. With the stale label and any later change: unmark, however long ago.
    ///
    /// Thresholds are inclusive: an update exactly N days old has reached N.
    #[must_use]
    pub fn issue_operation(&self, now: DateTime<Utc>, issue: &Issue) -> Operation {
        if issue.status_category() == StatusCategory::Done {
            return Operation::None;
        }

        let labels = issue.label_set();
        if !self.exempt_labels.is_empty() {
            if self.exempt_labels.iter().any(|l| labels.contains(l.as_str())) {
                return Operation::None;
            }
        } else if !self.only_labels.is_empty()
            && self.only_labels.iter().all(|l| labels.contains(l.as_str()))
        {
            // Skips issues that carry every onlyLabel, which reads inverted
            // next to the name. Kept as-is until the intended polarity is
            // confirmed.
            return Operation::None;
        }

        if !labels.contains(self.stale_label.as_str()) {
            if updated_within(now, issue, self.days_until_stale) {
                return Operation::None;
            }
            return Operation::AddStaleLabel;
        }

        if last_update_added_label(issue, &self.stale_label) {
            if updated_within(now, issue, self.days_until_close) {
                return Operation::None;
            }
            return Operation::Close;
        }

        Operation::RemoveStaleLabel
    }
}

/// Whether the issue was updated less than `days` before `now`.
///
/// A missing timestamp counts as updated long ago.
fn updated_within(now: DateTime<Utc>, issue: &Issue, days: u32) -> bool {
    let Some(updated) = issue.fields.updated else {
        return false;
    };
    match now.checked_sub_signed(Duration::days(i64::from(days))) {
        Some(threshold) => updated > threshold,
        None => true,
    }
}

/// Whether the most recent changelog entry added `label`.
///
/// Only the final history entry is inspected; earlier entries never count.
fn last_update_added_label(issue: &Issue, label: &str) -> bool {
    let Some(last) = issue.last_history() else {
        return false;
    };
    last.items
        .iter()
        .filter(|item| item.field == LABELS_FIELD)
        .any(|item| {
            let from: HashSet<&str> = item.from_text.split_whitespace().collect();
            let to: HashSet<&str> = item.to_text.split_whitespace().collect();
            !from.contains(label) && to.contains(label)
        })
}
