//! Run loop: scan eligible issues and apply one operation to each.

use chrono::{DateTime, Utc};
use jira::{Issue, LabelUpdate};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{Config, ValidationErrors};
use crate::operations::Operation;
use crate::prompt::{confirmation_message, Confirmer, PromptError};
use crate::tracker::IssueTracker;

/// Issues requested per search page (Jira caps this at 1000).
pub const PAGE_SIZE: usize = 1000;

/// A failed step while applying an operation to one issue.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Posting the mark, unmark or close comment failed.
    #[error("add {kind} comment to issue")]
    Comment {
        kind: &'static str,
        #[source]
        source: jira::Error,
    },

    /// Adding the stale label failed.
    #[error("add stale label \"{label}\" to issue")]
    AddLabel {
        label: String,
        #[source]
        source: jira::Error,
    },

    /// Removing the stale label failed.
    #[error("remove stale label \"{label}\" from issue")]
    RemoveLabel {
        label: String,
        #[source]
        source: jira::Error,
    },

    /// Listing transitions failed.
    #[error("get transitions for issue")]
    Transitions(#[source] jira::Error),

    /// No available transition lands in the close status.
    #[error("no transition found to status \"{0}\"")]
    TransitionNotFound(String),

    /// Executing the close transition failed.
    #[error("transition to status \"{status}\"")]
    Transition {
        status: String,
        #[source]
        source: jira::Error,
    },
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum StalebotError {
    /// The configuration does not validate.
    #[error("invalid stalebot config")]
    InvalidConfig(#[from] ValidationErrors),

    /// Searching for eligible issues failed.
    #[error("search for eligible issues")]
    Search(#[source] jira::Error),

    /// The confirmation prompt failed or was cancelled.
    #[error("confirm operation")]
    Confirm(#[from] PromptError),

    /// Applying an operation failed; the run stops at this issue.
    #[error("operation \"{op}\" failed on issue \"{key}\"")]
    Operation {
        op: Operation,
        key: String,
        #[source]
        source: OperationError,
    },

    /// Cancellation was requested.
    #[error("run cancelled")]
    Cancelled,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Issues evaluated
    pub processed: usize,
    /// Evaluated issues per chosen operation
    pub counts: BTreeMap<Operation, usize>,
    /// Operations carried out (or logged, in dry-run mode)
    pub acted: usize,
    /// Whether the run stopped early at `limitPerRun`
    pub limit_reached: bool,
}

impl RunSummary {
    /// Number of evaluated issues that resolved to `op`.
    #[must_use]
    pub fn count(&self, op: Operation) -> usize {
        self.counts.get(&op).copied().unwrap_or_default()
    }

    fn record(&mut self, op: Operation) {
        self.processed += 1;
        *self.counts.entry(op).or_default() += 1;
    }
}

/// The stale bot.
pub struct Stalebot<T> {
    tracker: T,
    config: Config,
    dry_run: bool,
    confirmer: Option<Box<dyn Confirmer>>,
}

impl<T: IssueTracker> Stalebot<T> {
    /// Create a bot that mutates issues without asking.
    pub fn new(tracker: T, config: Config) -> Self {
        Self {
            tracker,
            config,
            dry_run: false,
            confirmer: None,
        }
    }

    /// Log operations instead of applying them.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Ask before each operation.
    #[must_use]
    pub fn with_confirmer(mut self, confirmer: impl Confirmer + 'static) -> Self {
        self.confirmer = Some(Box::new(confirmer));
        self
    }

    /// Run once against the current time.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RunSummary, StalebotError> {
        self.run_at(Utc::now(), cancel).await
    }

    /// Run once, evaluating every issue against `now`.
    ///
    /// The first failed operation aborts the run. Nothing is checkpointed:
    /// re-running re-derives every decision from live issue data.
    pub async fn run_at(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, StalebotError> {
        self.config.validate()?;

        let jql = self.config.eligible_issues_query();
        let limit = usize::try_from(self.config.limit_per_run).unwrap_or(usize::MAX);
        let mut summary = RunSummary::default();
        let mut start_at = 0;

        info!(jql = %jql, "querying jira");
        'pages: loop {
            if cancel.is_cancelled() {
                return Err(StalebotError::Cancelled);
            }

            let page = self
                .tracker
                .search(&jql, start_at, PAGE_SIZE)
                .await
                .map_err(StalebotError::Search)?;

            for issue in &page.issues {
                if cancel.is_cancelled() {
                    return Err(StalebotError::Cancelled);
                }

                let op = self.config.issue_operation(now, issue);
                summary.record(op);
                if op == Operation::None {
                    continue;
                }

                if !self.handle(op, issue, cancel).await? {
                    continue;
                }

                summary.acted += 1;
                if summary.acted >= limit {
                    info!(limit, "operation limit reached, stopping");
                    summary.limit_reached = true;
                    break 'pages;
                }
            }

            let returned = page.issues.len();
            start_at = page.start_at + returned;
            if returned == 0 || start_at >= page.total {
                break;
            }
        }

        info!(count = summary.processed, "found eligible issues");
        info!(
            AddStaleLabel = summary.count(Operation::AddStaleLabel),
            RemoveStaleLabel = summary.count(Operation::RemoveStaleLabel),
            Close = summary.count(Operation::Close),
            "operations"
        );
        Ok(summary)
    }

    /// Confirm and apply one operation. Returns whether it was acted on.
    async fn handle(
        &self,
        op: Operation,
        issue: &Issue,
        cancel: &CancellationToken,
    ) -> Result<bool, StalebotError> {
        if let Some(confirmer) = &self.confirmer {
            let message = confirmation_message(op, issue);
            if !confirmer.confirm(&message, cancel).await? {
                debug!(key = %issue.key, op = %op, "operation declined");
                return Ok(false);
            }
        }

        if self.dry_run {
            info!(key = %issue.key, op = %op, "dry-run operation");
            return Ok(true);
        }

        info!(key = %issue.key, op = %op, "performing operation");
        self.apply(op, issue)
            .await
            .map_err(|source| StalebotError::Operation {
                op,
                key: issue.key.clone(),
                source,
            })?;
        info!(key = %issue.key, op = %op, "operation succeeded");
        Ok(true)
    }

    async fn apply(&self, op: Operation, issue: &Issue) -> Result<(), OperationError> {
        match op {
            Operation::None => Ok(()),
            Operation::AddStaleLabel => self.add_stale_label(issue).await,
            Operation::RemoveStaleLabel => self.remove_stale_label(issue).await,
            Operation::Close => self.close_issue(issue).await,
        }
    }

    async fn add_stale_label(&self, issue: &Issue) -> Result<(), OperationError> {
        self.tracker
            .add_comment(&issue.id, &self.config.mark_comment)
            .await
            .map_err(|source| OperationError::Comment {
                kind: "mark",
                source,
            })?;

        let label = self.config.stale_label.clone();
        self.tracker
            .update_labels(&issue.id, LabelUpdate::Add(label.clone()))
            .await
            .map_err(|source| OperationError::AddLabel { label, source })
    }

    async fn remove_stale_label(&self, issue: &Issue) -> Result<(), OperationError> {
        self.tracker
            .add_comment(&issue.id, &self.config.unmark_comment)
            .await
            .map_err(|source| OperationError::Comment {
                kind: "unmark",
                source,
            })?;

        let label = self.config.stale_label.clone();
        self.tracker
            .update_labels(&issue.id, LabelUpdate::Remove(label.clone()))
            .await
            .map_err(|source| OperationError::RemoveLabel { label, source })
    }

    async fn close_issue(&self, issue: &Issue) -> Result<(), OperationError> {
        let status = &self.config.close_status;
        let transitions = self
            .tracker
            .transitions(&issue.id)
            .await
            .map_err(OperationError::Transitions)?;
        let transition = transitions
            .iter()
            .find(|t| &t.to.name == status)
            .ok_or_else(|| OperationError::TransitionNotFound(status.clone()))?;

        self.tracker
            .do_transition(&issue.id, &transition.id)
            .await
            .map_err(|source| OperationError::Transition {
                status: status.clone(),
                source,
            })?;

        self.tracker
            .add_comment(&issue.id, &self.config.close_comment)
            .await
            .map_err(|source| OperationError::Comment {
                kind: "close",
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use jira::{
        Changelog, ChangelogHistory, ChangelogItem, IssueFields, SearchPage, Status, Transition,
    };
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const STALE: &str = "lifecycle-stale";

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Search(usize),
        Comment(String, String),
        Labels(String, LabelUpdate),
        Transitions(String),
        Transition(String, String),
    }

    /// In-memory tracker that serves fixed pages and records every call.
    #[derive(Default)]
    struct FakeTracker {
        issues: Vec<Issue>,
        page_size: usize,
        transitions: Vec<Transition>,
        fail_comment_on: Option<String>,
        fail_search: bool,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl FakeTracker {
        fn new(issues: Vec<Issue>) -> Self {
            Self {
                issues,
                page_size: PAGE_SIZE,
                transitions: vec![transition("21", "In Progress"), transition("31", "Closed")],
                ..Self::default()
            }
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn api_error(message: &str) -> jira::Error {
        jira::Error::Api {
            status: 500,
            message: message.to_string(),
        }
    }

    #[async_trait]
    impl IssueTracker for FakeTracker {
        async fn search(
            &self,
            _jql: &str,
            start_at: usize,
            max_results: usize,
        ) -> Result<SearchPage, jira::Error> {
            self.record(Call::Search(start_at));
            if self.fail_search {
                return Err(api_error("search down"));
            }
            let size = self.page_size.min(max_results);
            let issues = self
                .issues
                .iter()
                .skip(start_at)
                .take(size)
                .cloned()
                .collect();
            Ok(SearchPage {
                start_at,
                max_results: size,
                total: self.issues.len(),
                issues,
            })
        }

        async fn add_comment(&self, issue_id: &str, body: &str) -> Result<(), jira::Error> {
            self.record(Call::Comment(issue_id.to_string(), body.to_string()));
            if self.fail_comment_on.as_deref() == Some(issue_id) {
                return Err(api_error("comment rejected"));
            }
            Ok(())
        }

        async fn update_labels(
            &self,
            issue_id: &str,
            update: LabelUpdate,
        ) -> Result<(), jira::Error> {
            self.record(Call::Labels(issue_id.to_string(), update));
            Ok(())
        }

        async fn transitions(&self, issue_id: &str) -> Result<Vec<Transition>, jira::Error> {
            self.record(Call::Transitions(issue_id.to_string()));
            Ok(self.transitions.clone())
        }

        async fn do_transition(
            &self,
            issue_id: &str,
            transition_id: &str,
        ) -> Result<(), jira::Error> {
            self.record(Call::Transition(
                issue_id.to_string(),
                transition_id.to_string(),
            ));
            Ok(())
        }
    }

    /// Confirmer answering from a script; runs out as "no".
    struct ScriptedConfirmer {
        answers: Mutex<VecDeque<Result<bool, PromptError>>>,
        asked: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedConfirmer {
        fn new(answers: Vec<Result<bool, PromptError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                asked: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl Confirmer for ScriptedConfirmer {
        async fn confirm(
            &self,
            message: &str,
            _cancel: &CancellationToken,
        ) -> Result<bool, PromptError> {
            self.asked.lock().unwrap().push(message.to_string());
            self.answers.lock().unwrap().pop_front().unwrap_or(Ok(false))
        }
    }

    /// Confirmer that requests cancellation while approving the operation.
    struct CancellingConfirmer(CancellationToken);

    #[async_trait]
    impl Confirmer for CancellingConfirmer {
        async fn confirm(
            &self,
            _message: &str,
            _cancel: &CancellationToken,
        ) -> Result<bool, PromptError> {
            self.0.cancel();
            Ok(true)
        }
    }

    fn transition(id: &str, to: &str) -> Transition {
        Transition {
            id: id.to_string(),
            name: format!("To {to}"),
            to: Status {
                name: to.to_string(),
                ..Status::default()
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
    }

    fn config() -> Config {
        let mut config = Config {
            jira_base_url: "https://issues.example.com".to_string(),
            project: "PROJ".to_string(),
            close_status: "Closed".to_string(),
            exempt_labels: vec!["lifecycle-frozen".to_string()],
            mark_comment: "mark".to_string(),
            unmark_comment: "unmark".to_string(),
            close_comment: "close".to_string(),
            ..Config::default()
        };
        config.set_defaults();
        config
    }

    fn issue(n: u32, labels: &[&str], days_ago: i64) -> Issue {
        Issue {
            id: format!("{}", 10_000 + n),
            key: format!("PROJ-{n}"),
            fields: IssueFields {
                summary: format!("issue {n}"),
                labels: labels.iter().map(ToString::to_string).collect(),
                updated: Some(now() - Duration::days(days_ago)),
                ..IssueFields::default()
            },
            changelog: None,
        }
    }

    fn marked(n: u32, days_ago: i64) -> Issue {
        let mut issue = issue(n, &[STALE], days_ago);
        issue.changelog = Some(Changelog {
            histories: vec![ChangelogHistory {
                items: vec![ChangelogItem {
                    field: "labels".to_string(),
                    from_text: String::new(),
                    to_text: STALE.to_string(),
                }],
                ..ChangelogHistory::default()
            }],
        });
        issue
    }

    fn calls(tracker: &Arc<Mutex<Vec<Call>>>) -> Vec<Call> {
        tracker.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_run_applies_each_operation() {
        let tracker = FakeTracker::new(vec![
            issue(1, &[], 120),     // mark
            issue(2, &[], 10),      // too recent
            issue(3, &[STALE], 5),  // touched after marking
            marked(4, 20),          // close
            issue(5, &["lifecycle-frozen"], 400), // exempt
        ]);
        let log = tracker.calls.clone();

        let summary = Stalebot::new(tracker, config())
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.processed, 5);
        assert_eq!(summary.count(Operation::None), 2);
        assert_eq!(summary.count(Operation::AddStaleLabel), 1);
        assert_eq!(summary.count(Operation::RemoveStaleLabel), 1);
        assert_eq!(summary.count(Operation::Close), 1);
        assert_eq!(summary.acted, 3);
        assert!(!summary.limit_reached);

        assert_eq!(
            calls(&log),
            vec![
                Call::Search(0),
                Call::Comment("10001".into(), "mark".into()),
                Call::Labels("10001".into(), LabelUpdate::Add(STALE.into())),
                Call::Comment("10003".into(), "unmark".into()),
                Call::Labels("10003".into(), LabelUpdate::Remove(STALE.into())),
                Call::Transitions("10004".into()),
                Call::Transition("10004".into(), "31".into()),
                Call::Comment("10004".into(), "close".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_changes() {
        let tracker = FakeTracker::new(vec![issue(1, &[], 120), marked(2, 20)]);
        let log = tracker.calls.clone();

        let summary = Stalebot::new(tracker, config())
            .dry_run(true)
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.count(Operation::AddStaleLabel), 1);
        assert_eq!(summary.count(Operation::Close), 1);
        assert_eq!(summary.acted, 2);
        assert_eq!(calls(&log), vec![Call::Search(0)]);
    }

    #[tokio::test]
    async fn test_declined_confirmation_skips_issue() {
        let tracker = FakeTracker::new(vec![issue(1, &[], 120), issue(2, &[], 120)]);
        let log = tracker.calls.clone();
        let confirmer = ScriptedConfirmer::new(vec![Ok(false), Ok(true)]);
        let asked = confirmer.asked.clone();

        let summary = Stalebot::new(tracker, config())
            .with_confirmer(confirmer)
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.count(Operation::AddStaleLabel), 2);
        assert_eq!(summary.acted, 1);
        assert_eq!(
            asked.lock().unwrap().first().map(String::as_str),
            Some("Perform operation \"AddStaleLabel\" on  PROJ-1: issue 1?")
        );
        let mutated: Vec<_> = calls(&log)
            .into_iter()
            .filter(|c| !matches!(c, Call::Search(_)))
            .collect();
        assert_eq!(
            mutated,
            vec![
                Call::Comment("10002".into(), "mark".into()),
                Call::Labels("10002".into(), LabelUpdate::Add(STALE.into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_confirmation_is_not_asked_for_none() {
        let tracker = FakeTracker::new(vec![issue(1, &[], 10)]);
        let confirmer = ScriptedConfirmer::new(vec![]);
        let asked = confirmer.asked.clone();

        Stalebot::new(tracker, config())
            .with_confirmer(confirmer)
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(asked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_cancellation_aborts_run() {
        let tracker = FakeTracker::new(vec![issue(1, &[], 120)]);
        let log = tracker.calls.clone();
        let confirmer = ScriptedConfirmer::new(vec![Err(PromptError::Cancelled)]);

        let err = Stalebot::new(tracker, config())
            .with_confirmer(confirmer)
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StalebotError::Confirm(PromptError::Cancelled)));
        assert_eq!(calls(&log), vec![Call::Search(0)]);
    }

    #[tokio::test]
    async fn test_pages_until_total_exhausted() {
        let mut tracker = FakeTracker::new(vec![
            issue(1, &[], 10),
            issue(2, &[], 10),
            issue(3, &[], 10),
        ]);
        tracker.page_size = 2;
        let log = tracker.calls.clone();

        let summary = Stalebot::new(tracker, config())
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(calls(&log), vec![Call::Search(0), Call::Search(2)]);
    }

    #[tokio::test]
    async fn test_empty_result_stops_after_one_search() {
        let tracker = FakeTracker::new(vec![]);
        let log = tracker.calls.clone();

        let summary = Stalebot::new(tracker, config())
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary, RunSummary::default());
        assert_eq!(calls(&log), vec![Call::Search(0)]);
    }

    #[tokio::test]
    async fn test_missing_close_transition_fails_with_context() {
        let mut tracker = FakeTracker::new(vec![marked(4, 20)]);
        tracker.transitions = vec![transition("21", "In Progress")];

        let err = Stalebot::new(tracker, config())
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap_err();

        match &err {
            StalebotError::Operation { op, key, source } => {
                assert_eq!(*op, Operation::Close);
                assert_eq!(key, "PROJ-4");
                assert!(matches!(source, OperationError::TransitionNotFound(s) if s == "Closed"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.to_string(), "operation \"Close\" failed on issue \"PROJ-4\"");
    }

    #[tokio::test]
    async fn test_failed_operation_aborts_remaining_issues() {
        let mut tracker = FakeTracker::new(vec![issue(1, &[], 120), issue(2, &[], 120)]);
        tracker.fail_comment_on = Some("10001".to_string());
        let log = tracker.calls.clone();

        let err = Stalebot::new(tracker, config())
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StalebotError::Operation {
                op: Operation::AddStaleLabel,
                source: OperationError::Comment { kind: "mark", .. },
                ..
            }
        ));
        assert_eq!(
            calls(&log),
            vec![
                Call::Search(0),
                Call::Comment("10001".into(), "mark".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_failure_is_fatal() {
        let mut tracker = FakeTracker::new(vec![issue(1, &[], 120)]);
        tracker.fail_search = true;

        let err = Stalebot::new(tracker, config())
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StalebotError::Search(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let tracker = FakeTracker::new(vec![issue(1, &[], 120)]);
        let log = tracker.calls.clone();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = Stalebot::new(tracker, config())
            .run_at(now(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, StalebotError::Cancelled));
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_mid_run_stops_before_next_issue() {
        let tracker = FakeTracker::new(vec![issue(1, &[], 120), issue(2, &[], 120)]);
        let log = tracker.calls.clone();
        let cancel = CancellationToken::new();

        let err = Stalebot::new(tracker, config())
            .with_confirmer(CancellingConfirmer(cancel.clone()))
            .run_at(now(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, StalebotError::Cancelled));
        assert_eq!(
            calls(&log),
            vec![
                Call::Search(0),
                Call::Comment("10001".into(), "mark".into()),
                Call::Labels("10001".into(), LabelUpdate::Add(STALE.into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_dry_run_operations_count_toward_limit() {
        let tracker = FakeTracker::new(vec![issue(1, &[], 120), issue(2, &[], 120)]);
        let log = tracker.calls.clone();
        let mut cfg = config();
        cfg.limit_per_run = 1;

        let summary = Stalebot::new(tracker, cfg)
            .dry_run(true)
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.acted, 1);
        assert_eq!(summary.processed, 1);
        assert!(summary.limit_reached);
        assert_eq!(calls(&log), vec![Call::Search(0)]);
    }

    #[tokio::test]
    async fn test_limit_per_run_stops_scan() {
        let tracker = FakeTracker::new(vec![
            issue(1, &[], 120),
            issue(2, &[], 120),
            issue(3, &[], 120),
        ]);
        let log = tracker.calls.clone();
        let mut cfg = config();
        cfg.limit_per_run = 2;

        let summary = Stalebot::new(tracker, cfg)
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.acted, 2);
        assert_eq!(summary.processed, 2);
        assert!(summary.limit_reached);
        let labeled = calls(&log)
            .into_iter()
            .filter(|c| matches!(c, Call::Labels(..)))
            .count();
        assert_eq!(labeled, 2);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let tracker = FakeTracker::new(vec![]);
        let log = tracker.calls.clone();
        let mut cfg = config();
        cfg.project = "lower".to_string();

        let err = Stalebot::new(tracker, cfg)
            .run_at(now(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StalebotError::InvalidConfig(_)));
        assert!(calls(&log).is_empty());
    }
}
