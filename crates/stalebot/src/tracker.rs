//! Issue tracker capabilities the run loop depends on.

use async_trait::async_trait;
use jira::{LabelUpdate, SearchPage, Transition};

/// Query and mutation calls against the issue tracker.
///
/// Implemented by [`jira::Client`]; tests supply an in-memory tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch one page of issues matching `jql`, changelog included.
    async fn search(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> Result<SearchPage, jira::Error>;

    /// Post a comment on an issue.
    async fn add_comment(&self, issue_id: &str, body: &str) -> Result<(), jira::Error>;

    /// Apply a label delta to an issue.
    async fn update_labels(&self, issue_id: &str, update: LabelUpdate) -> Result<(), jira::Error>;

    /// List transitions available from the issue's current status.
    async fn transitions(&self, issue_id: &str) -> Result<Vec<Transition>, jira::Error>;

    /// Execute a transition.
    async fn do_transition(&self, issue_id: &str, transition_id: &str) -> Result<(), jira::Error>;
}

#[async_trait]
impl IssueTracker for jira::Client {
    async fn search(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> Result<SearchPage, jira::Error> {
        jira::Client::search(self, jql, start_at, max_results).await
    }

    async fn add_comment(&self, issue_id: &str, body: &str) -> Result<(), jira::Error> {
        jira::Client::add_comment(self, issue_id, body).await?;
        Ok(())
    }

    async fn update_labels(&self, issue_id: &str, update: LabelUpdate) -> Result<(), jira::Error> {
        jira::Client::update_labels(self, issue_id, &update).await
    }

    async fn transitions(&self, issue_id: &str) -> Result<Vec<Transition>, jira::Error> {
        jira::Client::transitions(self, issue_id).await
    }

    async fn do_transition(&self, issue_id: &str, transition_id: &str) -> Result<(), jira::Error> {
        jira::Client::do_transition(self, issue_id, transition_id).await
    }
}
