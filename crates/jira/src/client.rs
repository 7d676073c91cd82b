//! REST client for the Jira v2 API.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::Error;
use crate::models::{LabelUpdate, SearchPage, Transition};

/// REST API prefix appended to the base URL.
const API_PREFIX: &str = "rest/api/2";

/// Fields requested for every issue returned by search.
pub const SEARCH_FIELDS: &[&str] = &["key", "issuetype", "summary", "labels", "status", "updated"];

/// Request timeout for every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Jira REST client authenticated with a personal access token.
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    api_url: Url,
}

/// Search request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    jql: &'a str,
    start_at: usize,
    max_results: usize,
    fields: &'a [&'a str],
    expand: &'a [&'a str],
}

/// Comment request body
#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

/// Issue update body
#[derive(Debug, Serialize)]
struct UpdateRequest {
    update: LabelsUpdate,
}

#[derive(Debug, Serialize)]
struct LabelsUpdate {
    labels: Vec<LabelOp>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum LabelOp {
    Add(String),
    Remove(String),
}

/// Transition request body
#[derive(Debug, Serialize)]
struct TransitionRequest<'a> {
    transition: TransitionRef<'a>,
}

#[derive(Debug, Serialize)]
struct TransitionRef<'a> {
    id: &'a str,
}

/// Comment as returned by Jira
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// Comment id
    #[serde(default)]
    pub id: String,
    /// Comment body
    #[serde(default)]
    pub body: String,
}

impl Client {
    /// Create a new Jira client.
    ///
    /// # Arguments
    /// * `base_url` - Jira instance URL (e.g., `https://issues.example.com`)
    /// * `token` - Personal access token, sent as a bearer token
    pub fn new(base_url: &str, token: &str) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| Error::InvalidToken)?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("jira-stalebot/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url(base_url)?,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let url = self
            .api_url
            .join(path)
            .map_err(|e| Error::InvalidBaseUrl {
                url: self.api_url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(self.client.request(method, url))
    }

    /// Send a request and fail on any non-success status.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, Error> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_response(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn send_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, Error> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Run a JQL search and return one page of issues with their changelog.
    #[instrument(skip(self), fields(start_at = start_at))]
    pub async fn search(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> Result<SearchPage, Error> {
        let body = SearchRequest {
            jql,
            start_at,
            max_results,
            fields: SEARCH_FIELDS,
            expand: &["changelog"],
        };
        let page: SearchPage = self
            .send_json(self.request(Method::POST, "search")?.json(&body))
            .await?;
        debug!(
            total = page.total,
            returned = page.issues.len(),
            "Search page received"
        );
        Ok(page)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a comment to an issue.
    #[instrument(skip(self, body), fields(issue_id = %issue_id))]
    pub async fn add_comment(&self, issue_id: &str, body: &str) -> Result<Comment, Error> {
        let request = self
            .request(Method::POST, &format!("issue/{issue_id}/comment"))?
            .json(&CommentRequest { body });
        let comment: Comment = self.send_json(request).await?;
        debug!(comment_id = %comment.id, "Comment created");
        Ok(comment)
    }

    /// Add or remove a single label through the issue update API.
    #[instrument(skip(self), fields(issue_id = %issue_id))]
    pub async fn update_labels(&self, issue_id: &str, update: &LabelUpdate) -> Result<(), Error> {
        let op = match update {
            LabelUpdate::Add(label) => LabelOp::Add(label.clone()),
            LabelUpdate::Remove(label) => LabelOp::Remove(label.clone()),
        };
        let body = UpdateRequest {
            update: LabelsUpdate { labels: vec![op] },
        };
        self.send(
            self.request(Method::PUT, &format!("issue/{issue_id}"))?
                .json(&body),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Workflow Transitions
    // =========================================================================

    /// List the transitions currently available for an issue.
    #[instrument(skip(self), fields(issue_id = %issue_id))]
    pub async fn transitions(&self, issue_id: &str) -> Result<Vec<Transition>, Error> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            transitions: Vec<Transition>,
        }

        let response: Response = self
            .send_json(self.request(Method::GET, &format!("issue/{issue_id}/transitions"))?)
            .await?;
        Ok(response.transitions)
    }

    /// Execute a transition by id.
    #[instrument(skip(self), fields(issue_id = %issue_id))]
    pub async fn do_transition(&self, issue_id: &str, transition_id: &str) -> Result<(), Error> {
        let body = TransitionRequest {
            transition: TransitionRef { id: transition_id },
        };
        self.send(
            self.request(Method::POST, &format!("issue/{issue_id}/transitions"))?
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

/// Normalise a base URL into the REST API root, always ending in `/`.
fn api_url(base_url: &str) -> Result<Url, Error> {
    let invalid = |reason: String| Error::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut base = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("{API_PREFIX}/"))
        .map_err(|e| invalid(e.to_string()))
}
