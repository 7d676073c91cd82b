//! Jira stale bot.
//!
//! Finds open issues in a project that have gone quiet, marks them with a
//! stale label, closes them if nothing happens afterwards, and removes the
//! label again when someone touches a marked issue.
//!
//! The bot keeps no state between runs. Every decision is derived from the
//! issue's labels, its update time and the last changelog entry, so runs can
//! be repeated or interrupted safely.

pub mod bot;
pub mod config;
pub mod operations;
pub mod prompt;
pub mod query;
pub mod token;
pub mod tracker;

pub use bot::{OperationError, RunSummary, Stalebot, StalebotError, PAGE_SIZE};
pub use config::{Config, ConfigError, ValidationErrors};
pub use operations::Operation;
pub use prompt::{Confirmer, PromptError, TerminalConfirmer};
pub use token::{load_personal_access_token, TokenError, TOKEN_ENV_VAR};
pub use tracker::IssueTracker;
