//! Jira REST API client for the stalebot.
//!
//! This crate provides:
//! - A REST v2 client for Jira Server / Data Center, authenticated with a
//!   personal access token
//! - Type definitions for the issue snapshot the bot evaluates (labels,
//!   status category, last update, changelog)
//! - Workflow transition lookup and execution

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Every API method can fail

pub mod client;
pub mod error;
pub mod models;

pub use client::Client;
pub use error::Error;
pub use models::*;
pub use reqwest::Url;
