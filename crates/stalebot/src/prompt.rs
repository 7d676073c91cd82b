//! Interactive confirmation before each operation.

use async_trait::async_trait;
use dialoguer::Confirm;
use jira::Issue;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::operations::Operation;

/// Errors raised while asking for confirmation.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Cancellation fired before an answer arrived.
    #[error("prompt cancelled")]
    Cancelled,

    /// Reading the answer failed.
    #[error("read input from prompt")]
    Terminal(#[from] dialoguer::Error),

    /// The blocking reader task died.
    #[error("prompt task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Asks whether an operation should go ahead.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Returns `Ok(false)` when declined; declining is not an error.
    async fn confirm(&self, message: &str, cancel: &CancellationToken) -> Result<bool, PromptError>;
}

/// Question shown for an operation on an issue.
#[must_use]
pub fn confirmation_message(op: Operation, issue: &Issue) -> String {
    format!(
        "Perform operation \"{op}\" on {} {}: {}?",
        issue.type_name(),
        issue.key,
        issue.fields.summary
    )
}

/// `[y/N]` prompt on the controlling terminal.
///
/// The read blocks, so it runs on the blocking pool while the caller waits on
/// either the answer or cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, message: &str, cancel: &CancellationToken) -> Result<bool, PromptError> {
        if cancel.is_cancelled() {
            return Err(PromptError::Cancelled);
        }

        let prompt = message.to_string();
        read_or_cancel(
            move || {
                Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .show_default(true)
                    .wait_for_newline(true)
                    .interact()
            },
            cancel,
        )
        .await
    }
}

/// Run a blocking read on the blocking pool, giving up when `cancel` fires.
///
/// A cancelled read keeps its thread until the read returns on its own.
async fn read_or_cancel<F>(read: F, cancel: &CancellationToken) -> Result<bool, PromptError>
where
    F: FnOnce() -> dialoguer::Result<bool> + Send + 'static,
{
    let answer = tokio::task::spawn_blocking(read);

    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            eprintln!();
            Err(PromptError::Cancelled)
        }
        result = answer => Ok(result??),
    }
}
