//! Personal access token discovery.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the token.
pub const TOKEN_ENV_VAR: &str = "JIRA_STALEBOT_PAT";

/// Token file location relative to the user config directory.
const TOKEN_FILE: &str = "jira-stalebot/pat";

/// Errors raised while resolving the access token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Neither the env var nor the token file is available.
    #[error(
        "{var} environment variable not set and personal access token file not found (looked in {path})",
        var = TOKEN_ENV_VAR,
        path = display_path(.searched.as_deref())
    )]
    Missing { searched: Option<PathBuf> },

    /// The token file exists but cannot be read.
    #[error("read personal access token file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token file holds only whitespace.
    #[error("personal access token file {} is empty", path.display())]
    Empty { path: PathBuf },
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(
        || "<no user config directory>".to_string(),
        |p| p.display().to_string(),
    )
}

/// Resolve the token from the environment, then from
/// `<config dir>/jira-stalebot/pat`.
pub fn load_personal_access_token() -> Result<String, TokenError> {
    resolve_token(std::env::var(TOKEN_ENV_VAR).ok(), dirs::config_dir())
}

/// Resolve the token from an env value and a config directory.
///
/// A set but empty env value is treated as unset.
pub fn resolve_token(
    env_value: Option<String>,
    config_dir: Option<PathBuf>,
) -> Result<String, TokenError> {
    if let Some(token) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(token.trim().to_string());
    }

    let path = match config_dir.map(|dir| dir.join(TOKEN_FILE)) {
        Some(path) if path.is_file() => path,
        searched => return Err(TokenError::Missing { searched }),
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| TokenError::Read {
        path: path.clone(),
        source,
    })?;
    let token = contents.trim();
    if token.is_empty() {
        return Err(TokenError::Empty { path });
    }
    Ok(token.to_string())
}
