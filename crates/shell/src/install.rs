use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("install prompt was already used")]
    PromptConsumed,
    #[error("install prompt failed: {0}")]
    PromptFailed(String),
}

/// A deferred "add to home screen" prompt owned by the host.
#[async_trait]
pub trait InstallPrompt: Send + Sync {
    /// Show the prompt and wait for the user's choice.
    async fn prompt(&self) -> Result<InstallOutcome, ShellError>;
}
