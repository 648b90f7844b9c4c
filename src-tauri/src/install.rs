use async_trait::async_trait;
use shell::{InstallOutcome, InstallPrompt, ShellError};
use std::sync::{Arc, Mutex, PoisonError};
use tauri::{AppHandle, Manager};
use tokio::sync::oneshot;

pub const INSTALL_PROMPT_EVENT: &str = "shell://install-prompt";

/// Reply slot for the prompt currently shown by the webview.
#[derive(Clone, Default)]
pub struct InstallReply {
    pending: Arc<Mutex<Option<oneshot::Sender<InstallOutcome>>>>,
}

impl InstallReply {
    fn arm(&self) -> oneshot::Receiver<InstallOutcome> {
        let (tx, rx) = oneshot::channel();
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    /// Returns false when no prompt was waiting for an answer.
    pub fn resolve(&self, outcome: InstallOutcome) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }
}

/// The webview's deferred `beforeinstallprompt` event.
///
/// Prompting asks the page to call `prompt()` on it and waits for the page to
/// report the user's choice back.
pub struct WebviewInstallPrompt {
    app: AppHandle,
    reply: InstallReply,
}

impl WebviewInstallPrompt {
    pub fn new(app: AppHandle, reply: InstallReply) -> Self {
        Self { app, reply }
    }
}

#[async_trait]
impl InstallPrompt for WebviewInstallPrompt {
    async fn prompt(&self) -> Result<InstallOutcome, ShellError> {
        let answer = self.reply.arm();
        self.app
            .emit_all(INSTALL_PROMPT_EVENT, ())
            .map_err(|e| ShellError::PromptFailed(e.to_string()))?;
        answer
            .await
            .map_err(|_| ShellError::PromptFailed("prompt abandoned".to_string()))
    }
}
