use crate::events::{ShellEvents, Subscription};
use crate::install::{InstallOutcome, InstallPrompt};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const FEATURES: [&str; 4] = [
    "Offline Support",
    "Install to Home Screen",
    "Background Sync",
    "Push Notifications",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellStatus {
    pub offline: bool,
    pub connectivity_label: &'static str,
    pub changed_at: Option<DateTime<Utc>>,
    pub install_available: bool,
    pub features: Vec<&'static str>,
}

#[derive(Default)]
struct ShellState {
    offline: bool,
    changed_at: Option<DateTime<Utc>>,
    install_prompt: Option<Arc<dyn InstallPrompt>>,
}

/// Connectivity banner and install button shown beside the payment card.
pub struct AppShell {
    state: Arc<Mutex<ShellState>>,
    _subscriptions: Vec<Subscription>,
}

fn lock(state: &Mutex<ShellState>) -> MutexGuard<'_, ShellState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AppShell {
    /// Start listening; the listeners go away with the returned value.
    pub fn attach(events: &ShellEvents) -> Self {
        let state = Arc::new(Mutex::new(ShellState {
            offline: !events.is_online(),
            ..ShellState::default()
        }));

        let connectivity = {
            let state = Arc::clone(&state);
            events.on_connectivity_change(move |c| {
                let mut s = lock(&state);
                s.offline = !c.online;
                s.changed_at = Some(c.changed_at);
            })
        };
        let install = {
            let state = Arc::clone(&state);
            events.on_install_available(move |prompt| {
                lock(&state).install_prompt = Some(prompt);
            })
        };

        Self {
            state,
            _subscriptions: vec![connectivity, install],
        }
    }

    pub fn status(&self) -> ShellStatus {
        let s = lock(&self.state);
        ShellStatus {
            offline: s.offline,
            connectivity_label: if s.offline { "Offline" } else { "Online" },
            changed_at: s.changed_at,
            install_available: s.install_prompt.is_some(),
            features: FEATURES.to_vec(),
        }
    }

    /// Show the deferred install prompt.
    ///
    /// Returns `None` when no prompt is available or it failed; failures are
    /// logged, not raised. A prompt can only be shown once.
    pub async fn install(&self) -> Option<InstallOutcome> {
        let prompt = lock(&self.state).install_prompt.take()?;
        match prompt.prompt().await {
            Ok(outcome) => {
                if outcome == InstallOutcome::Accepted {
                    tracing::info!("App installed successfully");
                } else {
                    tracing::info!("App install dismissed");
                }
                Some(outcome)
            }
            Err(err) => {
                tracing::error!(error = %err, "Error installing app");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::ShellError;
    use async_trait::async_trait;

    struct FixedPrompt(Result<InstallOutcome, String>);

    #[async_trait]
    impl InstallPrompt for FixedPrompt {
        async fn prompt(&self) -> Result<InstallOutcome, ShellError> {
            self.0.clone().map_err(ShellError::PromptFailed)
        }
    }

    #[test]
    fn tracks_connectivity() {
        let events = ShellEvents::new();
        let shell = AppShell::attach(&events);
        assert!(!shell.status().offline);
        assert_eq!(shell.status().connectivity_label, "Online");

        events.set_online(false);
        let status = shell.status();
        assert!(status.offline);
        assert_eq!(status.connectivity_label, "Offline");
        assert!(status.changed_at.is_some());
        assert_eq!(status.features.len(), 4);
    }

    #[test]
    fn starts_offline_when_host_is_offline() {
        let events = ShellEvents::new();
        events.set_online(false);
        assert!(AppShell::attach(&events).status().offline);
    }

    #[test]
    fn dropping_shell_releases_listeners() {
        let events = ShellEvents::new();
        let shell = AppShell::attach(&events);
        assert_eq!(events.listener_count(), 2);
        drop(shell);
        assert_eq!(events.listener_count(), 0);
    }

    #[tokio::test]
    async fn install_prompt_is_single_use() {
        let events = ShellEvents::new();
        let shell = AppShell::attach(&events);
        assert_eq!(shell.install().await, None);

        events.offer_install(Arc::new(FixedPrompt(Ok(InstallOutcome::Accepted))));
        assert!(shell.status().install_available);
        assert_eq!(shell.install().await, Some(InstallOutcome::Accepted));
        assert!(!shell.status().install_available);
        assert_eq!(shell.install().await, None);
    }

    #[tokio::test]
    async fn failed_prompt_is_swallowed() {
        let events = ShellEvents::new();
        let shell = AppShell::attach(&events);
        events.offer_install(Arc::new(FixedPrompt(Err("blocked".to_string()))));
        assert_eq!(shell.install().await, None);
    }
}
