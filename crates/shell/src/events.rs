use crate::install::InstallPrompt;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Connectivity {
    pub online: bool,
    pub changed_at: DateTime<Utc>,
}

pub type ConnectivityHandler = Arc<dyn Fn(&Connectivity) + Send + Sync>;
pub type InstallHandler = Arc<dyn Fn(Arc<dyn InstallPrompt>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Connectivity,
    Install,
}

struct Registry {
    online: bool,
    connectivity: HashMap<Uuid, ConnectivityHandler>,
    install: HashMap<Uuid, InstallHandler>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            online: true,
            connectivity: HashMap::new(),
            install: HashMap::new(),
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Connectivity and install-prompt notifications coming from the host.
///
/// Handlers stay registered for as long as the returned [`Subscription`] is
/// alive.
#[derive(Clone, Default)]
pub struct ShellEvents {
    registry: Arc<Mutex<Registry>>,
}

impl ShellEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_online(&self) -> bool {
        lock(&self.registry).online
    }

    pub fn on_connectivity_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Connectivity) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        lock(&self.registry)
            .connectivity
            .insert(id, Arc::new(handler));
        self.subscription(id, Topic::Connectivity)
    }

    pub fn on_install_available<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Arc<dyn InstallPrompt>) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        lock(&self.registry).install.insert(id, Arc::new(handler));
        self.subscription(id, Topic::Install)
    }

    /// Record the host's connectivity. Handlers only hear about changes.
    pub fn set_online(&self, online: bool) {
        let handlers: Vec<ConnectivityHandler> = {
            let mut registry = lock(&self.registry);
            if registry.online == online {
                return;
            }
            registry.online = online;
            registry.connectivity.values().cloned().collect()
        };
        let event = Connectivity {
            online,
            changed_at: Utc::now(),
        };
        tracing::info!(online, "connectivity changed");
        for handler in handlers {
            handler(&event);
        }
    }

    /// The host deferred its install prompt; hand it to whoever listens.
    pub fn offer_install(&self, prompt: Arc<dyn InstallPrompt>) {
        let handlers: Vec<InstallHandler> = lock(&self.registry).install.values().cloned().collect();
        tracing::debug!(listeners = handlers.len(), "install prompt available");
        for handler in handlers {
            handler(Arc::clone(&prompt));
        }
    }

    pub fn listener_count(&self) -> usize {
        let registry = lock(&self.registry);
        registry.connectivity.len() + registry.install.len()
    }

    fn subscription(&self, id: Uuid, topic: Topic) -> Subscription {
        Subscription {
            id,
            topic,
            registry: Arc::downgrade(&self.registry),
        }
    }
}

/// Unregisters its handler when dropped.
#[must_use = "the handler is removed as soon as the subscription is dropped"]
pub struct Subscription {
    id: Uuid,
    topic: Topic,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        match self.topic {
            Topic::Connectivity => {
                registry.connectivity.remove(&self.id);
            }
            Topic::Install => {
                registry.install.remove(&self.id);
            }
        }
    }
}
