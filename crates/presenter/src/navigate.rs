use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("malformed URI: {0}")]
    MalformedUri(String),
    #[error("no handler accepted the URI: {0}")]
    Rejected(String),
}

/// The host's "go to this location" primitive.
///
/// For a `upi:` intent this hands the URI to whichever payment app registered
/// the scheme.
pub trait Navigator: Send + Sync {
    fn open(&self, uri: &str) -> Result<(), NavigationError>;
}

/// Records every URI it is asked to open. Optionally refuses all of them.
#[derive(Default)]
pub struct RecordingNavigator {
    refuse: bool,
    opened: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn open(&self, uri: &str) -> Result<(), NavigationError> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(uri.to_string());
        }
        if self.refuse {
            return Err(NavigationError::Rejected(uri.to_string()));
        }
        Ok(())
    }
}
