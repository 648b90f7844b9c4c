use presenter::navigate::{NavigationError, Navigator};
use tauri::{AppHandle, Manager};
use url::Url;

/// Opens intents with the OS handler registered for their scheme.
pub struct ShellNavigator {
    app: AppHandle,
}

impl ShellNavigator {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl Navigator for ShellNavigator {
    fn open(&self, uri: &str) -> Result<(), NavigationError> {
        Url::parse(uri).map_err(|e| NavigationError::MalformedUri(e.to_string()))?;
        tauri::api::shell::open(&self.app.shell_scope(), uri, None)
            .map_err(|e| NavigationError::Rejected(e.to_string()))
    }
}
