pub mod app_shell;
pub mod events;
pub mod install;
pub mod manifest;

pub use app_shell::{AppShell, ShellStatus};
pub use events::{Connectivity, ShellEvents, Subscription};
pub use install::{InstallOutcome, InstallPrompt, ShellError};
pub use manifest::WebAppManifest;
