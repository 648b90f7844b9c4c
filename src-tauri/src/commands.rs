use crate::install::{InstallReply, WebviewInstallPrompt};
use presenter::{IntentPresenter, PresenterSnapshot};
use serde::Serialize;
use shell::{AppShell, InstallOutcome, ShellEvents, ShellStatus, WebAppManifest};
use std::sync::Arc;
use tauri::State;

pub struct AppState {
    pub presenter: Arc<IntentPresenter>,
    pub events: ShellEvents,
    pub shell: AppShell,
    pub install_reply: InstallReply,
    pub manifest: WebAppManifest,
    pub placeholder: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageState {
    pub presenter: PresenterSnapshot,
    pub placeholder: String,
}

#[tauri::command]
pub fn load_state(state: State<'_, AppState>) -> Result<PageState, String> {
    Ok(PageState {
        presenter: state.presenter.snapshot(),
        placeholder: state.placeholder.clone(),
    })
}

#[tauri::command]
pub fn edit_intent(text: String, state: State<'_, AppState>) -> Result<PresenterSnapshot, String> {
    Ok(state.presenter.edit_intent(text))
}

#[tauri::command]
pub fn submit_direct(state: State<'_, AppState>) -> Result<PresenterSnapshot, String> {
    Ok(state.presenter.submit_direct())
}

#[tauri::command]
pub async fn submit_qr(state: State<'_, AppState>) -> Result<PresenterSnapshot, String> {
    Ok(state.presenter.submit_qr().await)
}

#[tauri::command]
pub fn web_manifest(state: State<'_, AppState>) -> Result<WebAppManifest, String> {
    Ok(state.manifest.clone())
}

#[tauri::command]
pub fn shell_status(state: State<'_, AppState>) -> Result<ShellStatus, String> {
    Ok(state.shell.status())
}

#[tauri::command]
pub fn report_connectivity(online: bool, state: State<'_, AppState>) -> Result<ShellStatus, String> {
    state.events.set_online(online);
    Ok(state.shell.status())
}

#[tauri::command]
pub fn report_install_available(
    app: tauri::AppHandle,
    state: State<'_, AppState>,
) -> Result<ShellStatus, String> {
    let prompt = WebviewInstallPrompt::new(app, state.install_reply.clone());
    state.events.offer_install(Arc::new(prompt));
    Ok(state.shell.status())
}

#[tauri::command]
pub async fn install_app(state: State<'_, AppState>) -> Result<Option<InstallOutcome>, String> {
    Ok(state.shell.install().await)
}

#[tauri::command]
pub fn resolve_install(accepted: bool, state: State<'_, AppState>) -> Result<bool, String> {
    let outcome = if accepted {
        InstallOutcome::Accepted
    } else {
        InstallOutcome::Dismissed
    };
    Ok(state.install_reply.resolve(outcome))
}
