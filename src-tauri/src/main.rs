#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

mod commands;
mod install;
mod navigator;

use commands::AppState;
use config::AppConfig;
use encoder::png::PngQrEncoder;
use install::InstallReply;
use navigator::ShellNavigator;
use presenter::IntentPresenter;
use shell::{AppShell, ShellEvents, WebAppManifest};
use std::sync::Arc;
use tauri::Manager;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PRESENTER_EVENT: &str = "presenter://state";

fn init_tracing(cfg: &AppConfig) {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .or_else(|| cfg.logging.filter.clone())
        .unwrap_or_else(|| "info,tauri=info".to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn manifest_from_config(cfg: &AppConfig) -> WebAppManifest {
    let mut manifest = WebAppManifest::default();
    let meta = cfg.app.clone();
    if let Some(name) = meta.name {
        manifest.name = name;
    }
    if let Some(short_name) = meta.short_name {
        manifest.short_name = short_name;
    }
    if let Some(description) = meta.description {
        manifest.description = description;
    }
    if let Some(theme_color) = meta.theme_color {
        manifest.theme_color = theme_color;
    }
    if let Some(background_color) = meta.background_color {
        manifest.background_color = background_color;
    }
    manifest
}

/// Intent passed on the command line, either raw or as a page link with `s`.
fn inbound_intent() -> Option<String> {
    std::env::args()
        .nth(1)
        .and_then(|arg| itqr_core::parsing::resolve_inbound(&arg))
}

fn build_state(app: &tauri::App, cfg: &AppConfig) -> anyhow::Result<AppState> {
    let handle = app.handle();
    let presenter = Arc::new(IntentPresenter::new(
        PngQrEncoder::new(),
        Arc::new(ShellNavigator::new(handle.clone())),
        inbound_intent(),
    ));

    let mut updates = presenter.subscribe();
    tauri::async_runtime::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if let Err(e) = handle.emit_all(PRESENTER_EVENT, snapshot) {
                tracing::warn!(error = %e, "failed to push presenter state");
            }
        }
    });

    let events = ShellEvents::new();
    let shell = AppShell::attach(&events);
    Ok(AppState {
        presenter,
        events,
        shell,
        install_reply: InstallReply::default(),
        manifest: manifest_from_config(cfg),
        placeholder: cfg.ui.placeholder.clone(),
    })
}

fn main() {
    let cfg = config::load().unwrap_or_default();
    init_tracing(&cfg);

    tauri::Builder::default()
        .invoke_handler(tauri::generate_handler![
            commands::load_state,
            commands::edit_intent,
            commands::submit_direct,
            commands::submit_qr,
            commands::web_manifest,
            commands::shell_status,
            commands::report_connectivity,
            commands::report_install_available,
            commands::install_app,
            commands::resolve_install
        ])
        .setup(move |app| {
            let state = build_state(app, &cfg)?;
            app.manage(state);
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_overrides_apply() {
        let mut cfg = AppConfig::default();
        cfg.app.short_name = Some("Pay".to_string());
        cfg.app.theme_color = Some("#123456".to_string());
        let manifest = manifest_from_config(&cfg);
        assert_eq!(manifest.short_name, "Pay");
        assert_eq!(manifest.theme_color, "#123456");
        assert_eq!(manifest.name, WebAppManifest::default().name);
    }
}
