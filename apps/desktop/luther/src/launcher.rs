//! Glue between Tauri's app lifecycle and the supervisor.

use crate::error::LutherError;
use crate::state::LauncherState;
use crate::window::build_window;

use launcher_core::config::{LauncherConfig, ServerConfig};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use tauri::{AppHandle, Manager};

/// Load `launcher.json` from `config_dir`, falling back to defaults on any error.
pub fn load_config(config_dir: &Path) -> LauncherConfig {
    match LauncherConfig::load(config_dir) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring launcher config, using defaults: {e}");
            LauncherConfig::default()
        }
    }
}

/// Directory the server runs from.
///
/// A relative `server.app_root` resolves against the resource directory.
pub fn resolve_app_root(config: &ServerConfig, resource_dir: &Path) -> PathBuf {
    match &config.app_root {
        Some(root) if root.is_absolute() => root.clone(),
        Some(root) => resource_dir.join(root),
        None => resource_dir.to_path_buf(),
    }
}

/// Create and attach the launcher window, then run the startup sequence in the background.
///
/// # Errors
///
/// Returns [`LutherError`] if the state is missing, the window cannot be created,
/// or a window is already attached.
#[track_caller]
pub fn launch(app: &AppHandle) -> Result<(), LutherError> {
    let state = app.try_state::<LauncherState>().ok_or_else(|| LutherError::Luther {
        message: String::from("Launcher state is not registered"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let supervisor = state.supervisor();
    let window = build_window(app, &state.config().window, Arc::clone(&supervisor))?;
    info!(
        "Launcher window '{}' created for {}",
        window.label(),
        supervisor.target()
    );

    // Attached before the event loop can deliver the window's first page load
    let attached = supervisor.attach(Arc::new(window))?;

    tauri::async_runtime::spawn(async move {
        let outcome = supervisor.run(attached).await;
        debug!("Startup sequence finished: {outcome:?}");
    });

    Ok(())
}

/// Stop the server if the launcher state exists.
pub fn shutdown(app: &AppHandle) {
    if let Some(state) = app.try_state::<LauncherState>() {
        state.supervisor().shutdown();
    }
}
