// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use luther::error::LutherError;
use luther::launcher::{launch, load_config, resolve_app_root, shutdown};
use luther::logger::initialize as LoggerInitialize;
use luther::state::LauncherState;
use luther::window::{DesktopWindow, MAIN_WINDOW_LABEL};

use launcher_core::APP_NAME;
use launcher_core::supervisor::Supervisor;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;

use log::{error, info};
use tauri::{Manager, RunEvent, WindowEvent};

/// macOS apps stay alive with no windows open and reopen from the dock.
const KEEP_ALIVE_WITHOUT_WINDOWS: bool = cfg!(target_os = "macos");

fn main() {
    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .enable_macos_default_menu(false)
        .setup(|app| {
            let log_dir = app
                .path()
                .app_log_dir()
                .map_err(|e| LutherError::Luther {
                    message: format!("Failed to get log directory: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            create_dir_all(&log_dir).map_err(|e| LutherError::Luther {
                message: format!("Failed to create log directory: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

            // Initialize logger FIRST
            LoggerInitialize(&log_dir)?;

            info!("{APP_NAME} starting");

            let config = match app.path().app_config_dir() {
                Ok(config_dir) => load_config(&config_dir),
                Err(e) => {
                    error!("Failed to get config directory, using defaults: {e}");
                    Default::default()
                }
            };

            let resource_dir = app
                .path()
                .resource_dir()
                .map_err(|e| LutherError::Luther {
                    message: format!("Failed to get resource directory: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let app_root = resolve_app_root(&config.server, &resource_dir);
            info!("App root: {}", app_root.display());

            let supervisor =
                Supervisor::<DesktopWindow>::new(&config, &app_root).map_err(LutherError::from)?;
            app.manage(LauncherState::new(config, supervisor));

            launch(app.handle())?;

            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event
                && window.label() == MAIN_WINDOW_LABEL
            {
                info!("Launcher window destroyed");
                shutdown(window.app_handle());
            }
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app, event| match event {
        RunEvent::ExitRequested { code, api, .. } => {
            if code.is_none() && KEEP_ALIVE_WITHOUT_WINDOWS {
                info!("All windows closed, staying alive");
                api.prevent_exit();
            }
        }
        RunEvent::Exit => {
            info!("{APP_NAME} exiting");
            shutdown(app);
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen {
            has_visible_windows,
            ..
        } => {
            if !has_visible_windows && app.get_webview_window(MAIN_WINDOW_LABEL).is_none() {
                info!("Reopened with no window, launching again");
                if let Err(e) = launch(app) {
                    error!("Failed to relaunch window: {e}");
                }
            }
        }
        _ => {}
    });
}
