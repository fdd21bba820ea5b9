//! The native launcher window and its [`WindowHost`] implementation.

use crate::error::LutherError;

use launcher_core::bridge::BridgeValues;
use launcher_core::config::WindowConfig;
use launcher_core::error::window::WindowError;
use launcher_core::supervisor::{Supervisor, WindowHost};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use log::{debug, error};
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use tauri::webview::{NewWindowResponse, PageLoadEvent};
use tauri::window::Color;
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;
use url::Url;

pub const MAIN_WINDOW_LABEL: &str = "main";

/// Bundled page shown until the server answers.
const LOADING_PAGE: &str = "index.html";

const FALLBACK_BACKGROUND: (u8, u8, u8) = (0x0F, 0x0F, 0x0F);
const OPAQUE: u8 = 0xFF;

/// A Tauri webview window driven by the supervisor.
#[derive(Clone)]
pub struct DesktopWindow {
    window: WebviewWindow,
}

impl DesktopWindow {
    pub fn new(window: WebviewWindow) -> Self {
        Self { window }
    }

    pub fn label(&self) -> &str {
        self.window.label()
    }
}

impl WindowHost for DesktopWindow {
    fn is_open(&self) -> bool {
        self.window
            .app_handle()
            .get_webview_window(self.window.label())
            .is_some()
    }

    #[track_caller]
    fn reveal(&self) -> Result<(), WindowError> {
        let location = ErrorLocation::from(Location::caller());

        self.window
            .show()
            .and_then(|()| self.window.set_focus())
            .map_err(|e| WindowError::Display {
                message: format!("Failed to show window '{}': {e}", self.label()),
                location,
                source: Some(Box::new(e)),
            })
    }

    #[track_caller]
    fn navigate(&self, url: &Url) -> Result<(), WindowError> {
        let location = ErrorLocation::from(Location::caller());

        self.window
            .navigate(url.clone())
            .map_err(|e| WindowError::Navigation {
                message: format!("Failed to load {url}: {e}"),
                location,
                source: Some(Box::new(e)),
            })
    }

    fn show_error(&self, title: &str, message: &str) {
        let title = title.to_string();
        let message = message.to_string();

        // Native dialogs must be created on the main thread on macOS
        let result = self.window.run_on_main_thread(move || {
            MessageDialog::new()
                .set_level(MessageLevel::Error)
                .set_title(title.as_str())
                .set_description(message.as_str())
                .set_buttons(MessageButtons::Ok)
                .show();
        });

        if let Err(e) = result {
            error!("Failed to show error dialog: {e}");
        }
    }

    #[track_caller]
    fn open_external(&self, url: &Url) -> Result<(), WindowError> {
        let location = ErrorLocation::from(Location::caller());

        self.window
            .app_handle()
            .opener()
            .open_url(url.as_str(), None::<&str>)
            .map_err(|e| WindowError::ExternalOpen {
                message: format!("Failed to open {url} in the default browser: {e}"),
                location,
                source: Some(Box::new(e)),
            })
    }
}

/// Create the hidden launcher window.
///
/// The bridge script is registered for every page. Navigation, new-window
/// and page-load events are routed to `supervisor`.
///
/// # Errors
///
/// Returns [`LutherError::Window`] if Tauri cannot create the window.
#[track_caller]
pub fn build_window(
    app: &AppHandle,
    config: &WindowConfig,
    supervisor: Arc<Supervisor<DesktopWindow>>,
) -> Result<DesktopWindow, LutherError> {
    let (red, green, blue) = config.background_rgb().unwrap_or(FALLBACK_BACKGROUND);
    let bridge = BridgeValues::for_host(tauri::VERSION);
    let bridge_script = bridge.script();
    debug!("Bridge values: {}", bridge.as_json());

    let navigation_supervisor = Arc::clone(&supervisor);
    let new_window_supervisor = Arc::clone(&supervisor);
    let page_supervisor = supervisor;

    let window = WebviewWindowBuilder::new(
        app,
        MAIN_WINDOW_LABEL,
        WebviewUrl::App(LOADING_PAGE.into()),
    )
    .title(&config.title)
    .inner_size(f64::from(config.width), f64::from(config.height))
    .min_inner_size(f64::from(config.min_width), f64::from(config.min_height))
    .background_color(Color(red, green, blue, OPAQUE))
    .visible(false)
    .initialization_script(&bridge_script)
    .on_navigation(move |url| navigation_supervisor.route_navigation(url))
    .on_new_window(move |url, _features| {
        new_window_supervisor.route_new_window(&url);
        NewWindowResponse::Deny
    })
    .on_page_load(move |_window, payload| {
        if matches!(payload.event(), PageLoadEvent::Finished) {
            page_supervisor.window_ready();
        }
    })
    .build()
    .map_err(|e| LutherError::Window {
        message: format!("Failed to create window '{MAIN_WINDOW_LABEL}': {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(DesktopWindow::new(window))
}
