use url::Url;

/// Schemes handed to the user's default browser or mail client.
const EXTERNAL_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Schemes and hosts the webview uses for the bundled loading page.
const APP_SCHEME: &str = "tauri";
const APP_HOST: &str = "tauri.localhost";
const BLANK_PAGE: &str = "about:blank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Load inside the launcher window.
    Stay,
    /// Cancel and open in the system browser.
    OpenExternal,
    /// Cancel silently.
    Block,
}

/// Routes navigations and window-open requests coming from loaded content.
#[derive(Debug, Clone)]
pub struct LinkPolicy {
    server: Url,
}

impl LinkPolicy {
    pub fn new(server: Url) -> Self {
        Self { server }
    }

    /// A page asked for a new window (`window.open`, `target="_blank"`).
    ///
    /// New windows are never created; browsable targets go to the system browser.
    pub fn for_new_window(&self, target: &Url) -> LinkAction {
        if is_external_scheme(target) {
            LinkAction::OpenExternal
        } else {
            LinkAction::Block
        }
    }

    /// The window is about to navigate to `target`.
    pub fn for_navigation(&self, target: &Url) -> LinkAction {
        if target.origin() == self.server.origin() || is_app_content(target) {
            LinkAction::Stay
        } else if is_external_scheme(target) {
            LinkAction::OpenExternal
        } else {
            LinkAction::Block
        }
    }
}

fn is_external_scheme(url: &Url) -> bool {
    EXTERNAL_SCHEMES.contains(&url.scheme())
}

fn is_app_content(url: &Url) -> bool {
    url.scheme() == APP_SCHEME || url.host_str() == Some(APP_HOST) || url.as_str() == BLANK_PAGE
}
