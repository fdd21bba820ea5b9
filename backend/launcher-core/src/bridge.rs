//! Initialization script injected into every page the launcher window loads.
//!
//! The script runs before page scripts. It publishes a frozen
//! `window.lutherDesktop` object holding [`BridgeValues`] and, once the DOM is
//! parsed, appends a style block that hides Streamlit chrome and adapts the
//! page to a desktop window.

use serde::Serialize;
use serde_json::{Value, json};

/// Global the values are published under.
pub const BRIDGE_NAMESPACE: &str = "lutherDesktop";

const NAMESPACE_PLACEHOLDER: &str = "__NAMESPACE__";
const VALUES_PLACEHOLDER: &str = "__VALUES__";
const STYLES_PLACEHOLDER: &str = "__STYLES__";

pub const DESKTOP_STYLES: &str = r#"
#MainMenu { display: none !important; }
footer { display: none !important; }
header { display: none !important; }
.stDeployButton { display: none !important; }

.main .block-container { padding: 0 !important; }

.terminal-header {
  -webkit-app-region: drag;
  app-region: drag;
  user-select: none;
}

button, input, select {
  -webkit-app-region: no-drag;
  app-region: no-drag;
}

::-webkit-scrollbar { width: 8px; }
::-webkit-scrollbar-track { background: #1C1C1C; }
::-webkit-scrollbar-thumb { background: #FF6D00; border-radius: 4px; }
::-webkit-scrollbar-thumb:hover { background: #FF8A50; }
"#;

const SCRIPT_TEMPLATE: &str = r#"(function () {
  "use strict";
  if (window !== window.top) {
    return;
  }

  const values = Object.freeze(__VALUES__);
  Object.defineProperty(window, "__NAMESPACE__", {
    value: values,
    writable: false,
    configurable: false,
    enumerable: true
  });

  const injectStyles = function () {
    const style = document.createElement("style");
    style.textContent = __STYLES__;
    (document.head || document.documentElement).appendChild(style);
  };

  if (document.readyState === "loading") {
    window.addEventListener("DOMContentLoaded", injectStyles, { once: true });
  } else {
    injectStyles();
  }
})();
"#;

/// The only host values loaded content can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeValues {
    /// Host OS identifier (`linux`, `macos`, `windows`, ...).
    pub platform: String,
    /// Version of the host runtime.
    pub version: String,
}

impl BridgeValues {
    pub fn new(platform: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            version: version.into(),
        }
    }

    /// Values for the current OS.
    pub fn for_host(runtime_version: impl Into<String>) -> Self {
        Self::new(std::env::consts::OS, runtime_version)
    }

    pub fn as_json(&self) -> Value {
        json!({
            "platform": self.platform,
            "version": self.version,
        })
    }

    /// Complete initialization script for the webview.
    pub fn script(&self) -> String {
        SCRIPT_TEMPLATE
            .replace(NAMESPACE_PLACEHOLDER, BRIDGE_NAMESPACE)
            .replace(VALUES_PLACEHOLDER, &self.as_json().to_string())
            .replace(
                STYLES_PLACEHOLDER,
                &Value::String(DESKTOP_STYLES.to_string()).to_string(),
            )
    }
}
