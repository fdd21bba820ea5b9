use launcher_core::error::CoreError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors raised while bringing up the desktop shell.
///
/// Returned from Tauri's setup hook, which aborts the launch and reports them.
#[derive(Debug, Error)]
pub enum LutherError {
    /// Error from this App
    #[error("Luther Error: {message} {location}")]
    Luther {
        message: String,
        location: ErrorLocation,
    },

    /// Error from launcher-core (config, supervisor construction)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
        #[source]
        source: CoreError,
    },

    /// The launcher window could not be created
    #[error("Window Error: {message} {location}")]
    Window {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for LutherError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        Self::Core {
            message: source.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source,
        }
    }
}
