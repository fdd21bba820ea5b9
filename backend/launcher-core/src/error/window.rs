use common::ErrorLocation;

use std::error::Error as StdError;

use thiserror::Error as ThisError;

/// Failures reported by a [`WindowHost`](crate::supervisor::WindowHost) implementation.
#[derive(Debug, ThisError)]
pub enum WindowError {
    #[error("Navigation Error: {message} {location}")]
    Navigation {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("Display Error: {message} {location}")]
    Display {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("External Open Error: {message} {location}")]
    ExternalOpen {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}
