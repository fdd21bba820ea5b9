use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SupervisorError {
    #[error("Already Running Error: {message} {location}")]
    AlreadyRunning {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Target Error: {message} {location}")]
    InvalidTarget {
        message: String,
        location: ErrorLocation,
    },
}
