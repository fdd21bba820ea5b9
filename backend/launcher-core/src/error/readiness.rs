use common::ErrorLocation;

use std::error::Error as StdError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ReadinessError {
    #[error("Client Error: {message} {location}")]
    Client {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Server Exited Error: {message} {location}")]
    ServerExited {
        message: String,
        location: ErrorLocation,
    },
}
