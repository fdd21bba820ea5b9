//! Types shared by every crate in the launcher workspace.
//!
//! - **common** (this crate): error location tracking
//! - **launcher-core**: process supervision, readiness and policy logic
//! - **luther**: the Tauri application wiring everything together

pub mod error_location;

pub use error_location::ErrorLocation;

#[cfg(test)]
mod tests;
