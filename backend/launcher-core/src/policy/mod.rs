//! Decisions about where loaded content may go.
//!
//! Pure functions over [`Url`](url::Url) so they can be checked without a webview.

pub mod certificate;
pub mod links;

pub use links::{LinkAction, LinkPolicy};
