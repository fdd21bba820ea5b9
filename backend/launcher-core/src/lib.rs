pub mod bridge;
pub mod config;
pub mod error;
pub mod policy;
pub mod readiness;
pub mod server;
pub mod supervisor;

#[cfg(test)]
mod tests;

pub const APP_NAME: &str = "Luther Terminal";
pub const STREAMLIT_MODULE: &str = "streamlit";
pub const STREAMLIT_SCRIPT: &str = "main.py";
pub const SERVER_HOSTNAME: &str = "localhost";
pub const SERVER_PORT: u16 = 8501;
