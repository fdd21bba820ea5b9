mod error;
mod readiness;
mod server;
mod supervisor;
