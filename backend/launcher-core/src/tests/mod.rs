mod config;
mod policy;
mod server;
