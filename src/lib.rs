pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod relay;
pub mod server;
pub mod types;
