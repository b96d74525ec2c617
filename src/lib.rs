pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod rate_limit;
pub mod state;
