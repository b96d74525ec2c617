use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

mod completion;
mod health;
mod metrics;

pub use completion::{completion_handler, origin_key};
pub use health::health_handler;
pub use metrics::metrics_handler;

// all routes of the gateway
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/completion", post(completion_handler))
        .route("/api/openai", post(completion_handler)) // path the site already calls
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
