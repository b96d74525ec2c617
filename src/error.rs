use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ReplyBody;

// Display text is the user-facing reply, the only thing sent back to the caller
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Too many requests. Please wait a moment.")]
    RateLimited,

    // no usable message
    #[error("No query received.")]
    InvalidInput,

    #[error("Service temporarily unavailable.")]
    ServiceUnavailable,

    // failed or timed out
    #[error("Request failed. Please try again.")]
    UpstreamError,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::InvalidInput => StatusCode::BAD_REQUEST,
            GatewayError::ServiceUnavailable | GatewayError::UpstreamError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ReplyBody {
            reply: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
