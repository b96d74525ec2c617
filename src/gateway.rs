use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::error::GatewayError;
use crate::metrics::{
    COMPLETION_LATENCY, RATE_LIMIT_ORIGINS, RATE_LIMITED_TOTAL, UPSTREAM_ERRORS_TOTAL,
};
use crate::models::CompletionRequest;
use crate::provider::{CompletionProvider, ProviderError};
use crate::rate_limit::{Clock, RateLimitStore, origin_fingerprint};

pub const MAX_MESSAGE_CHARS: usize = 500;
pub const MAX_OUTPUT_TOKENS: u32 = 250;
pub const TEMPERATURE: f32 = 0.7;
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(20);
pub const NO_RESPONSE_FALLBACK: &str = "No response generated.";

pub struct Gateway {
    store: Arc<dyn RateLimitStore>,
    provider: Arc<dyn CompletionProvider>,
    clock: Arc<dyn Clock>,
    system_instruction: Arc<str>,
    upstream_timeout: Duration,
}

impl Gateway {
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        provider: Arc<dyn CompletionProvider>,
        clock: Arc<dyn Clock>,
        system_instruction: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            provider,
            clock,
            system_instruction: system_instruction.into(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    // raw_body is the request body as received, expected to be {"message": string}
    pub async fn handle_request(
        &self,
        origin_key: &str,
        raw_body: &[u8],
    ) -> Result<String, GatewayError> {
        // counted whether or not the rest succeeds
        let allowed = self.store.try_consume(origin_key, self.clock.now());
        RATE_LIMIT_ORIGINS.set(self.store.tracked_origins() as f64);
        if !allowed {
            RATE_LIMITED_TOTAL.inc();
            debug!(origin = %origin_fingerprint(origin_key), "Rate limited");
            return Err(GatewayError::RateLimited);
        }

        let message = parse_message(raw_body).ok_or(GatewayError::InvalidInput)?;

        // no key -> never touch the network
        if !self.provider.has_credential() {
            error!("Completion provider credential is not configured");
            return Err(GatewayError::ServiceUnavailable);
        }

        let request = CompletionRequest {
            system_instruction: Arc::clone(&self.system_instruction),
            message,
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        };

        let start_time = Instant::now();
        let result = tokio::time::timeout(self.upstream_timeout, self.provider.complete(&request))
            .await
            .unwrap_or(Err(ProviderError::Timeout));
        COMPLETION_LATENCY.observe(start_time.elapsed().as_secs_f64());

        match result {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Ok(NO_RESPONSE_FALLBACK.to_string()),
            Err(e) => {
                UPSTREAM_ERRORS_TOTAL.inc();
                match e {
                    ProviderError::Status(status) => {
                        warn!(kind = e.kind(), status, "Completion provider call failed")
                    }
                    _ => warn!(kind = e.kind(), "Completion provider call failed"),
                }
                Err(GatewayError::UpstreamError)
            }
        }
    }
}

// Pull a usable `message` out of the body, truncated to MAX_MESSAGE_CHARS.
// Anything that isn't a non-empty string is rejected.
pub fn parse_message(raw_body: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(raw_body).ok()?;
    let message = body.get("message")?.as_str()?;
    if message.is_empty() {
        return None;
    }
    Some(message.chars().take(MAX_MESSAGE_CHARS).collect())
}
