use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("portfolio_completion_requests_total", "Total number of completion requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("portfolio_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_ERRORS_TOTAL: Counter =
        register_counter!("portfolio_upstream_errors_total", "Failed calls to the completion provider").unwrap();
    pub static ref COMPLETION_LATENCY: Histogram = register_histogram!(
        "portfolio_completion_latency_seconds",
        "Completion provider latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ORIGINS: Gauge =
        register_gauge!("portfolio_rate_limit_origins", "Origins currently tracked by the rate limiter").unwrap();
}
