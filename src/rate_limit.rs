use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info};

use crate::metrics::RATE_LIMIT_ORIGINS;

// Fixed policy - not configurable per caller
pub const MAX_REQUESTS_PER_WINDOW: u32 = 10;
pub const WINDOW_DURATION: Duration = Duration::from_secs(60);

// Records whose window ended more than this many windows ago get swept
pub const STALE_AFTER_WINDOWS: u32 = 3;

// Rate limit record - tracks requests per origin key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_reset_at: Instant,
}

impl RateLimitRecord {
    // first request of a brand new window
    fn open(now: Instant) -> Self {
        Self {
            count: 1,
            window_reset_at: now + WINDOW_DURATION,
        }
    }
}

// Per-origin fixed-window counters. try_consume must check and increment
// in one step, with no await point in between.
pub trait RateLimitStore: Send + Sync {
    // false when the origin has used up its quota for the current window
    fn try_consume(&self, key: &str, now: Instant) -> bool;

    // returns how many records were removed
    fn sweep_expired(&self, now: Instant) -> usize;

    fn tracked_origins(&self) -> usize;
}

// In-process store, one entry per origin key
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    records: DashMap<String, RateLimitRecord>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: &str) -> Option<RateLimitRecord> {
        self.records.get(key).map(|r| *r)
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn try_consume(&self, key: &str, now: Instant) -> bool {
        match self.records.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(RateLimitRecord::open(now));
                true
            }
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();

                // window over..? replace it, don't mutate the old one
                if now > record.window_reset_at {
                    *record = RateLimitRecord::open(now);
                    return true;
                }

                if record.count >= MAX_REQUESTS_PER_WINDOW {
                    return false;
                }

                record.count += 1;
                true
            }
        }
    }

    fn sweep_expired(&self, now: Instant) -> usize {
        let grace = WINDOW_DURATION * STALE_AFTER_WINDOWS;
        let before = self.records.len();
        self.records
            .retain(|_, record| now.saturating_duration_since(record.window_reset_at) <= grace);
        before.saturating_sub(self.records.len())
    }

    fn tracked_origins(&self) -> usize {
        self.records.len()
    }
}

// Monotonic time source for the limiter
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// Only moves when told to (tests)
pub struct ManualClock {
    start: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

// Short hash of an origin key, so raw addresses never reach the logs
pub fn origin_fingerprint(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}

// Sweeper - runs forever, drops stale records every `every`
pub async fn sweeper(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>, every: Duration) {
    let mut interval = interval(every);

    info!(interval = ?every, "Rate limit sweeper started");

    loop {
        interval.tick().await;

        let removed = store.sweep_expired(clock.now());
        RATE_LIMIT_ORIGINS.set(store.tracked_origins() as f64);

        if removed > 0 {
            debug!(removed, remaining = store.tracked_origins(), "Swept stale rate limit records");
        }
    }
}
