use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of the current time for token issuance and verification.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of token identifiers (`jti`).
pub trait TokenIdSource: Send + Sync {
    fn next_id(&self) -> Uuid;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_timestamp(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// UUID v4 backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenIds;

impl TokenIdSource for RandomTokenIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic ids counting up from a starting value.
#[derive(Debug, Default)]
pub struct SequentialTokenIds {
    next: AtomicU64,
}

impl SequentialTokenIds {
    pub fn starting_at(start: u64) -> Self {
        Self { next: AtomicU64::new(start) }
    }
}

impl TokenIdSource for SequentialTokenIds {
    fn next_id(&self) -> Uuid {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        Uuid::from_u64_pair(0, value)
    }
}
