//! Question caches.
//!
//! Two independent persistent caches sit on top of the
//! [`DurableStore`](crate::store::DurableStore):
//!
//! - [`PoolCache`]: per-(category, difficulty) reservoir of reusable
//!   questions, bounded to [`MAX_POOL_SIZE`] and expiring after
//!   [`POOL_EXPIRY`] without writes. Draws never consume questions.
//!
//! - [`SeenTracker`]: the ids shown to this player recently, across every
//!   pool. This is the actual anti-repetition gate: pool draws exclude them.
//!   The whole record resets after [`SEEN_TTL`] without a game.
//!
//! Timestamps are wall-clock milliseconds since the Unix epoch, since both
//! records outlive the process.

pub mod pool;
pub mod seen;

pub use pool::{MAX_POOL_SIZE, POOL_EXPIRY, PoolCache, PoolEntry, REFRESH_THRESHOLD};
pub use seen::{MAX_SEEN_IDS, SEEN_TTL, SeenRecord, SeenTracker};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix milliseconds.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Whether a record stamped at `stamped_at` is older than `ttl` at `now`.
pub(crate) fn is_older_than(stamped_at: u64, now: u64, ttl: Duration) -> bool {
    now.saturating_sub(stamped_at) > ttl.as_millis() as u64
}
