//! Telemetry metric name constants.
//!
//! Centralised metric names for question supply operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `trivia_supply_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `tier`: source that produced a game set: "pool", "prefetch" or "remote"
//! - `outcome`: result of a lookup, e.g. "hit" or "miss"
//! - `status`: outcome of a remote call: "ok" or "error"

/// Game sets produced, per acquisition tier.
///
/// Labels: `tier`.
pub const TIER_TOTAL: &str = "trivia_supply_tier_total";

/// Pool draws.
///
/// Labels: `outcome` ("hit" | "miss").
pub const POOL_DRAWS_TOTAL: &str = "trivia_supply_pool_draws_total";

/// Direct remote generation requests issued by the orchestrator.
///
/// Labels: `status` ("ok" | "error").
pub const REMOTE_REQUESTS_TOTAL: &str = "trivia_supply_remote_requests_total";

/// Remote request duration in seconds.
pub const REMOTE_DURATION_SECONDS: &str = "trivia_supply_remote_duration_seconds";

/// Prefetch lifecycle events.
///
/// Labels: `outcome` ("started" | "coalesced" | "ready" | "failed" | "consumed" | "rejected").
pub const PREFETCH_TOTAL: &str = "trivia_supply_prefetch_total";

/// Total retry attempts (not counting the initial request).
pub const RETRIES_TOTAL: &str = "trivia_supply_retries_total";
