//! Tunable thresholds for netting and badge evaluation.
//!
//! Every threshold the algorithms depend on lives here instead of being a
//! module constant, so tests (and deployments) can vary them.

use chrono::Duration;

/// Configuration injected into the [`Engine`](crate::Engine) at build time.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Balances and planned transfers with an absolute value at or below
    /// this many minor units are treated as settled and never materialized.
    pub netting_epsilon_minor: i64,
    /// A transfer completed within this much of its reference time awards
    /// the fast-settler badge.
    pub fast_settle_within: Duration,
    /// A transfer completed later than this after its reference time awards
    /// the slow-settler badge.
    pub slow_settle_after: Duration,
    /// Trailing window scanned by the weekly ranking badges.
    pub ranking_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            netting_epsilon_minor: 1,
            fast_settle_within: Duration::minutes(5),
            slow_settle_after: Duration::hours(48),
            ranking_window: Duration::days(7),
        }
    }
}
