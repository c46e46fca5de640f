//! Billing configuration

use quillia_types::LimitMode;

/// Billing service configuration
///
/// The daily-limit regime is injected here rather than hardcoded so both
/// regimes stay testable without code changes. Credit costs and recharge
/// amounts are product constants and live on the types, not here.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Which pool daily quotas draw from
    pub limit_mode: LimitMode,
    /// Days of daily-usage history kept before cleanup
    pub usage_retention_days: i64,
}

impl BillingConfig {
    /// Create a config with the default shared-pool regime
    pub fn new() -> Self {
        Self {
            limit_mode: LimitMode::Shared,
            usage_retention_days: 30,
        }
    }

    /// Set the daily-limit regime
    pub fn with_limit_mode(mut self, mode: LimitMode) -> Self {
        self.limit_mode = mode;
        self
    }

    /// Set the daily-usage retention window
    pub fn with_usage_retention_days(mut self, days: i64) -> Self {
        self.usage_retention_days = days;
        self
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self::new()
    }
}
