//! Quillia Billing Core - Entitlement and quota business logic
//!
//! Premium entitlement resolution, the ink vial ledger, timezone-locked
//! daily usage limits, character access gating, and the administrative
//! sweeps that keep them consistent.
//!
//! # Example
//!
//! ```rust,ignore
//! use quillia_billing_core::{BillingConfig, CreditLedger, DailyUsageTracker};
//! use quillia_types::{LimitMode, OutputKind};
//!
//! let config = BillingConfig::new().with_limit_mode(LimitMode::Shared);
//! let ledger = CreditLedger::new(users.clone(), purchases);
//! let tracker = DailyUsageTracker::new(users, daily_usage, config);
//!
//! let check = ledger.can_afford_entry(user_id, OutputKind::Text).await?;
//! ```

pub mod access;
pub mod config;
pub mod credits;
pub mod daily_usage;
pub mod entitlement;
pub mod error;

pub use access::{CharacterAccess, CharacterAccessGate, CleanupReport, MigrationReport};
pub use config::BillingConfig;
pub use credits::{
    CreditLedger, RechargeSweepReport, SweepFailure, CHARACTER_SLOT_PACKAGE,
    DAILY_RECHARGE_PACKAGE,
};
pub use daily_usage::{
    date_key, next_reset_time, resolve_timezone, user_date_key, user_local_date, DailyUsageTracker,
};
pub use entitlement::has_premium_access;
pub use error::BillingError;
