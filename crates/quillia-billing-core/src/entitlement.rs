//! Premium entitlement resolution
//!
//! A pure decision over the user's subscription snapshot. The resolver
//! owns no cache: access decisions may straddle an expiry boundary, so
//! every check re-reads the snapshot it is handed.

use chrono::{DateTime, Utc};
use tracing::warn;

use quillia_db::UserRow;
use quillia_types::SubscriptionStatus;

/// Whether the user currently has premium (tribute) access
///
/// An active status paired with a free plan is an inconsistent record and
/// never grants access. A canceled subscription keeps access until its
/// paid period elapses (`subscription_ends_at`).
pub fn has_premium_access(user: &UserRow, now: DateTime<Utc>) -> bool {
    let plan = user.plan();
    let status = user.status();

    match status {
        SubscriptionStatus::Free => false,
        SubscriptionStatus::Active => {
            if !plan.is_paid() {
                warn!(
                    user_id = %user.id,
                    plan = %user.subscription_plan,
                    "active subscription with non-paid plan; treating as no access"
                );
                return false;
            }
            true
        }
        SubscriptionStatus::Canceled => {
            // Grace period: access persists until the paid period elapses
            plan.is_paid()
                && user
                    .subscription_ends_at
                    .map(|ends_at| ends_at > now)
                    .unwrap_or(false)
        }
    }
}
