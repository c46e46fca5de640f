//! Daily usage counting with timezone-locked resets
//!
//! A user's "day" is their local calendar day in the IANA timezone fixed
//! at signup. Quotas roll over at local midnight, not UTC midnight; the
//! storage key for a local day is its UTC-midnight marker.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::{info, instrument, warn};

use quillia_db::{DailyUsageRepository, UserRepository, UserRow};
use quillia_types::{CharacterId, DailyLimits, DailyTotals, LimitCheck, LimitMode, OutputKind};

use crate::{entitlement::has_premium_access, BillingConfig, BillingError};

/// Resolve an IANA timezone string, falling back to UTC
///
/// The timezone is recorded once at signup; an unparseable value is
/// tolerated rather than blocking every quota check.
pub fn resolve_timezone(timezone: &str) -> Tz {
    timezone.parse().unwrap_or_else(|_| {
        warn!(timezone, "unparseable timezone; falling back to UTC");
        Tz::UTC
    })
}

/// The user's current local calendar date
pub fn user_local_date(timezone: &str, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&resolve_timezone(timezone)).date_naive()
}

/// Canonical storage key for a local calendar date: its UTC midnight
///
/// Stable for repeated calls within the same local day, and rolls over
/// exactly at local midnight.
pub fn date_key(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Storage key for the user's current local day
pub fn user_date_key(timezone: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    date_key(user_local_date(timezone, now))
}

/// When the user's daily quotas next reset
///
/// Display-only countdown: `now` plus whatever remains of the current
/// local day. Gating never consults this.
pub fn next_reset_time(timezone: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&resolve_timezone(timezone));
    let elapsed = local.time().signed_duration_since(NaiveTime::MIN);
    now + (Duration::days(1) - elapsed)
}

/// Daily usage tracker and quota gate
#[derive(Clone)]
pub struct DailyUsageTracker<U: UserRepository, D: DailyUsageRepository> {
    users: Arc<U>,
    usage: Arc<D>,
    config: BillingConfig,
}

impl<U: UserRepository, D: DailyUsageRepository> DailyUsageTracker<U, D> {
    /// Create a new daily usage tracker
    pub fn new(users: Arc<U>, usage: Arc<D>, config: BillingConfig) -> Self {
        Self {
            users,
            usage,
            config,
        }
    }

    /// Record one generation against the user's current local day
    ///
    /// The repository upsert-increment is atomic; concurrent generations
    /// for the same user and day cannot lose a count.
    #[instrument(skip(self, user), fields(user_id = %user.id, kind = %kind))]
    pub async fn record_entry(
        &self,
        user: &UserRow,
        character_id: CharacterId,
        kind: OutputKind,
        now: DateTime<Utc>,
    ) -> Result<(), BillingError> {
        let date = user_date_key(&user.timezone, now);
        self.usage
            .increment(user.id, character_id.0, date, kind)
            .await?;
        Ok(())
    }

    /// Check the applicable daily quota for a prospective generation
    ///
    /// The regime decides the pool: shared pools span all of the user's
    /// characters; the per-character regime scopes premium users to the
    /// target character. Free users always draw from the shared pool.
    pub async fn check_daily_limit(
        &self,
        user: &UserRow,
        character_id: CharacterId,
        kind: OutputKind,
        now: DateTime<Utc>,
    ) -> Result<LimitCheck, BillingError> {
        let premium = has_premium_access(user, now);
        let date = user_date_key(&user.timezone, now);
        let limit = DailyLimits::for_tier(premium, self.config.limit_mode);

        let usage = if premium && self.config.limit_mode == LimitMode::PerCharacter {
            self.usage
                .totals_for_character(user.id, character_id.0, date)
                .await?
        } else {
            self.usage.totals_for_user(user.id, date).await?
        };

        Ok(evaluate_limit(usage, limit, kind))
    }

    /// Totals in the user's shared pool for the current local day
    pub async fn totals_today(
        &self,
        user: &UserRow,
        now: DateTime<Utc>,
    ) -> Result<DailyTotals, BillingError> {
        let date = user_date_key(&user.timezone, now);
        Ok(self.usage.totals_for_user(user.id, date).await?)
    }

    /// Purge usage rows older than the retention window
    ///
    /// Storage hygiene only; current-day checks never read that far back.
    #[instrument(skip(self))]
    pub async fn cleanup_old_daily_usage(&self, now: DateTime<Utc>) -> Result<u64, BillingError> {
        let cutoff = date_key(now.date_naive()) - Duration::days(self.config.usage_retention_days);
        let deleted = self.usage.delete_before(cutoff).await?;
        info!(deleted, "purged old daily usage rows");
        Ok(deleted)
    }
}

impl<U: UserRepository, D: DailyUsageRepository> std::fmt::Debug for DailyUsageTracker<U, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyUsageTracker")
            .field("config", &self.config)
            .finish()
    }
}

/// Compare usage against a limit pool for one generation kind
fn evaluate_limit(usage: DailyTotals, limit: DailyLimits, kind: OutputKind) -> LimitCheck {
    if limit.reached(&usage, kind) {
        LimitCheck {
            allowed: false,
            reason: Some(format!(
                "Daily {} limit of {} reached ({} used today)",
                kind.quota_noun(),
                limit.limit_for(kind),
                usage.count_for(kind),
            )),
            usage,
            limit,
        }
    } else {
        LimitCheck {
            allowed: true,
            reason: None,
            usage,
            limit,
        }
    }
}
