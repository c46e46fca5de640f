//! Credit (ink vial) ledger
//!
//! Tracks the per-user vial balance, debited per generation and credited
//! by purchases or the daily free recharge. Affordability is re-checked
//! at deduction time through an atomic conditional decrement, so a check
//! that passed against a stale balance can never overdraw.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use quillia_db::{CreateCreditPurchase, CreditPurchaseRepository, UserRepository};
use quillia_types::{
    AffordabilityCheck, DeductionOutcome, OutputKind, RechargeOutcome, UserId,
    DAILY_RECHARGE_VIALS, STARTER_KIT_WINDOW_DAYS,
};

use crate::BillingError;

/// Synthetic package name for the daily free recharge
pub const DAILY_RECHARGE_PACKAGE: &str = "daily-recharge";

/// Synthetic package name for a character slot purchase
pub const CHARACTER_SLOT_PACKAGE: &str = "character-slot";

/// Outcome of a recharge sweep over all users
#[derive(Debug, Clone, Default)]
pub struct RechargeSweepReport {
    /// Users examined
    pub processed: usize,
    /// Users actually recharged
    pub recharged: usize,
    /// Per-user failures; one user's failure never aborts the sweep
    pub failures: Vec<SweepFailure>,
}

/// One failed item in an administrative sweep
#[derive(Debug, Clone)]
pub struct SweepFailure {
    /// User the failure applies to
    pub user_id: UserId,
    /// What went wrong
    pub error: String,
}

/// Credit ledger over user and purchase repositories
#[derive(Clone)]
pub struct CreditLedger<U: UserRepository, P: CreditPurchaseRepository> {
    users: Arc<U>,
    purchases: Arc<P>,
}

impl<U: UserRepository, P: CreditPurchaseRepository> CreditLedger<U, P> {
    /// Create a new credit ledger
    pub fn new(users: Arc<U>, purchases: Arc<P>) -> Self {
        Self { users, purchases }
    }

    /// Fixed vial cost of a generation kind
    pub const fn cost_for_output(kind: OutputKind) -> i64 {
        kind.cost()
    }

    /// Read-only affordability check
    ///
    /// Advisory only: the balance may move before a later deduction,
    /// which re-checks atomically.
    pub async fn can_afford_entry(
        &self,
        user_id: UserId,
        kind: OutputKind,
    ) -> Result<AffordabilityCheck, BillingError> {
        let user = self
            .users
            .find_by_id(user_id.0)
            .await?
            .ok_or(BillingError::UserNotFound)?;

        Ok(AffordabilityCheck::evaluate(user.credits, kind.cost()))
    }

    /// Deduct the cost of a generation
    ///
    /// The balance comparison and decrement happen in one atomic
    /// repository operation; an insufficient balance at write time is a
    /// reported outcome, never a partial deduction.
    #[instrument(skip(self), fields(user_id = %user_id, kind = %kind))]
    pub async fn deduct_credits(
        &self,
        user_id: UserId,
        kind: OutputKind,
    ) -> Result<DeductionOutcome, BillingError> {
        let cost = kind.cost();

        match self.users.try_deduct_credits(user_id.0, cost).await? {
            Some(remaining) => Ok(DeductionOutcome {
                success: true,
                remaining_credits: remaining,
                reason: None,
            }),
            None => {
                let user = self
                    .users
                    .find_by_id(user_id.0)
                    .await?
                    .ok_or(BillingError::UserNotFound)?;
                Ok(DeductionOutcome {
                    success: false,
                    remaining_credits: user.credits,
                    reason: Some(format!(
                        "Insufficient ink vials: {} available, {cost} required",
                        user.credits
                    )),
                })
            }
        }
    }

    /// Credit purchased vials and record the purchase audit row
    ///
    /// Call at most once per confirmed payment; duplicate-payment
    /// detection belongs to the payment webhook layer.
    #[instrument(skip(self, metadata), fields(user_id = %user_id, package = package_name))]
    pub async fn add_credits(
        &self,
        user_id: UserId,
        amount: i64,
        package_name: &str,
        transaction_id: Option<String>,
        price_cents: i64,
        metadata: Option<serde_json::Value>,
    ) -> Result<i64, BillingError> {
        // The audit row goes first: a duplicate transaction trips its
        // unique index before the balance moves
        self.purchases
            .record(CreateCreditPurchase {
                id: Uuid::new_v4(),
                user_id: user_id.0,
                package_name: package_name.to_string(),
                ink_vials: amount,
                price_cents,
                transaction_id,
                metadata,
            })
            .await?;

        let new_balance = self.users.add_credits(user_id.0, amount).await?;

        info!(amount, new_balance, "credited ink vials");
        Ok(new_balance)
    }

    /// Grant the daily free recharge if 24 hours have elapsed
    ///
    /// Eligibility is measured from the later of the last recharge and
    /// account creation. Ineligible calls are a successful no-op.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn process_daily_recharge(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<RechargeOutcome, BillingError> {
        let user = self
            .users
            .find_by_id(user_id.0)
            .await?
            .ok_or(BillingError::UserNotFound)?;

        let anchor = user
            .last_daily_recharge
            .map_or(user.created_at, |last| last.max(user.created_at));

        if now - anchor < Duration::hours(24) {
            return Ok(RechargeOutcome {
                recharged: false,
                new_balance: user.credits,
            });
        }

        let new_balance = self.users.add_credits(user_id.0, DAILY_RECHARGE_VIALS).await?;
        self.users.set_last_daily_recharge(user_id.0, now).await?;
        self.purchases
            .record(CreateCreditPurchase {
                id: Uuid::new_v4(),
                user_id: user_id.0,
                package_name: DAILY_RECHARGE_PACKAGE.to_string(),
                ink_vials: DAILY_RECHARGE_VIALS,
                price_cents: 0,
                transaction_id: None,
                metadata: None,
            })
            .await?;

        Ok(RechargeOutcome {
            recharged: true,
            new_balance,
        })
    }

    /// Run the daily recharge over every user
    ///
    /// Each user is processed independently; a failure is recorded in
    /// the report and the sweep continues.
    #[instrument(skip(self))]
    pub async fn process_daily_recharge_for_all_users(
        &self,
        now: DateTime<Utc>,
    ) -> Result<RechargeSweepReport, BillingError> {
        let ids = self.users.list_ids().await?;
        let mut report = RechargeSweepReport::default();

        for id in ids {
            report.processed += 1;
            match self.process_daily_recharge(UserId(id), now).await {
                Ok(outcome) if outcome.recharged => report.recharged += 1,
                Ok(_) => {}
                Err(err) => {
                    warn!(user_id = %id, error = %err, "daily recharge failed for user");
                    report.failures.push(SweepFailure {
                        user_id: UserId(id),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.processed,
            recharged = report.recharged,
            failures = report.failures.len(),
            "daily recharge sweep complete"
        );
        Ok(report)
    }

    /// Whether the user may still buy the starter kit
    pub async fn can_purchase_starter_kit(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, BillingError> {
        let user = self
            .users
            .find_by_id(user_id.0)
            .await?
            .ok_or(BillingError::UserNotFound)?;

        Ok(!user.has_purchased_starter_kit
            && now - user.created_at <= Duration::days(STARTER_KIT_WINDOW_DAYS))
    }

    /// Purchase an extra character slot
    ///
    /// Returns the new slot capacity.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn add_character_slot(
        &self,
        user_id: UserId,
        transaction_id: Option<String>,
        price_cents: i64,
    ) -> Result<i32, BillingError> {
        self.purchases
            .record(CreateCreditPurchase {
                id: Uuid::new_v4(),
                user_id: user_id.0,
                package_name: CHARACTER_SLOT_PACKAGE.to_string(),
                ink_vials: 0,
                price_cents,
                transaction_id,
                metadata: None,
            })
            .await?;

        let slots = self.users.increment_character_slots(user_id.0).await?;

        info!(slots, "character slot purchased");
        Ok(slots)
    }

    /// Look up a purchase by payment transaction, for webhook callers
    /// guarding against double delivery
    pub async fn purchase_for_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<quillia_db::CreditPurchaseRow>, BillingError> {
        Ok(self.purchases.find_by_transaction_id(transaction_id).await?)
    }
}

impl<U: UserRepository, P: CreditPurchaseRepository> std::fmt::Debug for CreditLedger<U, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditLedger").finish()
    }
}
