//! Character access gating
//!
//! Decides which of a user's characters are currently interactable.
//! Premium users reach all of them; free users exactly one. The fallback
//! from a missing active character to the oldest-created one is a
//! read-time computation only: nothing here ever writes
//! `active_character_id` on the user's behalf.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use quillia_db::{CharacterRepository, CharacterRow, UserRepository};
use quillia_types::{CharacterId, UserId};

use crate::{credits::SweepFailure, entitlement::has_premium_access, BillingError};

/// The set of characters a user may currently interact with
#[derive(Debug, Clone)]
pub struct CharacterAccess {
    /// Characters the user can open, oldest created first
    pub accessible: Vec<CharacterRow>,
    /// Characters visible but locked behind a tribute
    pub locked: Vec<CharacterRow>,
    /// How many characters the current entitlement allows
    pub total_allowed: usize,
    /// How many characters the user owns
    pub total_owned: usize,
}

impl CharacterAccess {
    /// Whether the given character is currently accessible
    pub fn can_access(&self, character_id: CharacterId) -> bool {
        self.accessible.iter().any(|c| c.id == character_id.0)
    }
}

/// Report from the character access migration sweep
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    /// Users examined
    pub processed: usize,
    /// Users whose slot capacity was adjusted
    pub slots_adjusted: usize,
    /// Users who had an active character assigned
    pub actives_assigned: usize,
    /// Per-user failures
    pub failures: Vec<SweepFailure>,
}

/// Report from the expired subscription cleanup sweep
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Users downgraded to the free shape
    pub downgraded: usize,
    /// Per-user failures
    pub failures: Vec<SweepFailure>,
}

/// Character access gate over user and character repositories
#[derive(Clone)]
pub struct CharacterAccessGate<U: UserRepository, C: CharacterRepository> {
    users: Arc<U>,
    characters: Arc<C>,
}

impl<U: UserRepository, C: CharacterRepository> CharacterAccessGate<U, C> {
    /// Create a new character access gate
    pub fn new(users: Arc<U>, characters: Arc<C>) -> Self {
        Self { users, characters }
    }

    /// Compute which characters the user may currently interact with
    pub async fn character_access(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<CharacterAccess, BillingError> {
        let user = self
            .users
            .find_by_id(user_id.0)
            .await?
            .ok_or(BillingError::UserNotFound)?;

        // Oldest first: creation order breaks ties for the free slot
        let owned = self.characters.find_by_user(user_id.0).await?;
        let total_owned = owned.len();

        if has_premium_access(&user, now) {
            return Ok(CharacterAccess {
                total_allowed: total_owned,
                total_owned,
                accessible: owned,
                locked: Vec::new(),
            });
        }

        let accessible_idx = resolve_accessible_index(&owned, user.active_character_id);
        let mut accessible = Vec::new();
        let mut locked = Vec::new();
        for (idx, character) in owned.into_iter().enumerate() {
            if Some(idx) == accessible_idx {
                accessible.push(character);
            } else {
                locked.push(character);
            }
        }

        Ok(CharacterAccess {
            accessible,
            locked,
            total_allowed: 1,
            total_owned,
        })
    }

    /// The character the user is currently working with
    ///
    /// Falls back to the first accessible character when the stored
    /// choice is locked or gone, without persisting the fallback.
    pub async fn active_character(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<CharacterRow>, BillingError> {
        let user = self
            .users
            .find_by_id(user_id.0)
            .await?
            .ok_or(BillingError::UserNotFound)?;

        let access = self.character_access(user_id, now).await?;
        if let Some(active_id) = user.active_character_id {
            if let Some(active) = access.accessible.iter().find(|c| c.id == active_id) {
                return Ok(Some(active.clone()));
            }
        }
        Ok(access.accessible.first().cloned())
    }

    /// Administrative sweep: align slot capacity with entitlements
    ///
    /// Shrinks `character_slots` to what the current entitlement allows
    /// and assigns the oldest character as active where none is set.
    /// Characters beyond the allowance are never deleted, only hidden by
    /// the gate. Idempotent.
    #[instrument(skip(self))]
    pub async fn migrate_character_access(
        &self,
        now: DateTime<Utc>,
    ) -> Result<MigrationReport, BillingError> {
        let ids = self.users.list_ids().await?;
        let mut report = MigrationReport::default();

        for id in ids {
            report.processed += 1;
            match self.migrate_one(id, now).await {
                Ok((slots_adjusted, active_assigned)) => {
                    if slots_adjusted {
                        report.slots_adjusted += 1;
                    }
                    if active_assigned {
                        report.actives_assigned += 1;
                    }
                }
                Err(err) => {
                    warn!(user_id = %id, error = %err, "character access migration failed for user");
                    report.failures.push(SweepFailure {
                        user_id: UserId(id),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            processed = report.processed,
            slots_adjusted = report.slots_adjusted,
            actives_assigned = report.actives_assigned,
            failures = report.failures.len(),
            "character access migration complete"
        );
        Ok(report)
    }

    async fn migrate_one(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(bool, bool), BillingError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(BillingError::UserNotFound)?;
        let owned = self.characters.find_by_user(user_id).await?;

        let allowed = if has_premium_access(&user, now) {
            owned.len().max(1)
        } else {
            1
        };

        let mut slots_adjusted = false;
        if user.character_slots > allowed as i32 {
            self.users.set_character_slots(user_id, allowed as i32).await?;
            slots_adjusted = true;
        }

        let mut active_assigned = false;
        if user.active_character_id.is_none() {
            if let Some(oldest) = owned.first() {
                self.users
                    .set_active_character(user_id, Some(oldest.id))
                    .await?;
                active_assigned = true;
            }
        }

        Ok((slots_adjusted, active_assigned))
    }

    /// Administrative sweep: downgrade canceled subscriptions whose paid
    /// period has elapsed
    ///
    /// The downgrade clears plan/status/expiry and shrinks slots to one,
    /// but never touches `active_character_id`: the previously chosen
    /// character stays the single accessible one.
    #[instrument(skip(self))]
    pub async fn cleanup_expired_subscriptions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<CleanupReport, BillingError> {
        let expired = self.users.find_expired_canceled(now).await?;
        let mut report = CleanupReport::default();

        for user in expired {
            match self.users.downgrade_to_free(user.id).await {
                Ok(()) => {
                    info!(user_id = %user.id, plan = %user.subscription_plan, "downgraded expired subscription");
                    report.downgraded += 1;
                }
                Err(err) => {
                    warn!(user_id = %user.id, error = %err, "expired subscription cleanup failed for user");
                    report.failures.push(SweepFailure {
                        user_id: UserId(user.id),
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

impl<U: UserRepository, C: CharacterRepository> std::fmt::Debug for CharacterAccessGate<U, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterAccessGate").finish()
    }
}

/// Index of the one character a free user may access
///
/// Prefers the stored active character if it still exists among the
/// owned list (oldest first); otherwise the oldest-created character.
/// Pure: the caller decides whether anything is ever persisted.
fn resolve_accessible_index(owned: &[CharacterRow], active_id: Option<Uuid>) -> Option<usize> {
    if owned.is_empty() {
        return None;
    }
    active_id
        .and_then(|id| owned.iter().position(|c| c.id == id))
        .or(Some(0))
}
