//! PostgreSQL repository implementations

mod character;
mod daily_usage;
mod entry;
mod memory;
mod progression;
mod purchase;
mod user;

pub use character::PgCharacterRepository;
pub use daily_usage::PgDailyUsageRepository;
pub use entry::PgEntryRepository;
pub use memory::PgCharacterMemoryRepository;
pub use progression::PgStatProgressionRepository;
pub use purchase::PgCreditPurchaseRepository;
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub characters: PgCharacterRepository,
    pub entries: PgEntryRepository,
    pub daily_usage: PgDailyUsageRepository,
    pub memory: PgCharacterMemoryRepository,
    pub progressions: PgStatProgressionRepository,
    pub purchases: PgCreditPurchaseRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            characters: PgCharacterRepository::new(pool.clone()),
            entries: PgEntryRepository::new(pool.clone()),
            daily_usage: PgDailyUsageRepository::new(pool.clone()),
            memory: PgCharacterMemoryRepository::new(pool.clone()),
            progressions: PgStatProgressionRepository::new(pool.clone()),
            purchases: PgCreditPurchaseRepository::new(pool),
        }
    }
}
