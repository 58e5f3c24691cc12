use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::domain::{Animal, ShelterId};
use super::store::{EntityStore, Filter, StoreError, StoreTx};

/// Hands out shelter identifiers (`SFP-NNN`) in strictly increasing order.
///
/// The counter is the only shared state in the core. Callers claim identifiers inside the
/// store transaction that writes the animal, so commit order follows allocation order, and
/// the store's key uniqueness catches any writer that bypassed this allocator.
#[derive(Debug, Default)]
pub struct ShelterIdAllocator {
    last: AtomicU64,
}

impl ShelterIdAllocator {
    /// Allocator whose first identifier is `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// Seeds the counter from the highest well-formed identifier already stored.
    pub fn seed_from<S: EntityStore>(store: &S) -> Result<Self, StoreError> {
        let highest = store.read(|tx| Self::highest_stored(tx))?;
        debug!(highest, "seeded shelter identifier allocator");
        Ok(Self::starting_after(highest))
    }

    /// Highest well-formed identifier counter visible in `tx`, or 0.
    pub fn highest_stored(tx: &dyn StoreTx) -> Result<u64, StoreError> {
        let animals = tx.list::<Animal>(&Filter::all())?;
        Ok(animals
            .iter()
            .filter_map(|animal| animal.unique_id.counter())
            .max()
            .unwrap_or(0))
    }

    /// Reseeds from `tx` so the next claim lands past every stored identifier.
    pub fn catch_up(&self, tx: &dyn StoreTx) -> Result<u64, StoreError> {
        let highest = Self::highest_stored(tx)?;
        self.last.fetch_max(highest, Ordering::SeqCst);
        Ok(highest)
    }

    /// Claims the next identifier.
    pub fn next(&self) -> ShelterId {
        let claimed = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        ShelterId::from_counter(claimed)
    }

    /// Most recently claimed identifier, if any.
    pub fn last_allocated(&self) -> Option<ShelterId> {
        match self.last.load(Ordering::SeqCst) {
            0 => None,
            last => Some(ShelterId::from_counter(last)),
        }
    }
}
