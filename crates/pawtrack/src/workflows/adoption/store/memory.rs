use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{EntityKey, EntityKind, EntityStore, Filter, Record, StoreError, StoreTx};

#[derive(Debug, Clone, Default)]
struct Tables {
    records: BTreeMap<EntityKind, BTreeMap<EntityKey, Record>>,
    serials: BTreeMap<EntityKind, u64>,
}

impl StoreTx for Tables {
    fn find(&self, kind: EntityKind, key: &EntityKey) -> Result<Option<Record>, StoreError> {
        Ok(self
            .records
            .get(&kind)
            .and_then(|table| table.get(key))
            .cloned())
    }

    fn find_all(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .records
            .get(&kind)
            .map(|table| {
                table
                    .values()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn next_serial(&mut self, kind: EntityKind) -> Result<u64, StoreError> {
        let serial = self.serials.entry(kind).or_insert(0);
        *serial += 1;
        Ok(*serial)
    }

    fn create(&mut self, record: Record) -> Result<Record, StoreError> {
        let kind = record.kind();
        let key = record.key();
        let table = self.records.entry(kind).or_default();
        if table.contains_key(&key) {
            return Err(StoreError::Conflict { kind, key });
        }
        if let EntityKey::Serial(serial) = key {
            let next = self.serials.entry(kind).or_insert(0);
            *next = (*next).max(serial);
        }
        table.insert(key, record.clone());
        Ok(record)
    }

    fn update(&mut self, record: Record) -> Result<Record, StoreError> {
        let kind = record.kind();
        let key = record.key();
        match self
            .records
            .get_mut(&kind)
            .and_then(|table| table.get_mut(&key))
        {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound { kind, key }),
        }
    }

    fn delete(&mut self, kind: EntityKind, key: &EntityKey) -> Result<Record, StoreError> {
        self.records
            .get_mut(&kind)
            .and_then(|table| table.remove(key))
            .ok_or_else(|| StoreError::NotFound {
                kind,
                key: key.clone(),
            })
    }
}

/// Process-local store serializing every unit of work behind one lock.
///
/// A transaction runs against a scratch copy that replaces the live tables only when the
/// closure succeeds, so failed units leave nothing behind.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of `kind` currently committed.
    pub fn count(&self, kind: EntityKind) -> Result<usize, StoreError> {
        let guard = self.lock()?;
        Ok(guard.records.get(&kind).map(BTreeMap::len).unwrap_or(0))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl EntityStore for MemoryStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut guard = self.lock()?;
        let mut scratch = guard.clone();
        let value = work(&mut scratch)?;
        *guard = scratch;
        Ok(value)
    }

    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        let guard = self.lock()?;
        work(&*guard)
    }
}
