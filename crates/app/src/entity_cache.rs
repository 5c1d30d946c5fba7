//! Entity cache: one last-known reading per tracked entity.
//!
//! The set of entries is fixed at construction: entries are replaced in place,
//! never added or removed. Each replacement happens under a write lock, so a
//! reader sees either the old reading or the new one, never a mix.
//!
//! Writing goes through a [`CacheWriter`], of which exactly one exists per
//! cache; the poller owns it. Readers hold cloneable [`EntityCache`] handles.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hubpanel_domain::entity::EntityReading;
use hubpanel_domain::error::{FailureKind, NotFoundError};
use hubpanel_domain::time::{Timestamp, now};

/// Point-in-time copy of the whole cache, ordered by entity id.
pub type CacheSnapshot = BTreeMap<String, EntityReading>;

type Entries = Arc<RwLock<HashMap<String, EntityReading>>>;

/// Read handle to the cache. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EntityCache {
    entries: Entries,
}

/// The single write handle to a cache. Not cloneable.
#[derive(Debug)]
pub struct CacheWriter {
    entries: Entries,
}

impl EntityCache {
    /// Create a cache with one not-ok entry per id, plus its writer.
    ///
    /// Duplicate ids collapse into one entry.
    #[must_use]
    pub fn new<I, S>(ids: I) -> (Self, CacheWriter)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let at = now();
        let map: HashMap<_, _> = ids
            .into_iter()
            .map(Into::into)
            .map(|id: String| {
                let reading = EntityReading::failed(id.clone(), FailureKind::Unconfigured, at);
                (id, reading)
            })
            .collect();
        let entries = Arc::new(RwLock::new(map));
        let writer = CacheWriter {
            entries: Arc::clone(&entries),
        };
        (Self { entries }, writer)
    }

    /// Current reading for `entity_id`, or `None` if it is not tracked.
    #[must_use]
    pub fn snapshot(&self, entity_id: &str) -> Option<EntityReading> {
        read(&self.entries).get(entity_id).cloned()
    }

    /// Consistent copy of every entry.
    #[must_use]
    pub fn snapshot_all(&self) -> CacheSnapshot {
        snapshot_all(&self.entries)
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        read(&self.entries).is_empty()
    }
}

impl CacheWriter {
    /// Replace the reading for `reading.entity_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if the entity is not tracked; the cache is
    /// left unchanged.
    pub fn update(&self, reading: EntityReading) -> Result<(), NotFoundError> {
        let mut entries = write(&self.entries);
        match entries.get_mut(&reading.entity_id) {
            Some(slot) => {
                *slot = reading;
                Ok(())
            }
            None => Err(NotFoundError {
                entity: "Entity",
                id: reading.entity_id,
            }),
        }
    }

    /// Mark every entry as failed with `kind`, clearing values and units.
    pub fn mark_all_failed(&self, kind: FailureKind, at: Timestamp) {
        let mut entries = write(&self.entries);
        for (id, slot) in entries.iter_mut() {
            *slot = EntityReading::failed(id.clone(), kind, at);
        }
    }

    /// Ids of every tracked entity, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = read(&self.entries).keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Consistent copy of every entry.
    #[must_use]
    pub fn snapshot_all(&self) -> CacheSnapshot {
        snapshot_all(&self.entries)
    }
}

// A panic while holding the lock cannot leave a half-written reading behind
// (slots are replaced whole), so poisoning is ignored.
fn read(entries: &Entries) -> RwLockReadGuard<'_, HashMap<String, EntityReading>> {
    entries.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(entries: &Entries) -> RwLockWriteGuard<'_, HashMap<String, EntityReading>> {
    entries.write().unwrap_or_else(PoisonError::into_inner)
}

fn snapshot_all(entries: &Entries) -> CacheSnapshot {
    read(entries)
        .iter()
        .map(|(id, reading)| (id.clone(), reading.clone()))
        .collect()
}
