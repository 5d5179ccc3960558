//! Note to character mapping tables and the active-table selector.

use crate::error::MappingError;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

/// Name of the built-in set.
pub const DEFAULT_SET_NAME: &str = "virtual-piano";

/// First note of the built-in set (C2).
const DEFAULT_FIRST_NOTE: u8 = 36;

/// 61-key virtual piano, C2 through C7.
const DEFAULT_KEYS: &str = "1!2@34$5%6^78*9(0qQwWeErtTyYuiIoOpPasSdDfgGhHjJklLzZxcCvVbBnm";

/// Note number to character. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    map: HashMap<u8, char>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in virtual-piano table.
    pub fn default_piano() -> Self {
        DEFAULT_KEYS
            .chars()
            .zip(DEFAULT_FIRST_NOTE..)
            .map(|(c, note)| (note, c))
            .collect()
    }

    pub fn get(&self, note: u8) -> Option<char> {
        self.map.get(&note).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, char)> + '_ {
        self.map.iter().map(|(&n, &c)| (n, c))
    }
}

impl FromIterator<(u8, char)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (u8, char)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// Named tables loaded from one mapping file.
#[derive(Debug, Clone, Default)]
pub struct MappingSets {
    pub name: Option<String>,
    pub sets: BTreeMap<String, MappingTable>,
}

impl MappingSets {
    /// The built-in sets, used when no file is loaded.
    pub fn builtin() -> Self {
        let mut sets = BTreeMap::new();
        sets.insert(DEFAULT_SET_NAME.to_string(), MappingTable::default_piano());
        Self {
            name: Some("built-in".to_string()),
            sets,
        }
    }

    pub fn get(&self, name: &str) -> Option<&MappingTable> {
        self.sets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

/// Holds the active table. Lookups see either the old or the new table
/// across a swap, never a mix.
#[derive(Debug)]
pub struct MappingSelector {
    active: RwLock<Arc<MappingTable>>,
    sets: RwLock<MappingSets>,
}

impl Default for MappingSelector {
    fn default() -> Self {
        Self::new(MappingTable::default())
    }
}

impl MappingSelector {
    pub fn new(table: MappingTable) -> Self {
        Self {
            active: RwLock::new(Arc::new(table)),
            sets: RwLock::new(MappingSets::default()),
        }
    }

    /// Selector over a set collection, starting from `initial`.
    pub fn with_sets(sets: MappingSets, initial: &str) -> Result<Self, MappingError> {
        let selector = Self::default();
        selector.load_sets(sets);
        selector.select_set(initial)?;
        Ok(selector)
    }

    pub fn lookup(&self, note: u8) -> Option<char> {
        self.active.read().get(note)
    }

    /// Snapshot of the active table.
    pub fn current(&self) -> Arc<MappingTable> {
        self.active.read().clone()
    }

    /// Swap the active table. Releases resolve against the table active at
    /// release time, so swapping while notes are held leaves their old
    /// characters down until `NoteTracker::release_all`.
    pub fn select(&self, table: MappingTable) {
        *self.active.write() = Arc::new(table);
    }

    pub fn load_sets(&self, sets: MappingSets) {
        *self.sets.write() = sets;
    }

    pub fn set_names(&self) -> Vec<String> {
        self.sets.read().names().map(str::to_string).collect()
    }

    /// Activate a named set. Same caveat as [`select`](Self::select).
    pub fn select_set(&self, name: &str) -> Result<(), MappingError> {
        let table = self
            .sets
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| MappingError::UnknownSet(name.to_string()))?;
        info!("Selected mapping set '{}' ({} notes)", name, table.len());
        self.select(table);
        Ok(())
    }
}
