//! In-memory key → value lookups built from a whole source.

use std::collections::HashMap;

use crate::error::LoadResult;
use crate::source::RawRow;

/// An integer-keyed mapping that remembers first-insertion order.
///
/// Inserting an existing key replaces its value in place (last write
/// wins) without moving it, so iteration order is the order in which keys
/// were first seen in the source.
#[derive(Debug, Clone)]
pub struct Lookup<V> {
    name: &'static str,
    index: HashMap<i32, usize>,
    values: Vec<V>,
}

impl<V> Lookup<V> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            index: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// Consume every row of `rows`, turning each into a `(key, value)`
    /// entry. The first failing row aborts the build.
    pub fn build<I, F>(name: &'static str, rows: I, mut entry: F) -> LoadResult<Self>
    where
        I: IntoIterator<Item = LoadResult<RawRow>>,
        F: FnMut(&RawRow) -> LoadResult<(i32, V)>,
    {
        let mut lookup = Self::new(name);
        let mut replaced = 0usize;
        for row in rows {
            let (key, value) = entry(&row?)?;
            if lookup.insert(key, value).is_some() {
                replaced += 1;
            }
        }

        if replaced > 0 {
            log::debug!("{}: {} duplicate keys replaced", name, replaced);
        }
        log::info!("Built {} lookup with {} entries", name, lookup.len());
        Ok(lookup)
    }

    /// Name used in join errors and logs.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Insert or replace; returns the replaced value.
    pub fn insert(&mut self, key: i32, value: V) -> Option<V> {
        if let Some(&slot) = self.index.get(&key) {
            Some(std::mem::replace(&mut self.values[slot], value))
        } else {
            self.index.insert(key, self.values.len());
            self.values.push(value);
            None
        }
    }

    pub fn get(&self, key: i32) -> Option<&V> {
        self.index.get(&key).map(|&slot| &self.values[slot])
    }

    pub fn get_mut(&mut self, key: i32) -> Option<&mut V> {
        self.index.get(&key).map(|&slot| &mut self.values[slot])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }

    pub fn into_values(self) -> std::vec::IntoIter<V> {
        self.values.into_iter()
    }
}
