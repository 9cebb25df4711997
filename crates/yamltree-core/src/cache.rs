//! Per-prefix node cache
//!
//! Each dotted prefix that has been looked up is recorded once, either as a
//! directory (no content) or as a loaded file with its parsed content.
//! Entries are never updated in place; the whole cache is dropped by
//! [`NodeCache::clear`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::value::Value;

/// What a dotted prefix resolved to on disk
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// The prefix names a directory; resolution continues deeper
    Directory(PathBuf),
    /// The prefix names a YAML file, loaded and interpolated
    File { path: PathBuf, content: Value },
}

impl CacheEntry {
    /// Parsed content, or `None` for a directory
    pub fn content(&self) -> Option<&Value> {
        match self {
            CacheEntry::Directory(_) => None,
            CacheEntry::File { content, .. } => Some(content),
        }
    }

    /// Filesystem path recorded for this node
    pub fn path(&self) -> &Path {
        match self {
            CacheEntry::Directory(path) => path,
            CacheEntry::File { path, .. } => path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, CacheEntry::File { .. })
    }
}

/// Cache of resolved nodes keyed by dotted prefix
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: HashMap<String, CacheEntry>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prefix: &str) -> Option<&CacheEntry> {
        self.entries.get(prefix)
    }

    /// Record the entry for `prefix`.
    ///
    /// The first entry recorded for a prefix is kept; later inserts for the
    /// same prefix return the existing entry unchanged.
    pub fn insert(&mut self, prefix: impl Into<String>, entry: CacheEntry) -> &CacheEntry {
        self.entries.entry(prefix.into()).or_insert(entry)
    }

    /// Return the entry for `prefix`, building it with `make` on a miss.
    ///
    /// A failed `make` leaves the cache untouched.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        prefix: String,
        make: impl FnOnce() -> Result<CacheEntry, E>,
    ) -> Result<&CacheEntry, E> {
        match self.entries.entry(prefix) {
            Entry::Occupied(hit) => {
                log::trace!("node cache hit for '{}'", hit.key());
                Ok(hit.into_mut())
            }
            Entry::Vacant(miss) => {
                let entry = make()?;
                Ok(miss.insert(entry))
            }
        }
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.entries.contains_key(prefix)
    }

    /// Filesystem path recorded for a prefix, if it has been resolved
    pub fn source(&self, prefix: &str) -> Option<&Path> {
        self.entries.get(prefix).map(CacheEntry::path)
    }

    /// Cached prefixes, sorted
    pub fn prefixes(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
