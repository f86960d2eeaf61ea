//! The immutable set of accepted top-level domains.

use crate::error::{ProbeError, Result};
use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::info;

const BUNDLED_TLDS: &str = include_str!("../data/tlds.txt");

lazy_static! {
    static ref KNOWN_TLDS: HashSet<String> = BUNDLED_TLDS
        .lines()
        .map(|line| line.trim().trim_start_matches('.').to_lowercase())
        .filter(|tld| !tld.is_empty() && !tld.starts_with('#'))
        .collect();
}

/// Whether `name` is in the bundled TLD list, ignoring the length limit.
pub fn is_known_tld(name: &str) -> bool {
    KNOWN_TLDS.contains(name)
}

/// Longest TLD accepted regardless of configuration.
pub const MAX_TLD_LENGTH: usize = 20;

/// Accepted TLDs, lower-cased and filtered by length. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TldSet {
    tlds: BTreeSet<String>,
}

impl TldSet {
    /// Build a set from raw entries.
    ///
    /// Entries are trimmed, lower-cased and stripped of a leading dot; blank lines and
    /// `#` comments are skipped, and only TLDs of 2 to `max_length` characters are
    /// kept. An empty result is an error.
    pub fn new<I, S>(entries: I, max_length: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let max_length = max_length.min(MAX_TLD_LENGTH);
        let tlds: BTreeSet<String> = entries
            .into_iter()
            .filter_map(|entry| {
                let tld = entry.as_ref().trim().trim_start_matches('.').to_lowercase();
                let len = tld.chars().count();
                (!tld.starts_with('#') && (2..=max_length).contains(&len)).then_some(tld)
            })
            .collect();

        if tlds.is_empty() {
            return Err(ProbeError::EmptyTldSet);
        }
        Ok(Self { tlds })
    }

    /// Load TLDs from a file with one entry per line.
    pub fn from_file<P: AsRef<Path>>(path: P, max_length: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ProbeError::file(path.to_string_lossy(), format!("Failed to read TLD file: {}", e))
        })?;
        let set = Self::new(content.lines(), max_length)?;
        info!(count = set.len(), path = %path.display(), "Loaded TLDs");
        Ok(set)
    }

    /// The TLD list shipped with the crate.
    pub fn bundled(max_length: usize) -> Result<Self> {
        Self::new(BUNDLED_TLDS.lines(), max_length)
    }

    pub fn contains(&self, tld: &str) -> bool {
        self.tlds.contains(tld)
    }

    pub fn len(&self) -> usize {
        self.tlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tlds.is_empty()
    }

    /// TLDs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tlds.iter().map(String::as_str)
    }
}
