//! Counters collected while a package is analyzed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys of the statistics map.
///
/// A key is present only when the check that produces it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    FileSize,
    FileSizeMb,
    ZipEntries,
    TrackedChanges,
    SmartTags,
    ContentControls,
    LockedContentControls,
    FieldCodes,
    Equations,
    Hyperlinks,
    BrokenHyperlinks,
    CustomNamespaces,
    Relationships,
    BrokenReferences,
    ExternalRefs,
    EmbeddedObjects,
    MediaFiles,
}

/// Breakdown of revision elements found in the main document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedChangeCounts {
    pub insertions: usize,
    pub deletions: usize,
    pub paragraph_changes: usize,
    pub run_changes: usize,
    pub total: usize,
}

impl TrackedChangeCounts {
    /// Build the breakdown, deriving `total`.
    pub fn new(
        insertions: usize,
        deletions: usize,
        paragraph_changes: usize,
        run_changes: usize,
    ) -> Self {
        Self {
            insertions,
            deletions,
            paragraph_changes,
            run_changes,
            total: insertions + deletions + paragraph_changes + run_changes,
        }
    }
}

/// A statistics value: a plain count, a size or a structured breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(usize),
    /// Mebibytes rounded to two decimals
    Megabytes(f64),
    TrackedChanges(TrackedChangeCounts),
}

impl StatValue {
    /// Size in mebibytes, rounded to two decimals.
    pub fn megabytes(bytes: u64) -> Self {
        StatValue::Megabytes((bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0)
    }

    /// Single number summarising the value; sizes round to whole mebibytes.
    pub fn total(&self) -> usize {
        match self {
            StatValue::Count(n) => *n,
            StatValue::Megabytes(mb) => mb.round() as usize,
            StatValue::TrackedChanges(counts) => counts.total,
        }
    }
}

impl From<usize> for StatValue {
    fn from(count: usize) -> Self {
        StatValue::Count(count)
    }
}

impl From<TrackedChangeCounts> for StatValue {
    fn from(counts: TrackedChangeCounts) -> Self {
        StatValue::TrackedChanges(counts)
    }
}

/// Statistics map of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statistics(BTreeMap<StatKey, StatValue>);

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; a later value for the same key replaces the earlier one.
    pub fn record(&mut self, key: StatKey, value: impl Into<StatValue>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: StatKey) -> Option<&StatValue> {
        self.0.get(&key)
    }

    /// Shorthand for the summarising number of a key.
    pub fn count(&self, key: StatKey) -> Option<usize> {
        self.get(key).map(StatValue::total)
    }

    /// Tracked change breakdown, if the tracked changes check ran.
    pub fn tracked_changes(&self) -> Option<&TrackedChangeCounts> {
        match self.get(StatKey::TrackedChanges) {
            Some(StatValue::TrackedChanges(counts)) => Some(counts),
            _ => None,
        }
    }

    pub fn contains(&self, key: StatKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatKey, &StatValue)> {
        self.0.iter()
    }
}
