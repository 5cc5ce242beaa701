//! Record collections
//!
//! A [`RecordSet`] is an ordered list of entries, each either a leaf
//! [`Record`] or a [`Section`] grouping further entries. Sections carry no
//! status of their own; anything status-related about a section is computed
//! from its leaves.

use crate::error::RecordError;
use crate::record::{Record, RecordId};
use regflow_status::Lifecycle;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Grouping node in a hierarchical collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, T: Serialize",
    deserialize = "S: Deserialize<'de>, T: Deserialize<'de>"
))]
pub struct Section<S, T> {
    /// Section id, shares the namespace with record ids
    pub id: RecordId,
    /// Display title
    pub title: String,
    /// Child entries, in order
    #[serde(default)]
    pub children: Vec<Entry<S, T>>,
}

impl<S, T> Section<S, T> {
    /// Create empty section
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            children: Vec::new(),
        }
    }

    /// With child entry
    #[must_use]
    pub fn with_child(mut self, entry: impl Into<Entry<S, T>>) -> Self {
        self.children.push(entry.into());
        self
    }

    /// Leaf records under this section, depth first
    pub fn leaves(&self) -> Leaves<'_, S, T> {
        Leaves {
            stack: vec![self.children.iter()],
        }
    }
}

/// Entry in a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    bound(
        serialize = "S: Serialize, T: Serialize",
        deserialize = "S: Deserialize<'de>, T: Deserialize<'de>"
    )
)]
pub enum Entry<S, T> {
    /// Leaf record
    Record(Record<S, T>),
    /// Section of further entries
    Section(Section<S, T>),
}

impl<S, T> Entry<S, T> {
    /// Entry id
    #[must_use]
    pub fn id(&self) -> &RecordId {
        match self {
            Entry::Record(r) => r.id(),
            Entry::Section(s) => &s.id,
        }
    }
}

impl<S, T> From<Record<S, T>> for Entry<S, T> {
    fn from(value: Record<S, T>) -> Self {
        Entry::Record(value)
    }
}

impl<S, T> From<Section<S, T>> for Entry<S, T> {
    fn from(value: Section<S, T>) -> Self {
        Entry::Section(value)
    }
}

/// Depth-first iterator over leaf records
#[derive(Debug)]
pub struct Leaves<'a, S, T> {
    stack: Vec<std::slice::Iter<'a, Entry<S, T>>>,
}

impl<'a, S, T> Iterator for Leaves<'a, S, T> {
    type Item = &'a Record<S, T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Entry::Record(r)) => return Some(r),
                Some(Entry::Section(s)) => self.stack.push(s.children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Immutable, ordered, possibly hierarchical record collection
///
/// Deserialization validates the collection the same way
/// [`RecordSet::from_entries`] does, so a loaded set never holds duplicate
/// ids or a status without its required satellite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Entry<S, T>>",
    into = "Vec<Entry<S, T>>",
    bound(
        serialize = "S: Lifecycle, T: Serialize + Clone",
        deserialize = "S: Lifecycle, T: serde::de::DeserializeOwned"
    )
)]
pub struct RecordSet<S, T> {
    entries: Vec<Entry<S, T>>,
}

impl<S, T> Default for RecordSet<S, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S: Lifecycle, T> RecordSet<S, T> {
    /// Create empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a flat collection
    ///
    /// # Errors
    /// Fails on duplicate ids or missing satellite data.
    pub fn from_records(records: Vec<Record<S, T>>) -> Result<Self, RecordError> {
        Self::from_entries(records.into_iter().map(Entry::Record).collect())
    }

    /// Build a possibly hierarchical collection
    ///
    /// # Errors
    /// Fails on duplicate ids or missing satellite data.
    pub fn from_entries(entries: Vec<Entry<S, T>>) -> Result<Self, RecordError> {
        let set = Self { entries };
        set.validate_invariants()?;
        Ok(set)
    }

    /// Top-level entries
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[Entry<S, T>] {
        &self.entries
    }

    /// Top-level sections
    pub fn sections(&self) -> impl Iterator<Item = &Section<S, T>> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Section(s) => Some(s),
            Entry::Record(_) => None,
        })
    }

    /// Leaf records, depth first, in collection order
    pub fn leaves(&self) -> Leaves<'_, S, T> {
        Leaves {
            stack: vec![self.entries.iter()],
        }
    }

    /// Number of leaf records
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Whether there are no leaf records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves().next().is_none()
    }

    /// Find a leaf record by id, searching nested sections
    #[must_use]
    pub fn find(&self, id: &RecordId) -> Option<&Record<S, T>> {
        self.leaves().find(|r| r.id() == id)
    }

    /// Whether a leaf record with this id exists
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.find(id).is_some()
    }

    /// Check the collection-wide invariants
    ///
    /// - every entry id is unique across all levels
    /// - every record holds the satellite its status requires
    pub fn validate_invariants(&self) -> Result<(), RecordError> {
        let mut seen = HashSet::new();
        check_entries(&self.entries, &mut seen)
    }
}

impl<S: Lifecycle, T: Clone> RecordSet<S, T> {
    /// New collection with `entry` appended at the top level
    ///
    /// # Errors
    /// Fails if the entry reuses an existing id.
    pub fn with_entry(&self, entry: impl Into<Entry<S, T>>) -> Result<Self, RecordError> {
        let mut entries = self.entries.clone();
        entries.push(entry.into());
        Self::from_entries(entries)
    }

    /// New collection with the record `id` replaced by `f(record)`.
    ///
    /// Returns `None` if no leaf has that id. Order and shape are kept.
    pub(crate) fn map_record<F>(&self, id: &RecordId, f: F) -> Option<Self>
    where
        F: FnOnce(&Record<S, T>) -> Record<S, T>,
    {
        let mut f = Some(f);
        let entries = map_entries(&self.entries, id, &mut f);
        if f.is_some() {
            return None;
        }
        Some(Self { entries })
    }
}

impl<S: Lifecycle, T> TryFrom<Vec<Entry<S, T>>> for RecordSet<S, T> {
    type Error = RecordError;

    fn try_from(value: Vec<Entry<S, T>>) -> Result<Self, Self::Error> {
        Self::from_entries(value)
    }
}

impl<S, T> From<RecordSet<S, T>> for Vec<Entry<S, T>> {
    fn from(value: RecordSet<S, T>) -> Self {
        value.entries
    }
}

fn check_entries<S: Lifecycle, T>(
    entries: &[Entry<S, T>],
    seen: &mut HashSet<RecordId>,
) -> Result<(), RecordError> {
    for entry in entries {
        if !seen.insert(entry.id().clone()) {
            return Err(RecordError::DuplicateId(entry.id().clone()));
        }
        match entry {
            Entry::Record(r) => {
                if let Some(required) = r.missing_satellite() {
                    return Err(RecordError::MissingSatelliteData {
                        id: r.id().clone(),
                        status: r.status().as_str(),
                        required,
                    });
                }
            }
            Entry::Section(s) => check_entries(&s.children, seen)?,
        }
    }
    Ok(())
}

fn map_entries<S: Lifecycle, T: Clone, F>(
    entries: &[Entry<S, T>],
    id: &RecordId,
    f: &mut Option<F>,
) -> Vec<Entry<S, T>>
where
    F: FnOnce(&Record<S, T>) -> Record<S, T>,
{
    entries
        .iter()
        .map(|entry| match entry {
            Entry::Record(r) if r.id() == id => match f.take() {
                Some(f) => Entry::Record(f(r)),
                None => entry.clone(),
            },
            Entry::Record(_) => entry.clone(),
            Entry::Section(s) => Entry::Section(Section {
                id: s.id.clone(),
                title: s.title.clone(),
                children: map_entries(&s.children, id, f),
            }),
        })
        .collect()
}
