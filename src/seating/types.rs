use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identity of a seating unit: the contact key plus the part index.
///
/// Part 0 is an unsplit unit (or the first fragment of a split one), so two
/// fragments of the same family are distinct identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub email: String,
    pub part: u32,
}

impl UnitKey {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            part: 0,
        }
    }

    pub fn with_part(&self, part: u32) -> Self {
        Self {
            email: self.email.clone(),
            part,
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.part == 0 {
            write!(f, "{}", self.email)
        } else {
            write!(f, "{}#{}", self.email, self.part)
        }
    }
}

/// A seating party. Equality and hashing go through [`UnitKey`] only.
#[derive(Debug, Clone)]
pub struct Unit {
    pub key: UnitKey,
    pub first_name: String,
    pub last_name: String,
    pub size: u32,
    pub submitted: Option<NaiveDateTime>,
}

impl Unit {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        size: u32,
    ) -> Self {
        Self {
            key: UnitKey::new(email),
            first_name: first_name.into(),
            last_name: last_name.into(),
            size,
            submitted: None,
        }
    }

    pub fn submitted_at(mut self, submitted: NaiveDateTime) -> Self {
        self.submitted = Some(submitted);
        self
    }

    /// Fragment of this unit carrying `part` as its index and `size` seats.
    pub fn part(&self, part: u32, size: u32) -> Self {
        Self {
            key: self.key.with_part(part),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            size,
            submitted: self.submitted,
        }
    }

    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if self.key.part == 0 {
            name.to_string()
        } else {
            format!("{} [part {}]", name, self.key.part)
        }
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Removes repeated identities, keeping the first occurrence of each.
pub fn dedup_units(units: Vec<Unit>) -> Vec<Unit> {
    let mut seen = HashSet::new();
    units
        .into_iter()
        .filter(|u| seen.insert(u.key.clone()))
        .collect()
}

/// Resolved request of one unit.
#[derive(Debug, Clone)]
pub struct Request {
    pub requester: Unit,
    pub targets: Vec<Unit>,
}

/// Resolved request graph, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RequestMap {
    entries: IndexMap<UnitKey, Request>,
}

impl RequestMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request list of `requester`. An existing entry keeps its
    /// position in iteration order.
    pub fn insert(&mut self, requester: Unit, targets: Vec<Unit>) {
        let targets = dedup_units(targets);
        self.entries.insert(
            requester.key.clone(),
            Request {
                requester,
                targets,
            },
        );
    }

    pub fn targets(&self, key: &UnitKey) -> &[Unit] {
        self.entries
            .get(key)
            .map(|r| r.targets.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.entries.values()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (requester, requested) pairs.
    pub fn edge_count(&self) -> usize {
        self.entries.values().map(|r| r.targets.len()).sum()
    }
}

/// A fixed-capacity table.
#[derive(Debug, Clone)]
pub struct Table {
    capacity: u32,
    used: u32,
    units: Vec<Unit>,
}

impl Table {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            used: 0,
            units: Vec::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.used)
    }

    pub fn fits(&self, unit: &Unit) -> bool {
        self.remaining() >= unit.size
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub(crate) fn seat(&mut self, unit: Unit) {
        debug_assert!(self.fits(&unit), "table over capacity");
        self.used += unit.size;
        self.units.push(unit);
    }
}

/// A seating zone. Grows only by appending tables.
#[derive(Debug, Clone)]
pub struct Area {
    table_size: u32,
    used: u32,
    tables: Vec<Table>,
}

impl Area {
    pub fn new(table_size: u32) -> Self {
        Self {
            table_size,
            used: 0,
            tables: Vec::new(),
        }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    /// Seats left across the tables the area already has.
    pub fn remaining(&self) -> u32 {
        (self.tables.len() as u32 * self.table_size).saturating_sub(self.used)
    }

    pub(crate) fn tables_mut(&mut self) -> &mut Vec<Table> {
        &mut self.tables
    }

    pub(crate) fn open_table(&mut self) -> usize {
        self.tables.push(Table::new(self.table_size));
        self.tables.len() - 1
    }

    pub(crate) fn record_used(&mut self, seats: u32) {
        self.used += seats;
    }
}

/// Tables of every area with their 1-based plan-wide number, in layout order.
pub fn numbered_tables(areas: &[Area]) -> impl Iterator<Item = (usize, u32, &Table)> {
    areas
        .iter()
        .enumerate()
        .flat_map(|(area_idx, area)| area.tables().iter().map(move |t| (area_idx, t)))
        .zip(1u32..)
        .map(|((area_idx, table), number)| (area_idx, number, table))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictReason {
    NotFound,
    DifferentArea,
}

impl ConflictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictReason::NotFound => "Requested family not found",
            ConflictReason::DifferentArea => "Not seated in same area",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unmet seating request.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub requester: Unit,
    pub requested: Unit,
    pub reason: ConflictReason,
}
