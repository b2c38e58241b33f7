//! Lookup tables the decoder resolves numeric codes against.
//!
//! The tables are built once at startup (see [`crate::headers`] and
//! [`crate::command_classes`]) and handed to the decoder as immutable values.

use std::collections::BTreeMap;
use std::fmt;

/// A symbolic name with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    pub description: String,
}

impl TableEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for TableEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.description)
        }
    }
}

/// Code to (name, description) mapping, e.g. the values of one native enum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    entries: BTreeMap<u32, TableEntry>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: u32, entry: TableEntry) -> Option<TableEntry> {
        self.entries.insert(code, entry)
    }

    pub fn get(&self, code: u32) -> Option<&TableEntry> {
        self.entries.get(&code)
    }

    /// Resolves `code`, producing an explicit unknown marker on a miss.
    pub fn resolve(&self, code: u32) -> Resolution<'_, TableEntry> {
        match self.entries.get(&code) {
            Some(entry) => Resolution::Known(entry),
            None => Resolution::Unknown(code),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(u32, TableEntry)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (u32, TableEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Command class code to name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandClassTable {
    names: BTreeMap<u32, String>,
}

impl CommandClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, code: u32) -> Resolution<'_, String> {
        match self.names.get(&code) {
            Some(name) => Resolution::Known(name),
            None => Resolution::Unknown(code),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for CommandClassTable {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(code, name)| (code, name.into()))
                .collect(),
        }
    }
}

/// Outcome of resolving a code against a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'t, T> {
    Known(&'t T),
    /// The code is absent from its table; carries the raw code.
    Unknown(u32),
}

impl<'t, T> Resolution<'t, T> {
    pub fn known(&self) -> Option<&'t T> {
        match self {
            Resolution::Known(value) => Some(*value),
            Resolution::Unknown(_) => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Resolution::Unknown(_))
    }
}

impl<T: fmt::Display> fmt::Display for Resolution<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Resolution::Known(value) => write!(f, "{value}"),
            Resolution::Unknown(code) => write!(f, "unknown code {code} (0x{code:x})"),
        }
    }
}

/// Every table the monitor resolves against.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    pub notification_types: LookupTable,
    pub value_genres: LookupTable,
    pub value_types: LookupTable,
    pub command_classes: CommandClassTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_hit_and_miss() {
        let table: LookupTable = [(0, TableEntry::new("ValueGenre_Basic", "basic level"))]
            .into_iter()
            .collect();

        assert_eq!(
            table.resolve(0).known().map(|e| e.name.as_str()),
            Some("ValueGenre_Basic")
        );
        assert!(table.resolve(3).is_unknown());
        assert_eq!(table.resolve(3), Resolution::Unknown(3));
    }

    #[test]
    fn entry_display_joins_name_and_description() {
        let entry = TableEntry::new("ValueType_Byte", "An 8-bit unsigned value");
        assert_eq!(entry.to_string(), "ValueType_Byte: An 8-bit unsigned value");
        assert_eq!(TableEntry::new("Bare", "").to_string(), "Bare");
    }

    #[test]
    fn unknown_display_carries_code() {
        let table = CommandClassTable::new();
        assert_eq!(table.resolve(0x99).to_string(), "unknown code 153 (0x99)");
    }
}
