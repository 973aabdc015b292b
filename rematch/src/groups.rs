//! Capture group table
//!
//! Records how many capturing groups a compiled pattern has and maps group
//! names to their indices. Index 0 is the implicit whole-match group and is
//! never counted or named.

use std::collections::HashMap;

/// Information about a capture group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// The index of the group (1-based, as in `\1`, `\2`, ...)
    pub index: usize,
    /// The name of the group, if it has one
    pub name: Option<String>,
}

/// Group table of one compiled pattern
#[derive(Debug, Clone, Default)]
pub struct GroupTable {
    groups: Vec<GroupInfo>,
    name_to_index: HashMap<String, usize>,
}

impl GroupTable {
    /// Build the table from the engine's per-slot names, slot 0 first
    pub fn from_slot_names<'a>(names: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut table = GroupTable::default();
        for (index, name) in names.into_iter().enumerate().skip(1) {
            if let Some(name) = name {
                table.name_to_index.insert(name.to_string(), index);
            }
            table.groups.push(GroupInfo {
                index,
                name: name.map(str::to_string),
            });
        }
        table
    }

    /// Number of capturing groups, not counting the whole match
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Look up a group index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get group info by index
    pub fn get(&self, index: usize) -> Option<&GroupInfo> {
        index.checked_sub(1).and_then(|i| self.groups.get(i))
    }

    pub fn groups(&self) -> &[GroupInfo] {
        &self.groups
    }

    /// Named groups only, in index order
    pub fn named(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.groups
            .iter()
            .filter_map(|g| g.name.as_deref().map(|name| (name, g.index)))
    }
}
