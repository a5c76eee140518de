//! Storage identity reports.
//!
//! Inspection only reads handle addresses and never copies or mutates.

use crate::table::Table;
use std::fmt;
use tidyframe_columnar::StorageId;

/// Identity tokens of a table's own backing, its attribute set and each column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableIdentity {
    pub table: StorageId,
    pub attributes: StorageId,
    pub columns: Vec<(String, StorageId)>,
}

impl TableIdentity {
    pub fn column(&self, name: &str) -> Option<StorageId> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, id)| *id)
    }

    /// Compare against `other`. Columns of `self` come first, in order, then columns only
    /// present in `other`.
    pub fn diff(&self, other: &TableIdentity) -> IdentityDiff {
        let mut columns: Vec<ColumnSharing> = self
            .columns
            .iter()
            .map(|(name, id)| {
                let sharing = match other.column(name) {
                    Some(theirs) if theirs == *id => Sharing::Shared,
                    Some(_) => Sharing::Changed,
                    None => Sharing::OnlyLeft,
                };
                ColumnSharing {
                    name: name.clone(),
                    sharing,
                }
            })
            .collect();
        columns.extend(
            other
                .columns
                .iter()
                .filter(|(name, _)| self.column(name).is_none())
                .map(|(name, _)| ColumnSharing {
                    name: name.clone(),
                    sharing: Sharing::OnlyRight,
                }),
        );

        IdentityDiff {
            columns,
            attributes_shared: self.attributes == other.attributes,
            table_shared: self.table == other.table,
        }
    }
}

pub fn inspect(table: &Table) -> TableIdentity {
    TableIdentity {
        table: table.identity(),
        attributes: table.attributes().identity(),
        columns: table
            .iter()
            .map(|(name, col)| (name.to_string(), col.identity()))
            .collect(),
    }
}

/// Which storage `right` shares with `left`.
pub fn diff(left: &Table, right: &Table) -> IdentityDiff {
    inspect(left).diff(&inspect(right))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sharing {
    /// Present in both with the same storage.
    Shared,
    /// Present in both with different storage.
    Changed,
    OnlyLeft,
    OnlyRight,
}

impl fmt::Display for Sharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sharing::Shared => "shared",
            Sharing::Changed => "changed",
            Sharing::OnlyLeft => "left only",
            Sharing::OnlyRight => "right only",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSharing {
    pub name: String,
    pub sharing: Sharing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityDiff {
    pub columns: Vec<ColumnSharing>,
    pub attributes_shared: bool,
    pub table_shared: bool,
}

impl IdentityDiff {
    pub fn sharing(&self, name: &str) -> Option<Sharing> {
        self.columns
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.sharing)
    }

    pub fn shared_columns(&self) -> Vec<&str> {
        self.with(Sharing::Shared)
    }

    pub fn changed_columns(&self) -> Vec<&str> {
        self.with(Sharing::Changed)
    }

    /// Every column is present in both tables with the same storage.
    pub fn all_shared(&self) -> bool {
        self.columns
            .iter()
            .all(|entry| entry.sharing == Sharing::Shared)
    }

    /// No column present in both tables shares storage.
    pub fn none_shared(&self) -> bool {
        self.columns
            .iter()
            .all(|entry| entry.sharing != Sharing::Shared)
    }

    fn with(&self, sharing: Sharing) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|entry| entry.sharing == sharing)
            .map(|entry| entry.name.as_str())
            .collect()
    }
}

impl fmt::Display for IdentityDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attributes = if self.attributes_shared {
            "shared"
        } else {
            "changed"
        };
        write!(f, "attributes: {attributes}")?;
        for entry in &self.columns {
            write!(f, "; {}: {}", entry.name, entry.sharing)?;
        }
        Ok(())
    }
}
