use serde::{
    Serialize, Serializer,
    ser::SerializeMap,
};

use super::plan::MigrationGroup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCheck {
    pub table: &'static str,
    pub column: &'static str,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCheck {
    pub name: String,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStatus {
    pub name: &'static str,
    pub columns: Vec<ColumnCheck>,
    pub indexes: Vec<IndexCheck>,
}

/// Point-in-time view of which declared columns and indexes exist.
///
/// Serializes as one `<group>_columns` entry per group followed by an
/// `indexes` object of `<group>_indexes` boolean arrays. A group touching a
/// single column maps `table -> bool`, wider groups map
/// `table -> {column -> bool}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    pub groups: Vec<GroupStatus>,
}

impl MigrationStatus {
    pub fn all_applied(&self) -> bool {
        self.groups.iter().all(|group| {
            group.columns.iter().all(|check| check.present)
                && group.indexes.iter().all(|check| check.present)
        })
    }

    pub fn column(&self, table: &str, column: &str) -> Option<bool> {
        self.groups
            .iter()
            .flat_map(|group| group.columns.iter())
            .find(|check| check.table == table && check.column == column)
            .map(|check| check.present)
    }

    pub fn index(&self, name: &str) -> Option<bool> {
        self.groups
            .iter()
            .flat_map(|group| group.indexes.iter())
            .find(|check| check.name == name)
            .map(|check| check.present)
    }
}

struct ColumnsView<'a>(&'a GroupStatus);

impl Serialize for ColumnsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = &self.0.columns;
        let single_column = columns
            .first()
            .is_some_and(|first| columns.iter().all(|check| check.column == first.column));

        let mut tables: Vec<&'static str> = Vec::new();
        for check in columns {
            if !tables.contains(&check.table) {
                tables.push(check.table);
            }
        }

        let mut map = serializer.serialize_map(Some(tables.len()))?;
        for table in tables {
            let checks = columns.iter().filter(|check| check.table == table);
            if single_column {
                let present = checks.clone().all(|check| check.present);
                map.serialize_entry(table, &present)?;
            } else {
                map.serialize_entry(table, &TableView(checks.collect()))?;
            }
        }
        map.end()
    }
}

struct TableView<'a>(Vec<&'a ColumnCheck>);

impl Serialize for TableView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for check in &self.0 {
            map.serialize_entry(check.column, &check.present)?;
        }
        map.end()
    }
}

struct IndexesView<'a>(&'a [GroupStatus]);

impl Serialize for IndexesView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for group in self.0.iter().filter(|group| !group.indexes.is_empty()) {
            let flags: Vec<bool> = group.indexes.iter().map(|check| check.present).collect();
            map.serialize_entry(&format!("{}_indexes", group.name), &flags)?;
        }
        map.end()
    }
}

impl Serialize for MigrationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 1))?;
        for group in &self.groups {
            map.serialize_entry(&format!("{}_columns", group.name), &ColumnsView(group))?;
        }
        map.serialize_entry("indexes", &IndexesView(&self.groups))?;
        map.end()
    }
}

/// Status skeleton for `groups` with every flag false.
pub(crate) fn empty_status(groups: &[MigrationGroup]) -> MigrationStatus {
    MigrationStatus {
        groups: groups
            .iter()
            .map(|group| GroupStatus {
                name: group.name,
                columns: group
                    .columns
                    .iter()
                    .map(|column| ColumnCheck {
                        table: column.table,
                        column: column.name,
                        present: false,
                    })
                    .collect(),
                indexes: group
                    .indexes
                    .iter()
                    .map(|index| IndexCheck {
                        name: index.name.clone(),
                        present: false,
                    })
                    .collect(),
            })
            .collect(),
    }
}
