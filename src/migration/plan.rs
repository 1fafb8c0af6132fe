//! Declarative list of the additive schema changes applied at startup.

pub const USERS_TABLE: &str = "zodiac_users";
pub const SUCCESS_TABLE: &str = "zodiac_invoice_success_edi";
pub const FAILED_TABLE: &str = "zodiac_invoice_failed_edi";
pub const INVOICE_TABLES: [&str; 2] = [SUCCESS_TABLE, FAILED_TABLE];

const TIMESTAMPTZ_NULL: &str = "TIMESTAMP WITH TIME ZONE NULL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub table: &'static str,
    pub name: &'static str,
    /// Type, nullability and default exactly as they follow the column name.
    pub definition: &'static str,
}

impl ColumnSpec {
    pub const fn new(table: &'static str, name: &'static str, definition: &'static str) -> Self {
        Self {
            table,
            name,
            definition,
        }
    }

    pub fn ddl(&self) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {};",
            self.table, self.name, self.definition
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    BTree,
    /// GIN over the `jsonb` cast of a single JSON column.
    Gin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub table: &'static str,
    pub columns: Vec<&'static str>,
    pub kind: IndexKind,
}

impl IndexSpec {
    /// `idx_<table>_<suffix>` over `columns`.
    pub fn btree(table: &'static str, suffix: &str, columns: &[&'static str]) -> Self {
        Self {
            name: format!("idx_{table}_{suffix}"),
            table,
            columns: columns.to_vec(),
            kind: IndexKind::BTree,
        }
    }

    pub fn gin(table: &'static str, column: &'static str) -> Self {
        Self {
            name: format!("idx_{table}_{column}"),
            table,
            columns: vec![column],
            kind: IndexKind::Gin,
        }
    }

    pub fn ddl(&self) -> String {
        match self.kind {
            IndexKind::BTree => format!(
                "CREATE INDEX IF NOT EXISTS {} ON {}({});",
                self.name,
                self.table,
                self.columns.join(", ")
            ),
            IndexKind::Gin => format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} USING GIN (({}::jsonb));",
                self.name,
                self.table,
                self.columns.join(", ")
            ),
        }
    }
}

/// Columns first, then the indexes that reference them.
#[derive(Debug, Clone)]
pub struct MigrationGroup {
    pub name: &'static str,
    pub columns: Vec<ColumnSpec>,
    pub indexes: Vec<IndexSpec>,
}

fn on_invoice_tables(name: &'static str, definition: &'static str) -> Vec<ColumnSpec> {
    INVOICE_TABLES
        .iter()
        .map(|&table| ColumnSpec::new(table, name, definition))
        .collect()
}

/// Every group in execution order.
pub fn migration_groups() -> Vec<MigrationGroup> {
    let mut deleted_at_indexes: Vec<IndexSpec> = INVOICE_TABLES
        .iter()
        .map(|&table| IndexSpec::btree(table, "deleted_at", &["deleted_at"]))
        .collect();
    // Composite indexes come after the single-column ones they complement.
    deleted_at_indexes.extend(
        INVOICE_TABLES
            .iter()
            .map(|&table| IndexSpec::btree(table, "user_deleted", &["user_id", "deleted_at"])),
    );

    let blob_path_columns = INVOICE_TABLES
        .iter()
        .flat_map(|&table| {
            [
                ColumnSpec::new(table, "blob_xml_path", "TEXT NULL"),
                ColumnSpec::new(table, "blob_edi_path", "TEXT NULL"),
            ]
        })
        .collect();

    vec![
        MigrationGroup {
            name: "deleted_at",
            columns: on_invoice_tables("deleted_at", TIMESTAMPTZ_NULL),
            indexes: deleted_at_indexes,
        },
        MigrationGroup {
            name: "processing_steps",
            columns: on_invoice_tables("processing_steps_error", "JSON NULL"),
            indexes: INVOICE_TABLES
                .iter()
                .map(|&table| IndexSpec::gin(table, "processing_steps_error"))
                .collect(),
        },
        MigrationGroup {
            name: "blob_path",
            columns: blob_path_columns,
            indexes: Vec::new(),
        },
        MigrationGroup {
            name: "api_key",
            columns: vec![
                ColumnSpec::new(USERS_TABLE, "api_user_identifier", "VARCHAR UNIQUE"),
                ColumnSpec::new(USERS_TABLE, "api_user_allowed", "BOOLEAN DEFAULT TRUE"),
                ColumnSpec::new(USERS_TABLE, "api_key_hashed", "VARCHAR NULL"),
                ColumnSpec::new(USERS_TABLE, "api_key_created_at", TIMESTAMPTZ_NULL),
                ColumnSpec::new(USERS_TABLE, "api_key_updated_at", TIMESTAMPTZ_NULL),
                ColumnSpec::new(USERS_TABLE, "api_key_deactivated_at", TIMESTAMPTZ_NULL),
                ColumnSpec::new(USERS_TABLE, "api_key_allow_list", "JSON NULL"),
            ],
            indexes: vec![
                IndexSpec::btree(USERS_TABLE, "api_user_identifier", &["api_user_identifier"]),
                IndexSpec::btree(USERS_TABLE, "api_user_allowed", &["api_user_allowed"]),
            ],
        },
        MigrationGroup {
            name: "request_type",
            columns: on_invoice_tables("request_type", "VARCHAR DEFAULT 'web' NOT NULL"),
            indexes: INVOICE_TABLES
                .iter()
                .map(|&table| IndexSpec::btree(table, "request_type", &["request_type"]))
                .collect(),
        },
    ]
}
