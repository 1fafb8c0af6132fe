use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use sea_orm::DbErr;

use super::{
    MigrationError, SchemaCatalog,
    plan::{FAILED_TABLE, SUCCESS_TABLE, USERS_TABLE},
};

#[derive(Default)]
struct CatalogState {
    declared: Vec<(String, Vec<String>)>,
    tables: BTreeMap<String, BTreeSet<String>>,
    indexes: BTreeSet<String>,
    failing_statements: Vec<String>,
    failing_probes: Vec<String>,
    unreachable: bool,
    executed: Vec<String>,
}

/// Catalog kept in process memory for tests. It understands exactly the DDL
/// the migration plan renders and, like [`SeaOrmCatalog`], only creates
/// tables that are missing.
///
/// [`SeaOrmCatalog`]: super::SeaOrmCatalog
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
}

const INVOICE_BASE_COLUMNS: &[&str] = &[
    "id",
    "tracking_id",
    "user_id",
    "uploaded_at",
    "xml_path",
    "xml_validation_pass",
    "xml_convert_message",
    "edi_path",
    "edi_convert_pass",
    "edi_convert_message",
];

const USER_BASE_COLUMNS: &[&str] = &[
    "id",
    "email",
    "username",
    "password_hash",
    "is_active",
    "is_verified",
    "is_admin",
    "created_at",
    "updated_at",
];

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the three tables as they looked before any additive
    /// migration, without creating them.
    pub fn legacy_schema() -> Self {
        Self::new()
            .with_declared_table(USERS_TABLE, USER_BASE_COLUMNS)
            .with_declared_table(SUCCESS_TABLE, INVOICE_BASE_COLUMNS)
            .with_declared_table(FAILED_TABLE, INVOICE_BASE_COLUMNS)
    }

    /// Table `ensure_tables` creates when it is missing.
    pub fn with_declared_table(self, table: &str, columns: &[&str]) -> Self {
        self.lock().declared.push((
            table.to_string(),
            columns.iter().map(|column| column.to_string()).collect(),
        ));
        self
    }

    /// Makes every DDL statement containing `pattern` fail.
    pub fn fail_statements_containing(&self, pattern: &str) {
        self.lock().failing_statements.push(pattern.to_string());
    }

    /// Makes existence checks whose target contains `pattern` fail.
    pub fn fail_probes_containing(&self, pattern: &str) {
        self.lock().failing_probes.push(pattern.to_string());
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    pub fn clear_executed(&self) {
        self.lock().executed.clear();
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.lock().tables.contains_key(table)
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.lock()
            .tables
            .get(table)
            .is_some_and(|columns| columns.contains(column))
    }

    pub fn has_index(&self, index: &str) -> bool {
        self.lock().indexes.contains(index)
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn refused() -> DbErr {
    DbErr::Custom("connection refused".to_string())
}

fn statement_error(sql: &str, message: impl Into<String>) -> MigrationError {
    MigrationError::Statement {
        sql: sql.to_string(),
        source: DbErr::Custom(message.into()),
    }
}

fn probe(state: &CatalogState, target: String) -> Result<(), MigrationError> {
    if state.unreachable {
        return Err(MigrationError::Introspection {
            target,
            source: refused(),
        });
    }
    if state
        .failing_probes
        .iter()
        .any(|pattern| target.contains(pattern.as_str()))
    {
        return Err(MigrationError::Introspection {
            target,
            source: DbErr::Custom("permission denied for schema public".to_string()),
        });
    }
    Ok(())
}

/// Columns referenced by `ON t(a, b)` or `ON t USING GIN ((a::jsonb))`.
fn referenced_columns(target: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (target.find('('), target.rfind(')')) else {
        return Vec::new();
    };
    target[open..=close]
        .trim_matches(|c| c == '(' || c == ')')
        .split(',')
        .map(|column| {
            let column = column.trim().trim_matches(|c| c == '(' || c == ')');
            column.split("::").next().unwrap_or(column).to_string()
        })
        .filter(|column| !column.is_empty())
        .collect()
}

impl CatalogState {
    fn apply(&mut self, sql: &str) -> Result<(), MigrationError> {
        let statement = sql.trim().trim_end_matches(';');
        let tokens: Vec<&str> = statement.split_whitespace().collect();

        match tokens.as_slice() {
            ["ALTER", "TABLE", table, "ADD", "COLUMN", "IF", "NOT", "EXISTS", column, ..] => {
                let columns = self
                    .tables
                    .get_mut(*table)
                    .ok_or_else(|| statement_error(sql, format!("relation \"{table}\" does not exist")))?;
                columns.insert(column.to_string());
                Ok(())
            }
            ["CREATE", "INDEX", "IF", "NOT", "EXISTS", name, "ON", target, ..] => {
                let table = target.split('(').next().unwrap_or(*target);
                let columns = self
                    .tables
                    .get(table)
                    .ok_or_else(|| statement_error(sql, format!("relation \"{table}\" does not exist")))?;
                let on_clause = statement
                    .split_once(" ON ")
                    .map(|(_, rest)| rest)
                    .unwrap_or_default();
                if let Some(missing) = referenced_columns(on_clause)
                    .into_iter()
                    .find(|column| !columns.contains(column))
                {
                    return Err(statement_error(
                        sql,
                        format!("column \"{missing}\" does not exist"),
                    ));
                }
                self.indexes.insert(name.to_string());
                Ok(())
            }
            _ => Err(statement_error(sql, "syntax error")),
        }
    }
}

#[async_trait]
impl SchemaCatalog for InMemoryCatalog {
    async fn ensure_tables(&self) -> Result<(), MigrationError> {
        let mut state = self.lock();
        if state.unreachable {
            return Err(MigrationError::Unreachable(refused()));
        }
        let declared = state.declared.clone();
        let mut first_failure = None;
        for (table, columns) in declared {
            if state.tables.contains_key(&table) {
                continue;
            }
            let sql = format!("CREATE TABLE IF NOT EXISTS {table}");
            if state
                .failing_statements
                .iter()
                .any(|pattern| sql.contains(pattern.as_str()))
            {
                first_failure.get_or_insert(statement_error(&sql, "permission denied for schema"));
                continue;
            }
            state.tables.insert(table, columns.into_iter().collect());
        }
        first_failure.map_or(Ok(()), Err)
    }

    async fn column_exists(&self, table: &str, column: &str) -> Result<bool, MigrationError> {
        let state = self.lock();
        probe(&state, format!("column {table}.{column}"))?;
        Ok(state
            .tables
            .get(table)
            .is_some_and(|columns| columns.contains(column)))
    }

    async fn index_exists(&self, index: &str) -> Result<bool, MigrationError> {
        let state = self.lock();
        probe(&state, format!("index {index}"))?;
        Ok(state.indexes.contains(index))
    }

    async fn execute_ddl(&self, sql: &str) -> Result<(), MigrationError> {
        let mut state = self.lock();
        if state.unreachable {
            return Err(MigrationError::Statement {
                sql: sql.to_string(),
                source: refused(),
            });
        }
        state.executed.push(sql.to_string());
        if state
            .failing_statements
            .iter()
            .any(|pattern| sql.contains(pattern.as_str()))
        {
            return Err(statement_error(sql, "permission denied for table"));
        }
        state.apply(sql)
    }
}
