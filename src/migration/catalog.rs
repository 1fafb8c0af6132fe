use std::borrow::Cow;

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Schema, Statement,
    Value, sea_query::TableCreateStatement,
};

use super::{
    MigrationError,
    plan::{FAILED_TABLE, SUCCESS_TABLE, USERS_TABLE},
};
use crate::db::entities::{invoice_failed, invoice_success, user};

/// Schema introspection and DDL execution, as the migration runner sees it.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Creates every declared table that does not exist yet. Tables that
    /// already exist are left untouched, missing columns included.
    async fn ensure_tables(&self) -> Result<(), MigrationError>;
    async fn column_exists(&self, table: &str, column: &str) -> Result<bool, MigrationError>;
    async fn index_exists(&self, index: &str) -> Result<bool, MigrationError>;
    async fn execute_ddl(&self, sql: &str) -> Result<(), MigrationError>;
}

#[derive(Debug, FromQueryResult)]
struct Presence {
    present: bool,
}

pub struct SeaOrmCatalog {
    db: DatabaseConnection,
}

/// `CREATE TABLE IF NOT EXISTS` for every entity, referenced tables first.
fn table_statements(backend: DatabaseBackend) -> Vec<(&'static str, TableCreateStatement)> {
    let schema = Schema::new(backend);
    let mut statements = vec![
        (USERS_TABLE, schema.create_table_from_entity(user::Entity)),
        (SUCCESS_TABLE, schema.create_table_from_entity(invoice_success::Entity)),
        (FAILED_TABLE, schema.create_table_from_entity(invoice_failed::Entity)),
    ];
    for (_, statement) in &mut statements {
        statement.if_not_exists();
    }
    statements
}

/// SQLite has no `IF NOT EXISTS` on `ADD COLUMN`; the existence probe
/// guards it instead.
fn dialect_ddl(backend: DatabaseBackend, sql: &str) -> Cow<'_, str> {
    match backend {
        DatabaseBackend::Sqlite if sql.contains("ADD COLUMN IF NOT EXISTS") => {
            Cow::Owned(sql.replacen("ADD COLUMN IF NOT EXISTS", "ADD COLUMN", 1))
        }
        _ => Cow::Borrowed(sql),
    }
}

impl SeaOrmCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn probe(
        &self,
        target: String,
        postgres: &str,
        sqlite: &str,
        values: Vec<Value>,
    ) -> Result<bool, MigrationError> {
        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::Postgres => postgres,
            DatabaseBackend::Sqlite => sqlite,
            other => return Err(MigrationError::UnsupportedBackend(format!("{other:?}"))),
        };

        let row = Presence::find_by_statement(Statement::from_sql_and_values(backend, sql, values))
            .one(&self.db)
            .await
            .map_err(|source| MigrationError::Introspection { target, source })?;
        Ok(row.is_some_and(|row| row.present))
    }
}

#[async_trait]
impl SchemaCatalog for SeaOrmCatalog {
    async fn ensure_tables(&self) -> Result<(), MigrationError> {
        let backend = self.db.get_database_backend();
        let mut first_failure = None;
        for (table, create) in table_statements(backend) {
            let statement = backend.build(&create);
            let sql = statement.sql.clone();
            match self.db.execute_raw(statement).await {
                Ok(_) => tracing::debug!(table, "table ensured"),
                Err(source) => match MigrationError::from_statement(&sql, source) {
                    err @ MigrationError::Unreachable(_) => return Err(err),
                    err => {
                        tracing::error!(table, error = %err, "table creation failed");
                        first_failure.get_or_insert(err);
                    }
                },
            }
        }
        first_failure.map_or(Ok(()), Err)
    }

    async fn column_exists(&self, table: &str, column: &str) -> Result<bool, MigrationError> {
        self.probe(
            format!("column {table}.{column}"),
            "SELECT EXISTS (SELECT 1 FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2) AS present",
            "SELECT EXISTS (SELECT 1 FROM pragma_table_info(?) WHERE name = ?) AS present",
            vec![table.into(), column.into()],
        )
        .await
    }

    async fn index_exists(&self, index: &str) -> Result<bool, MigrationError> {
        self.probe(
            format!("index {index}"),
            "SELECT EXISTS (SELECT 1 FROM pg_indexes \
             WHERE schemaname = current_schema() AND indexname = $1) AS present",
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?) AS present",
            vec![index.into()],
        )
        .await
    }

    async fn execute_ddl(&self, sql: &str) -> Result<(), MigrationError> {
        let sql = dialect_ddl(self.db.get_database_backend(), sql);
        self.db
            .execute_unprepared(&sql)
            .await
            .map(|_| ())
            .map_err(|source| MigrationError::Statement {
                sql: sql.to_string(),
                source,
            })
    }
}
