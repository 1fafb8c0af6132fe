use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached. The only failure that aborts
    /// startup.
    #[error("database unreachable: {0}")]
    Unreachable(#[source] DbErr),
    #[error("statement failed: {sql}: {source}")]
    Statement {
        sql: String,
        #[source]
        source: DbErr,
    },
    #[error("could not inspect {target}: {source}")]
    Introspection {
        target: String,
        #[source]
        source: DbErr,
    },
    #[error("unsupported database backend: {0}")]
    UnsupportedBackend(String),
}

impl MigrationError {
    /// Connection failures mean the database is gone; anything else is a
    /// failed statement the run can step past.
    pub(crate) fn from_statement(sql: &str, source: DbErr) -> Self {
        match source {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Unreachable(source),
            source => Self::Statement {
                sql: sql.to_string(),
                source,
            },
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbErr, RuntimeErr};

    use super::MigrationError;

    #[test]
    fn only_connection_failures_are_fatal() {
        let lost = MigrationError::from_statement(
            "CREATE TABLE IF NOT EXISTS zodiac_users ()",
            DbErr::Conn(RuntimeErr::Internal("connection refused".to_string())),
        );
        assert!(lost.is_fatal());

        let rejected = MigrationError::from_statement(
            "CREATE TABLE IF NOT EXISTS zodiac_users ()",
            DbErr::Custom("permission denied for schema public".to_string()),
        );
        assert!(!rejected.is_fatal());
        assert!(matches!(rejected, MigrationError::Statement { sql, .. } if sql.starts_with("CREATE TABLE")));
    }
}
