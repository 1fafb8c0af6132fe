use std::sync::Arc;

use tracing::{error, info, warn};

use super::{
    MigrationError, SchemaCatalog,
    plan::{ColumnSpec, IndexSpec, MigrationGroup, migration_groups},
    status::{MigrationStatus, empty_status},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Created,
    AlreadyPresent,
}

#[derive(Debug)]
pub struct StepRecord {
    pub group: &'static str,
    /// `table.column` or the index name.
    pub target: String,
    pub outcome: Result<StepOutcome, MigrationError>,
}

/// What one full run did, step by step.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub steps: Vec<StepRecord>,
}

impl MigrationReport {
    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|step| step.outcome.is_err())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn created(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, Ok(StepOutcome::Created)))
            .count()
    }
}

/// Applies the additive schema plan through a [`SchemaCatalog`].
#[derive(Clone)]
pub struct MigrationRunner {
    catalog: Arc<dyn SchemaCatalog>,
    groups: Arc<Vec<MigrationGroup>>,
}

impl MigrationRunner {
    pub fn new(catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self {
            catalog,
            groups: Arc::new(migration_groups()),
        }
    }

    pub async fn ensure_tables_exist(&self) -> Result<(), MigrationError> {
        self.catalog.ensure_tables().await?;
        info!("declared tables are present");
        Ok(())
    }

    /// Adds `column` unless the catalog already lists it. A failed lookup
    /// falls through to the guarded DDL.
    pub async fn add_column_if_missing(
        &self,
        column: &ColumnSpec,
    ) -> Result<StepOutcome, MigrationError> {
        match self.catalog.column_exists(column.table, column.name).await {
            Ok(true) => {
                info!(table = column.table, column = column.name, "column already present");
                return Ok(StepOutcome::AlreadyPresent);
            }
            Ok(false) => {}
            Err(err) => {
                warn!(table = column.table, column = column.name, error = %err, "column lookup failed, applying guarded DDL");
            }
        }

        self.catalog.execute_ddl(&column.ddl()).await?;
        info!(table = column.table, column = column.name, "column added");
        Ok(StepOutcome::Created)
    }

    pub async fn create_index_if_missing(
        &self,
        index: &IndexSpec,
    ) -> Result<StepOutcome, MigrationError> {
        match self.catalog.index_exists(&index.name).await {
            Ok(true) => {
                info!(index = %index.name, "index already present");
                return Ok(StepOutcome::AlreadyPresent);
            }
            Ok(false) => {}
            Err(err) => {
                warn!(index = %index.name, error = %err, "index lookup failed, applying guarded DDL");
            }
        }

        self.catalog.execute_ddl(&index.ddl()).await?;
        info!(index = %index.name, table = index.table, "index created");
        Ok(StepOutcome::Created)
    }

    /// Runs every group in order. Individual step failures are recorded and
    /// skipped; only an unreachable database aborts.
    pub async fn run_all_migrations(&self) -> Result<MigrationReport, MigrationError> {
        info!(groups = self.groups.len(), "running schema migrations");
        let mut report = MigrationReport::default();
        match self.ensure_tables_exist().await {
            Ok(()) => {}
            Err(err) if err.is_fatal() => {
                error!(error = %err, "cannot ensure tables, aborting migrations");
                return Err(err);
            }
            Err(err) => {
                error!(error = %err, "table creation failed, continuing with column migrations");
                report.steps.push(StepRecord {
                    group: "tables",
                    target: "tables".to_string(),
                    outcome: Err(err),
                });
            }
        }

        for group in self.groups.iter() {
            for column in &group.columns {
                let outcome = self.add_column_if_missing(column).await;
                if let Err(err) = &outcome {
                    error!(group = group.name, table = column.table, column = column.name, error = %err, "column migration failed");
                }
                report.steps.push(StepRecord {
                    group: group.name,
                    target: format!("{}.{}", column.table, column.name),
                    outcome,
                });
            }
            for index in &group.indexes {
                let outcome = self.create_index_if_missing(index).await;
                if let Err(err) = &outcome {
                    error!(group = group.name, index = %index.name, error = %err, "index migration failed");
                }
                report.steps.push(StepRecord {
                    group: group.name,
                    target: index.name.clone(),
                    outcome,
                });
            }
        }

        let failed = report.failures().count();
        if failed == 0 {
            info!(created = report.created(), "schema migrations complete");
        } else {
            warn!(
                created = report.created(),
                failed, "schema migrations finished with failures"
            );
        }
        Ok(report)
    }

    /// Re-checks every declared column and index. Never fails; a check that
    /// errors reports `false`.
    pub async fn get_migration_status(&self) -> MigrationStatus {
        let mut status = empty_status(&self.groups);
        for group in &mut status.groups {
            for check in &mut group.columns {
                check.present = match self.catalog.column_exists(check.table, check.column).await {
                    Ok(present) => present,
                    Err(err) => {
                        warn!(table = check.table, column = check.column, error = %err, "column status check failed");
                        false
                    }
                };
            }
            for check in &mut group.indexes {
                check.present = match self.catalog.index_exists(&check.name).await {
                    Ok(present) => present,
                    Err(err) => {
                        warn!(index = %check.name, error = %err, "index status check failed");
                        false
                    }
                };
            }
        }
        status
    }
}
