//! Additive, idempotent schema changes applied before the server binds.
//!
//! There is no version ledger: every step checks the live catalog and the
//! DDL itself carries `IF NOT EXISTS`, so concurrent instances converge.

mod catalog;
mod error;
pub mod plan;
mod runner;
mod status;
pub mod testing;

pub use catalog::{SchemaCatalog, SeaOrmCatalog};
pub use error::MigrationError;
pub use runner::{MigrationReport, MigrationRunner, StepOutcome, StepRecord};
pub use status::{ColumnCheck, GroupStatus, IndexCheck, MigrationStatus};
