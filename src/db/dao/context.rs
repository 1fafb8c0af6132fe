use sea_orm::DatabaseConnection;

use super::{DaoBase, FailedInvoiceDao, SuccessInvoiceDao, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn success_invoice(&self) -> SuccessInvoiceDao {
        DaoBase::new(&self.db)
    }

    pub fn failed_invoice(&self) -> FailedInvoiceDao {
        DaoBase::new(&self.db)
    }
}
