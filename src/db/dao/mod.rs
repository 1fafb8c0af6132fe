pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod invoice_dao;
pub mod user_dao;

pub use base::{DaoBase, PaginatedResponse, check_pagination};
pub use base_traits::{HasDefaultOrder, InvoiceEntity};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use invoice_dao::{FailedInvoiceDao, InvoiceDao, SuccessInvoiceDao};
pub use user_dao::UserDao;
