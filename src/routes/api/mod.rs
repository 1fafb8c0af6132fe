pub mod auth;
pub mod invoices;
mod router;

pub use router::router;
