#[allow(unused_imports)]
pub mod prelude {
    pub use super::invoice_failed::Entity as InvoiceFailed;
    pub use super::invoice_success::Entity as InvoiceSuccess;
    pub use super::user::Entity as User;
}

pub mod invoice;
pub mod invoice_failed;
pub mod invoice_success;
pub mod user;
