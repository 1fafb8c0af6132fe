use sea_orm::EntityTrait;

use crate::db::entities::invoice::{InvoiceKind, InvoiceRecord};

/// Column a listing falls back to when the caller gives no explicit order.
pub trait HasDefaultOrder: EntityTrait {
    fn default_order_column() -> Self::Column;
}

/// Shared surface of the success and failed invoice tables. Implemented by
/// `#[invoice_entity]`.
pub trait InvoiceEntity: EntityTrait<Model: Sync> + HasDefaultOrder + Send + Sync {
    const KIND: InvoiceKind;

    fn id_column() -> Self::Column;
    fn user_id_column() -> Self::Column;
    fn tracking_id_column() -> Self::Column;
    fn deleted_at_column() -> Self::Column;
    fn into_record(model: Self::Model) -> InvoiceRecord;
}
