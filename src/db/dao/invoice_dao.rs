use std::marker::PhantomData;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    entity::prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse, base_traits::InvoiceEntity};

/// DAO over either invoice table. Every query is scoped to one owner.
pub struct InvoiceDao<E> {
    db: DatabaseConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for InvoiceDao<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: InvoiceEntity> DaoBase for InvoiceDao<E> {
    type Entity = E;

    fn new(db: &DatabaseConnection) -> Self {
        Self {
            db: db.clone(),
            _entity: PhantomData,
        }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl<E: InvoiceEntity> InvoiceDao<E> {
    pub async fn list_active(
        &self,
        user_id: i32,
        skip: u64,
        limit: u64,
    ) -> DaoResult<PaginatedResponse<E::Model>> {
        self.find(skip, limit, None, move |query| {
            query
                .filter(E::user_id_column().eq(user_id))
                .filter(E::deleted_at_column().is_null())
        })
        .await
    }

    pub async fn list_deleted(
        &self,
        user_id: i32,
        skip: u64,
        limit: u64,
    ) -> DaoResult<PaginatedResponse<E::Model>> {
        self.find(
            skip,
            limit,
            Some((E::deleted_at_column(), Order::Desc)),
            move |query| {
                query
                    .filter(E::user_id_column().eq(user_id))
                    .filter(E::deleted_at_column().is_not_null())
            },
        )
        .await
    }

    pub async fn count_active(&self, user_id: i32) -> DaoResult<u64> {
        self.count(move |query| {
            query
                .filter(E::user_id_column().eq(user_id))
                .filter(E::deleted_at_column().is_null())
        })
        .await
    }

    pub async fn count_deleted(&self, user_id: i32) -> DaoResult<u64> {
        self.count(move |query| {
            query
                .filter(E::user_id_column().eq(user_id))
                .filter(E::deleted_at_column().is_not_null())
        })
        .await
    }

    pub async fn find_active_by_tracking_id(
        &self,
        user_id: i32,
        tracking_id: Uuid,
    ) -> DaoResult<Option<E::Model>> {
        self.first(move |query| {
            query
                .filter(E::tracking_id_column().eq(tracking_id))
                .filter(E::user_id_column().eq(user_id))
                .filter(E::deleted_at_column().is_null())
        })
        .await
    }

    /// Stamps `deleted_at` on a live row. Returns false when no live row of
    /// that owner matched.
    pub async fn mark_deleted(
        &self,
        id: i32,
        user_id: i32,
        at: DateTimeWithTimeZone,
    ) -> DaoResult<bool> {
        let result = E::update_many()
            .col_expr(E::deleted_at_column(), Expr::value(Some(at)))
            .filter(E::id_column().eq(id))
            .filter(E::user_id_column().eq(user_id))
            .filter(E::deleted_at_column().is_null())
            .exec(self.db())
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected > 0)
    }

    /// Clears `deleted_at` on a soft-deleted row. Returns false when no
    /// deleted row of that owner matched.
    pub async fn restore(&self, id: i32, user_id: i32) -> DaoResult<bool> {
        let result = E::update_many()
            .col_expr(
                E::deleted_at_column(),
                Expr::value(Option::<DateTimeWithTimeZone>::None),
            )
            .filter(E::id_column().eq(id))
            .filter(E::user_id_column().eq(user_id))
            .filter(E::deleted_at_column().is_not_null())
            .exec(self.db())
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected > 0)
    }
}

pub type SuccessInvoiceDao = InvoiceDao<crate::db::entities::invoice_success::Entity>;
pub type FailedInvoiceDao = InvoiceDao<crate::db::entities::invoice_failed::Entity>;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use uuid::Uuid;

    use super::{FailedInvoiceDao, SuccessInvoiceDao};
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::invoice_success;

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn success_model(id: i32, user_id: i32) -> invoice_success::Model {
        invoice_success::Model {
            id,
            tracking_id: Uuid::new_v4(),
            user_id,
            uploaded_at: ts(),
            xml_path: Some(format!("uploads/{id}.xml")),
            xml_validation_pass: true,
            xml_convert_message: None,
            edi_path: Some(format!("converted/{id}.x12")),
            edi_convert_pass: true,
            edi_convert_message: None,
            deleted_at: None,
            processing_steps_error: None,
            blob_xml_path: None,
            blob_edi_path: None,
            request_type: "web".to_string(),
        }
    }

    #[tokio::test]
    async fn list_active_reports_next_page_from_extra_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[success_model(3, 1), success_model(2, 1), success_model(1, 1)]])
            .into_connection();
        let dao = SuccessInvoiceDao::new(&db);

        let page = dao.list_active(1, 0, 2).await.expect("query should succeed");
        assert_eq!(page.data.len(), 2);
        assert!(page.has_next);
        assert_eq!(page.limit, 2);
    }

    #[tokio::test]
    async fn list_rejects_out_of_range_limits_without_querying() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = SuccessInvoiceDao::new(&db);

        let err = dao.list_active(1, 5, 0).await.expect_err("zero limit is invalid");
        assert!(matches!(err, DaoLayerError::InvalidPagination { skip: 5, limit: 0 }));

        let err = dao.list_deleted(1, 0, 101).await.expect_err("limit over cap is invalid");
        assert!(matches!(err, DaoLayerError::InvalidPagination { limit: 101, .. }));

        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn count_deleted_reads_num_items() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([(
                "num_items".to_string(),
                Value::BigInt(Some(4)),
            )])]])
            .into_connection();
        let dao = FailedInvoiceDao::new(&db);

        let count = dao.count_deleted(9).await.expect("count should succeed");
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn mark_deleted_only_touches_live_rows_of_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let dao = SuccessInvoiceDao::new(&db);

        let changed = dao.mark_deleted(42, 7, ts()).await.expect("update should succeed");
        assert!(changed);

        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn restore_reports_missing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = FailedInvoiceDao::new(&db);

        let changed = dao.restore(42, 7).await.expect("update should succeed");
        assert!(!changed);
    }
}
