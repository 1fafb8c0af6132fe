use sea_orm::{
    DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder, QuerySelect, Select,
};

use super::base_traits::HasDefaultOrder;
use super::error::{DaoLayerError, DaoResult};

#[derive(Debug, serde::Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub skip: u64,
    pub limit: u64,
    pub has_next: bool,
}

pub fn check_pagination(skip: u64, limit: u64, max: u64) -> DaoResult<()> {
    if limit == 0 || limit > max {
        return Err(DaoLayerError::InvalidPagination { skip, limit });
    }
    Ok(())
}

/// Read-side helpers shared by every DAO. Writes stay on the concrete DAOs
/// since each table mutates different columns.
#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized {
    type Entity: EntityTrait<Model: Sync> + HasDefaultOrder + Send + Sync;
    const MAX_PAGE_SIZE: u64 = 100;

    fn new(db: &DatabaseConnection) -> Self;

    fn db(&self) -> &DatabaseConnection;

    async fn find(
        &self,
        skip: u64,
        limit: u64,
        order: Option<(<Self::Entity as EntityTrait>::Column, Order)>,
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<PaginatedResponse<<Self::Entity as EntityTrait>::Model>> {
        check_pagination(skip, limit, Self::MAX_PAGE_SIZE)?;

        let filtered = apply(Self::Entity::find());
        let ordered = match order {
            Some((column, order)) => filtered.order_by(column, order),
            None => filtered.order_by_desc(Self::Entity::default_order_column()),
        };
        let mut data = ordered
            .limit(limit.saturating_add(1))
            .offset(skip)
            .all(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        let has_next = data.len() > limit as usize;
        if has_next {
            data.truncate(limit as usize);
        }

        Ok(PaginatedResponse {
            data,
            skip,
            limit,
            has_next,
        })
    }

    async fn first(
        &self,
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<Option<<Self::Entity as EntityTrait>::Model>> {
        apply(Self::Entity::find())
            .one(self.db())
            .await
            .map_err(DaoLayerError::Db)
    }

    async fn count(
        &self,
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<u64> {
        apply(Self::Entity::find())
            .count(self.db())
            .await
            .map_err(DaoLayerError::Db)
    }
}
