use invoice_entity_derive::invoice_entity;
use sea_orm::entity::prelude::*;

#[invoice_entity(kind = "Failed")]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "zodiac_invoice_failed_edi")]
pub struct Model {
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
