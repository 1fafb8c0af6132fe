use sea_orm::entity::prelude::*;

use crate::db::dao::HasDefaultOrder;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "zodiac_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
    #[sea_orm(default_value = false)]
    pub is_verified: bool,
    #[sea_orm(default_value = false)]
    pub is_admin: bool,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(unique, indexed)]
    pub api_user_identifier: Option<String>,
    #[sea_orm(default_value = true)]
    pub api_user_allowed: Option<bool>,
    pub api_key_hashed: Option<String>,
    pub api_key_created_at: Option<DateTimeWithTimeZone>,
    pub api_key_updated_at: Option<DateTimeWithTimeZone>,
    pub api_key_deactivated_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Json", nullable)]
    pub api_key_allow_list: Option<Json>,
    #[sea_orm(has_many)]
    pub success_invoices: HasMany<super::invoice_success::Entity>,
    #[sea_orm(has_many)]
    pub failed_invoices: HasMany<super::invoice_failed::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl HasDefaultOrder for Entity {
    fn default_order_column() -> Column {
        Column::CreatedAt
    }
}
