use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, QueryFilter, Set};

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    pub async fn find_by_id(&self, id: i32) -> DaoResult<Option<user::Model>> {
        self.first(move |query| query.filter(user::Column::Id.eq(id)))
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.first(move |query| query.filter(user::Column::Email.eq(email)))
            .await
    }

    pub async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> DaoResult<Option<user::Model>> {
        let condition = Condition::any()
            .add(user::Column::Email.eq(email.to_string()))
            .add(user::Column::Username.eq(username.to_string()));
        self.first(move |query| query.filter(condition)).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(email.to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            is_active: Set(true),
            is_verified: Set(false),
            is_admin: Set(false),
            created_at: Set(Utc::now().fixed_offset()),
            updated_at: Set(None),
            api_user_allowed: Set(Some(true)),
            ..Default::default()
        };
        model.insert(self.db()).await.map_err(DaoLayerError::Db)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::UserDao;
    use crate::db::dao::DaoBase;
    use crate::db::entities::user;

    fn user_model(id: i32, email: &str) -> user::Model {
        let now = FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid");
        user::Model {
            id,
            email: email.to_string(),
            username: email.split('@').next().unwrap_or_default().to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_verified: false,
            is_admin: false,
            created_at: now,
            updated_at: None,
            api_user_identifier: None,
            api_user_allowed: Some(true),
            api_key_hashed: None,
            api_key_created_at: None,
            api_key_updated_at: None,
            api_key_deactivated_at: None,
            api_key_allow_list: None,
        }
    }

    #[tokio::test]
    async fn find_by_email_returns_first_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(11, "alice@example.com")]])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_email("alice@example.com")
            .await
            .expect("query should succeed");
        assert_eq!(result.map(|u| u.id), Some(11));
    }

    #[tokio::test]
    async fn find_by_email_or_username_returns_none_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_email_or_username("missing@example.com", "missing")
            .await
            .expect("query should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn create_user_returns_inserted_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(5, "bob@example.com")]])
            .into_connection();
        let dao = UserDao::new(&db);

        let created = dao
            .create_user("bob@example.com", "bob", "argon-hash")
            .await
            .expect("insert should succeed");
        assert_eq!(created.id, 5);
        assert!(created.is_active);
    }
}
