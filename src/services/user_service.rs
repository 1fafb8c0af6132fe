use serde::Serialize;

use crate::{
    db::dao::UserDao,
    db::entities::user,
    error::AppError,
};

/// User as exposed over the API. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<user::Model> for PublicUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            is_active: model.is_active,
            is_verified: model.is_verified,
            is_admin: model.is_admin,
            created_at: model.created_at,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
}

impl UserService {
    pub fn new(user_dao: UserDao) -> Self {
        Self { user_dao }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_id(id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_email(email).await?)
    }

    pub async fn email_or_username_taken(
        &self,
        email: &str,
        username: &str,
    ) -> Result<bool, AppError> {
        Ok(self
            .user_dao
            .find_by_email_or_username(email, username)
            .await?
            .is_some())
    }

    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<user::Model, AppError> {
        Ok(self
            .user_dao
            .create_user(email, username, password_hash)
            .await?)
    }
}

