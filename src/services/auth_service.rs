use crate::{
    auth::{
        Role, TokenResponse,
        jwt::{JwtKeys, TOKEN_TYPE, decode_token, encode_token, make_access_claims},
        password::{hash_password, verify_password},
    },
    db::entities::user,
    error::AppError,
    services::user_service::{PublicUser, UserService},
};

const INVALID_CREDENTIALS: &str = "Could not validate credentials";

#[derive(Clone)]
pub struct AuthService {
    user_service: UserService,
    jwt: JwtKeys,
    ttl_secs: usize,
}

impl AuthService {
    pub fn new(user_service: UserService, jwt: JwtKeys, ttl_secs: usize) -> Self {
        Self {
            user_service,
            jwt,
            ttl_secs,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, AppError> {
        let email = email.trim();
        let username = username.trim();
        if email.is_empty() || username.is_empty() {
            return Err(AppError::bad_request("Email and username are required"));
        }

        if self
            .user_service
            .email_or_username_taken(email, username)
            .await?
        {
            return Err(AppError::bad_request("Email or username already registered"));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_service
            .create_user(email, username, &password_hash)
            .await?;
        tracing::info!(user_id = user.id, "user registered");

        self.issue_token(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AppError> {
        let user = self
            .user_service
            .find_by_email(email.trim())
            .await?
            .filter(|user| verify_password(password, &user.password_hash))
            .ok_or_else(|| AppError::unauthorized("Incorrect email or password"))?;

        if !user.is_active {
            return Err(AppError::bad_request("Inactive user"));
        }

        self.issue_token(user)
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<user::Model, AppError> {
        let user_id = decode_token(&self.jwt, token)?
            .user_id()
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        self.user_service
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))
    }

    fn issue_token(&self, user: user::Model) -> Result<TokenResponse, AppError> {
        let claims = make_access_claims(user.id, Role::for_user(user.is_admin), self.ttl_secs);
        let access_token = encode_token(&self.jwt, &claims)?;
        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: self.ttl_secs,
            user: PublicUser::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::AuthService;
    use crate::{
        auth::{
            JwtKeys,
            jwt::{encode_token, make_access_claims},
            password::hash_password,
            Role,
        },
        db::{dao::DaoBase, dao::UserDao, entities::user},
        error::AppError,
        services::user_service::UserService,
    };

    fn user_model(id: i32, password: &str, is_active: bool) -> user::Model {
        user::Model {
            id,
            email: "dana@example.com".to_string(),
            username: "dana".to_string(),
            password_hash: hash_password(password).expect("hash should succeed"),
            is_active,
            is_verified: true,
            is_admin: false,
            created_at: FixedOffset::east_opt(0)
                .expect("offset should be valid")
                .with_ymd_and_hms(2026, 2, 1, 8, 0, 0)
                .single()
                .expect("timestamp should be valid"),
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

    fn service(db: &sea_orm::DatabaseConnection) -> AuthService {
        AuthService::new(
            UserService::new(UserDao::new(db)),
            JwtKeys::from_secret(b"auth-service-secret"),
            1800,
        )
    }

    #[tokio::test]
    async fn login_issues_bearer_token_for_valid_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(8, "s3cret-pass", true)]])
            .into_connection();

        let token = service(&db)
            .login("dana@example.com", "s3cret-pass")
            .await
            .expect("login should succeed");
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 1800);
        assert_eq!(token.user.id, 8);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_inactive_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                [user_model(8, "s3cret-pass", true)],
                [user_model(8, "s3cret-pass", false)],
            ])
            .into_connection();
        let service = service(&db);

        let err = service
            .login("dana@example.com", "not-the-pass")
            .await
            .expect_err("wrong password");
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Incorrect email or password"));

        let err = service
            .login("dana@example.com", "s3cret-pass")
            .await
            .expect_err("inactive user");
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Inactive user"));
    }

    #[tokio::test]
    async fn register_rejects_taken_email_or_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(2, "s3cret-pass", true)]])
            .into_connection();

        let err = service(&db)
            .register("dana@example.com", "someone", "another-pass")
            .await
            .expect_err("duplicate");
        assert_eq!(err.message(), "Email or username already registered");
    }

    #[tokio::test]
    async fn authenticate_reports_deleted_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let keys = JwtKeys::from_secret(b"auth-service-secret");
        let token = encode_token(&keys, &make_access_claims(99, vec![Role::User], 60))
            .expect("token should encode");

        let err = service(&db)
            .authenticate(&token)
            .await
            .expect_err("user is gone");
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "User not found"));
    }
}
