use serde::{Deserialize, Serialize};

use crate::services::user_service::PublicUser;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn for_user(is_admin: bool) -> Vec<Role> {
        if is_admin {
            vec![Role::User, Role::Admin]
        } else {
            vec![Role::User]
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: usize,
    pub iat: usize,
    pub roles: Vec<Role>,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

/// Body returned by registration and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: usize,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::{Claims, Role};

    #[test]
    fn admins_carry_both_roles() {
        assert_eq!(Role::for_user(false), vec![Role::User]);
        assert_eq!(Role::for_user(true), vec![Role::User, Role::Admin]);
    }

    #[test]
    fn subject_parses_as_numeric_user_id() {
        let claims = Claims {
            sub: "42".to_string(),
            exp: 0,
            iat: 0,
            roles: vec![Role::User],
        };
        assert_eq!(claims.user_id(), Some(42));

        let foreign = Claims {
            sub: "alice@example.com".to_string(),
            ..claims
        };
        assert_eq!(foreign.user_id(), None);
    }
}
