use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{Claims, Role};
use crate::error::AppError;

pub const TOKEN_TYPE: &str = "bearer";

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

pub fn now_unix() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as usize)
        .unwrap_or_default()
}

pub fn encode_token(keys: &JwtKeys, claims: &Claims) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc)
        .map_err(|err| AppError::internal(format!("Token encoding failed: {err}")))
}

pub fn decode_token(keys: &JwtKeys, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    Ok(decode::<Claims>(token, &keys.dec, &validation)?.claims)
}

pub fn make_access_claims(user_id: i32, roles: Vec<Role>, ttl_secs: usize) -> Claims {
    let iat = now_unix();
    Claims {
        sub: user_id.to_string(),
        roles,
        iat,
        exp: iat + ttl_secs,
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!(error = %err, "rejected bearer token");
        AppError::unauthorized("Could not validate credentials")
    }
}

#[cfg(test)]
mod tests {
    use super::{JwtKeys, Role, decode_token, encode_token, make_access_claims};
    use crate::error::AppError;

    #[test]
    fn claims_carry_subject_roles_and_ttl() {
        let claims = make_access_claims(17, vec![Role::User], 1800);

        assert_eq!(claims.sub, "17");
        assert_eq!(claims.roles, vec![Role::User]);
        assert_eq!(claims.exp.saturating_sub(claims.iat), 1800);
    }

    #[test]
    fn token_decodes_with_same_secret_only() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let claims = make_access_claims(3, Role::for_user(true), 600);
        let token = encode_token(&keys, &claims).expect("token should encode");

        let decoded = decode_token(&keys, &token).expect("token should decode");
        assert_eq!(decoded.user_id(), Some(3));
        assert_eq!(decoded.roles, vec![Role::User, Role::Admin]);

        let other = JwtKeys::from_secret(b"another-secret");
        let err = decode_token(&other, &token).expect_err("foreign secret must fail");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let keys = JwtKeys::from_secret(b"unit-test-secret");
        let mut claims = make_access_claims(3, vec![Role::User], 0);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = encode_token(&keys, &claims).expect("token should encode");

        let err = decode_token(&keys, &token).expect_err("expired token must fail");
        assert_eq!(err.message(), "Could not validate credentials");
    }
}
