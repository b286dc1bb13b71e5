//! Bearer-token authentication.
//!
//! Resolution is deliberately forgiving: a missing, malformed, expired
//! or otherwise unverifiable token means "no user", never a request
//! error. Failures are logged at debug and swallowed.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::store::Store;

/// Tokens expire after 30 days.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// HS256 signing secret, installed as schema data at startup.
#[derive(Clone)]
pub struct JwtSecret(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: i32,
    exp: i64,
}

/// The authenticated user for one request.
///
/// Populated by the HTTP handler and made available to resolvers via
/// `ctx.data_opt::<CurrentUser>()`. Absent when the request carried no
/// valid token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<user::Model> for CurrentUser {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Sign a token for the given user id.
pub fn issue_token(secret: &str, user_id: i32) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp();
    let claims = Claims { sub: user_id, exp };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry; returns the user id claim on success.
pub fn verify_token(secret: &str, token: &str) -> Option<i32> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .map_err(|err| {
        tracing::debug!("rejected bearer token: {err}");
        err
    })
    .ok()
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the request's current user, if any.
pub async fn authenticate(store: &Store, secret: &str, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = bearer_token(headers)?;
    let user_id = verify_token(secret, token)?;
    match store.user(user_id).await {
        Ok(user) => user.map(CurrentUser::from),
        Err(err) => {
            tracing::debug!("failed to load user {user_id} for bearer token: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn bearer_token_extracts_the_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_rejects_missing_or_malformed_headers() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("bearer abc")), None);
    }

    #[test]
    fn issued_tokens_verify_with_the_same_secret() {
        let token = issue_token("secret", 42).unwrap();
        assert_eq!(verify_token("secret", &token), Some(42));
    }

    #[test]
    fn tokens_fail_with_a_different_secret() {
        let token = issue_token("secret", 42).unwrap();
        assert_eq!(verify_token("other", &token), None);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let exp = (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp();
        let claims = Claims { sub: 42, exp };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(verify_token("secret", &token), None);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert_eq!(verify_token("secret", "not-a-jwt"), None);
    }
}
