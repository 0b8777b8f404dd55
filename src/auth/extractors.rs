use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use super::{
    jwt::JwtKeys,
    repo_types::{Role, User},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "jwt";

/// Bearer token from the Authorization header, else the session cookie.
pub(crate) fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// The authenticated user, loaded fresh from the database.
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Guard for role-gated handlers; every current route is open to all roles.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn restrict_to(&self, roles: &[Role]) -> AppResult<()> {
        if roles.contains(&self.0.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission to perform this action".into(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(|| {
            AppError::unauthorized("You are not logged in! Please log in to get access.")
        })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::unauthorized("Invalid or expired token")
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token for missing user");
                AppError::unauthorized("The user belonging to this token no longer exists.")
            })?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, Request};
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn parts(headers: &[(axum::http::HeaderName, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/getMe");
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: "x".into(),
            role,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn token_from_bearer_header() {
        let p = parts(&[(AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(token_from_parts(&p).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn token_from_cookie() {
        let p = parts(&[(COOKIE, "theme=dark; jwt=cookie.token.value")]);
        assert_eq!(token_from_parts(&p).as_deref(), Some("cookie.token.value"));
    }

    #[test]
    fn header_wins_over_cookie() {
        let p = parts(&[(AUTHORIZATION, "Bearer from-header"), (COOKIE, "jwt=from-cookie")]);
        assert_eq!(token_from_parts(&p).as_deref(), Some("from-header"));
    }

    #[test]
    fn non_bearer_scheme_falls_back_to_cookie() {
        let p = parts(&[(AUTHORIZATION, "Basic dXNlcjpwYXNz")]);
        assert_eq!(token_from_parts(&p), None);
        let p = parts(&[(AUTHORIZATION, "Basic dXNlcjpwYXNz"), (COOKIE, "jwt=c")]);
        assert_eq!(token_from_parts(&p).as_deref(), Some("c"));
    }

    #[test]
    fn empty_bearer_is_missing() {
        let p = parts(&[(AUTHORIZATION, "Bearer   ")]);
        assert_eq!(token_from_parts(&p), None);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let state = AppState::fake();
        let mut p = parts(&[]);
        let err = CurrentUser::from_request_parts(&mut p, &state)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let state = AppState::fake();
        let mut p = parts(&[(AUTHORIZATION, "Bearer not.a.jwt")]);
        let err = CurrentUser::from_request_parts(&mut p, &state)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Invalid or expired token"));
    }

    #[test]
    fn restrict_to_checks_role() {
        assert!(CurrentUser(user(Role::Admin)).restrict_to(&[Role::Admin]).is_ok());
        let err = CurrentUser(user(Role::User))
            .restrict_to(&[Role::Admin])
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
