use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use time::Duration as TimeDuration;

use super::{
    dto::{AuthResponse, PublicUser},
    extractors::AUTH_COOKIE,
    jwt::JwtKeys,
    repo_types::User,
};
use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Required, trimmed, non-empty string field.
pub(crate) fn require<'a>(value: Option<&'a str>, message: &str) -> AppResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(message))
}

pub(crate) fn validated_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(AppError::validation("Please provide a valid email"));
    }
    Ok(email)
}

pub(crate) fn session_cookie(token: String, cfg: &AppConfig) -> Cookie<'static> {
    let production = cfg.environment.is_production();
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(if production { SameSite::None } else { SameSite::Lax })
        .max_age(TimeDuration::minutes(cfg.jwt.ttl_minutes))
        .build()
}

pub(crate) fn expired_cookie(cfg: &AppConfig) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), cfg);
    cookie.make_removal();
    cookie
}

/// Mint a token for `user` and wrap it with the matching session cookie.
pub(crate) fn issue_session(
    state: &AppState,
    user: &User,
) -> AppResult<(Cookie<'static>, AuthResponse)> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id)?;
    let cookie = session_cookie(token.clone(), &state.config);
    Ok((
        cookie,
        AuthResponse {
            status: "success",
            token,
            user: PublicUser::from(user),
        },
    ))
}
