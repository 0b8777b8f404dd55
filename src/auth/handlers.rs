use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument, warn};

use super::{
    dto::{
        AuthResponse, LoginRequest, SignupRequest, StatusResponse, UpdateMeRequest,
        UpdatePasswordRequest, UserResponse,
    },
    extractors::CurrentUser,
    password::{hash_password, validate_new_password, verify_password},
    repo::is_unique_violation,
    repo_types::User,
    services::{expired_cookie, issue_session, require, validated_email},
};
use crate::{
    error::{AppError, AppResult},
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/getMe", get(get_me))
        .route("/auth/updateMe", patch(update_me))
        .route("/auth/updateMyPassword", patch(update_my_password))
}

fn email_taken() -> AppError {
    AppError::Conflict("Email already registered".into())
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let name = require(payload.name.as_deref(), "Please enter your name")?;
    let email = validated_email(require(payload.email.as_deref(), "Please enter your email")?)?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("Please enter a password"))?;
    validate_new_password(password)?;

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(email_taken());
    }

    let hash = hash_password(password)?;
    let user = match User::create(&state.db, name, &email, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => return Err(email_taken()),
        Err(e) => return Err(e.into()),
    };

    let (cookie, body) = issue_session(&state, &user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, jar.add(cookie), Json(body)))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let (Some(email), Some(password)) = (
        payload.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
        payload.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation("Please provide email and password"));
    };
    let email = email.to_lowercase();

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::unauthorized("Incorrect email or password"));
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized("Incorrect email or password"));
    }

    let (cookie, body) = issue_session(&state, &user)?;
    info!(user_id = %user.id, "user logged in");
    Ok((jar.add(cookie), Json(body)))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<StatusResponse>) {
    (
        jar.add(expired_cookie(&state.config)),
        Json(StatusResponse { status: "success" }),
    )
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse {
        status: "success",
        user,
    })
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<UpdateMeRequest>,
) -> AppResult<Json<UserResponse>> {
    if payload.password.is_some() {
        return Err(AppError::validation(
            "This route is not for password updates. Use /updateMyPassword.",
        ));
    }

    let name = match payload.name.as_deref() {
        Some(n) => Some(require(Some(n), "Name must not be empty")?),
        None => None,
    };
    let email = match payload.email.as_deref() {
        Some(e) => Some(validated_email(e)?),
        None => None,
    };

    if let Some(email) = email.as_deref() {
        if email != user.email && User::find_by_email(&state.db, email).await?.is_some() {
            return Err(email_taken());
        }
    }

    let updated = match User::update_profile(&state.db, user.id, name, email.as_deref()).await {
        Ok(Some(u)) => u,
        Ok(None) => return Err(AppError::not_found("User not found")),
        Err(e) if is_unique_violation(&e) => return Err(email_taken()),
        Err(e) => return Err(e.into()),
    };

    info!("profile updated");
    Ok(Json(UserResponse {
        status: "success",
        user: updated,
    }))
}

#[instrument(skip(state, jar, user, payload), fields(user_id = %user.id))]
pub async fn update_my_password(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<UpdatePasswordRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let (Some(current), Some(new)) = (
        payload.current_password.as_deref(),
        payload.new_password.as_deref(),
    ) else {
        return Err(AppError::validation(
            "Please provide currentPassword and newPassword",
        ));
    };

    if !verify_password(current, &user.password_hash)? {
        warn!("wrong current password");
        return Err(AppError::unauthorized("Your current password is incorrect"));
    }
    validate_new_password(new)?;

    let hash = hash_password(new)?;
    let user = User::update_password(&state.db, user.id, &hash).await?;

    let (cookie, body) = issue_session(&state, &user)?;
    info!("password changed");
    Ok((jar.add(cookie), Json(body)))
}
