//! # Account Routes
//!
//! Registration, login and the caller's own profile.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /login { email, password }                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lookup by lowercase email ──► none? ──► 401 "Invalid email or password"│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  argon2 verify (blocking pool) ──► mismatch? ──► same 401              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JWT (24h) + user DTO                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::validation::{validate_email, validate_name, validate_password};
use storefront_core::{Role, MIN_PASSWORD_LENGTH};
use storefront_db::{DbError, NewUser, ProfileUpdate};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::dto::UserDto;
use crate::error::{ApiError, ApiResult};
use crate::response::Envelope;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthBody {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: UserDto,
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal("Failed to hash password")
        })?
}

async fn verify_blocking(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Envelope<AuthBody>> {
    let Json(req) = payload?;

    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("All fields are required"));
    }

    if req.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let name = validate_name(&req.name)?;
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    let users = state.db.users();
    let duplicate = || ApiError::conflict("User already exists with this email");

    if users.get_by_email(&email).await?.is_some() {
        return Err(duplicate());
    }

    let password_hash = hash_blocking(req.password).await?;

    let user = users
        .insert(NewUser {
            name,
            email,
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(|e| match e {
            DbError::UniqueViolation { .. } => duplicate(),
            other => other.into(),
        })?;

    let token = state.jwt.generate_token(&user)?;
    info!(user_id = %user.id, "User registered");

    Ok(Envelope::created(
        "Registration successful!",
        AuthBody {
            token,
            user: user.into(),
        },
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Envelope<AuthBody>> {
    let Json(req) = payload?;

    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let email = req.email.trim().to_lowercase();
    let invalid = || ApiError::unauthenticated("Invalid email or password");

    let Some(user) = state.db.users().get_by_email(&email).await? else {
        warn!(email = %email, "Login for unknown email");
        return Err(invalid());
    };

    if !verify_blocking(req.password, user.password_hash.clone()).await {
        warn!(user_id = %user.id, "Login with wrong password");
        return Err(invalid());
    }

    let token = state.jwt.generate_token(&user)?;
    info!(user_id = %user.id, "User logged in");

    Ok(Envelope::with_message(
        "Login successful!",
        AuthBody {
            token,
            user: user.into(),
        },
    ))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Envelope<UserBody>> {
    let user = state
        .db
        .users()
        .get_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Envelope::ok(UserBody { user: user.into() }))
}

/// Applies whichever of name, email and password the caller sent.
///
/// A password change needs both `currentPassword` and `newPassword`.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> ApiResult<Envelope<UserBody>> {
    let Json(req) = payload?;
    let users = state.db.users();

    let user = users
        .get_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut update = ProfileUpdate::default();

    if let Some(name) = non_empty(req.name) {
        let name = validate_name(&name)?;
        if name != user.name {
            update.name = Some(name);
        }
    }

    if let Some(email) = non_empty(req.email) {
        let email = validate_email(&email)?;
        if email != user.email {
            if users.email_taken_by_other(&email, &user.id).await? {
                return Err(ApiError::conflict("Email already exists"));
            }
            update.email = Some(email);
        }
    }

    if let (Some(current), Some(new)) = (non_empty(req.current_password), non_empty(req.new_password)) {
        if !verify_blocking(current, user.password_hash.clone()).await {
            warn!(user_id = %user.id, "Profile update with wrong current password");
            return Err(ApiError::unauthenticated("Current password is incorrect"));
        }

        if new.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::validation(format!(
                "New password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        validate_password(&new)?;

        update.password_hash = Some(hash_blocking(new).await?);
    }

    if update.is_empty() {
        return Err(ApiError::validation("No changes provided for update"));
    }

    let updated = users
        .update_profile(&user.id, update)
        .await
        .map_err(|e| match e {
            DbError::UniqueViolation { .. } => ApiError::conflict("Email already exists"),
            other => other.into(),
        })?;

    info!(user_id = %updated.id, "Profile updated");

    Ok(Envelope::with_message(
        "Profile updated successfully",
        UserBody {
            user: updated.into(),
        },
    ))
}
