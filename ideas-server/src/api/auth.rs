use axum::{extract::State, Json};

use ideas_types::{LoginRequest, LoginResponse, MessageResponse, NewUser, RegisterRequest};

use super::{ApiError, ApiResult, FormOrJson};
use crate::db::DbError;
use crate::password::{hash_password, verify_password};
use crate::state::AppState;

pub const REGISTRATION_SUCCESSFUL: &str = "Registration Successful!";
pub const USER_ALREADY_EXISTS: &str = "User already exists. Try logging in.";
pub const LOGIN_SUCCESSFUL: &str = "Login successful!";

/// POST /register - Create an account
///
/// One account per `(email, type)`. The storage constraint decides, so two
/// concurrent registrations cannot both succeed.
pub async fn register(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<RegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let cost = state.bcrypt_cost;

    let created = state
        .run_blocking(move |db| {
            let new_user = NewUser {
                password: hash_password(&payload.password, cost)?,
                username: payload.username,
                user_type: payload.user_type,
                email: payload.email,
            };

            match db.create_user(&new_user) {
                Ok(user) => Ok(Some(user)),
                Err(DbError::Conflict(_)) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await?;

    let message = match created {
        Some(user) => {
            tracing::info!(user_id = user.id, user_type = %user.user_type, "User registered");
            REGISTRATION_SUCCESSFUL
        }
        None => USER_ALREADY_EXISTS,
    };

    Ok(Json(MessageResponse::new(message)))
}

/// POST /login - Check a password against the stored hash
pub async fn login(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user_id = state
        .run_blocking(move |db| {
            let user = db
                .find_user_by_email(&payload.email, payload.user_type.as_deref())?
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

            if verify_password(&payload.password, &user.password)? {
                Ok(user.id)
            } else {
                Err(ApiError::Unauthorized("Incorrect password!".to_string()))
            }
        })
        .await?;

    tracing::info!(user_id, "Login successful");
    Ok(Json(LoginResponse {
        message: LOGIN_SUCCESSFUL.to_string(),
        user_id,
    }))
}
