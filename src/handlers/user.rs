//! User CRUD handlers. Same shape as the agent handlers minus the
//! file-upload branch; bodies are plain JSON.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::MessageResponse;
use crate::models::error::{ApiError, DuplicateField};
use crate::models::user::{NewUser, User, UserUpdate};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

fn require(value: &Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(ApiError::Validation(name.to_string())),
    }
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Parse(e.to_string()))?;

    let user = NewUser {
        user_id: Uuid::new_v4(),
        first_name: require(&req.first_name, "firstName")?,
        last_name: require(&req.last_name, "lastName")?,
        email: require(&req.email, "email")?,
        mobile_number: require(&req.mobile_number, "mobileNumber")?,
    };

    if state.users.find_by_email(&user.email).await?.is_some() {
        return Err(ApiError::Duplicate(DuplicateField::Email));
    }

    let user = state.users.insert(user).await?;
    tracing::info!("Created user: user_id={}", user.user_id);

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.find_all().await?;
    Ok(Json(users))
}

/// Get a specific user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Parse(e.to_string()))?;

    if state.users.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    let update = UserUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        mobile_number: req.mobile_number,
    };

    let user = state
        .users
        .update(id, update)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(UserResponse {
        message: "User updated successfully".to_string(),
        user,
    }))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.users.delete(id).await? {
        return Err(ApiError::NotFound("User"));
    }

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
