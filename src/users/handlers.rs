use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::{is_valid_email, password};
use crate::authz::Caller;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{
    CreateUserBody, LoginBody, MessageResponse, PublicUser, UpdateUserBody,
};
use crate::users::repo::User;
use crate::users::{MAX_USERNAME_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
}

pub fn login_routes() -> Router<AppState> {
    Router::new().route("/users/login", post(login))
}

#[instrument(skip(state, caller))]
async fn list_users(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    caller.authorize_user_admin()?;
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, caller, body))]
async fn create_user(
    State(state): State<AppState>,
    caller: Caller,
    Json(mut body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    caller.authorize_user_admin()?;

    body.username = body.username.trim().to_string();
    body.email = body.email.trim().to_lowercase();
    validate_username(&body.username)?;
    validate_role(&body.role)?;
    if !is_valid_email(&body.email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    if body.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let hash = password::hash_password(&body.password)?;
    let user = User::create(&state.db, &body.username, &body.email, &hash, &body.role).await?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, caller, body))]
async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserBody>,
) -> Result<Json<PublicUser>, ApiError> {
    caller.authorize_user_admin()?;

    let existing = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let username = match body.username {
        Some(u) => u.trim().to_string(),
        None => existing.username,
    };
    let email = match body.email {
        Some(e) => e.trim().to_lowercase(),
        None => existing.email,
    };
    let role = body.role.unwrap_or(existing.role);

    validate_username(&username)?;
    validate_role(&role)?;
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("invalid email".into()));
    }

    // The stored password only changes when a replacement is supplied, and
    // then always as a whole new hash.
    let password_hash = match body.password {
        Some(p) if p.len() < MIN_PASSWORD_LEN => {
            return Err(ApiError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Some(p) => password::hash_password(&p)?,
        None => existing.password_hash,
    };

    let user = User::update(&state.db, id, &username, &email, &password_hash, &role).await?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, caller))]
async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.authorize_user_admin()?;

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("user"));
    }

    info!(user_id = %id, "user deleted");
    Ok(Json(MessageResponse {
        message: "user deleted successfully",
    }))
}

#[instrument(skip(state, body))]
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = match User::find_by_username(&state.db, body.username.trim()).await? {
        Some(u) => u,
        None => {
            warn!(username = %body.username, "login unknown username");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !password::verify_password(&body.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(PublicUser::from(user)))
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.len() < MIN_USERNAME_LEN || username.len() > MAX_USERNAME_LEN {
        return Err(ApiError::Validation(format!(
            "username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_role(role: &str) -> Result<(), ApiError> {
    match role {
        "admin" | "user" => Ok(()),
        other => Err(ApiError::Validation(format!("unknown role: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_length_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn only_known_roles_pass() {
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("user").is_ok());
        assert!(validate_role("root").is_err());
        assert!(validate_role("").is_err());
    }

    #[test]
    fn create_body_defaults_to_user_role() {
        let body: CreateUserBody = serde_json::from_str(
            r#"{"username": "bob", "email": "bob@x.com", "password": "secret1"}"#,
        )
        .unwrap();
        assert_eq!(body.role, "user");
    }
}
