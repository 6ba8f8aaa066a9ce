use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use crate::auth::dto::{CompleteResetBody, MessageResponse, RequestResetBody};
use crate::auth::reset;
use crate::error::ApiError;
use crate::state::AppState;

pub fn reset_routes() -> Router<AppState> {
    Router::new()
        .route("/reset/request", post(request_reset))
        .route("/reset/complete", post(complete_reset))
}

#[instrument(skip(state, body))]
async fn request_reset(
    State(state): State<AppState>,
    Json(body): Json<RequestResetBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    reset::issue(&state, &body.email).await?;
    Ok(Json(MessageResponse {
        message: "reset link sent",
    }))
}

#[instrument(skip(state, body))]
async fn complete_reset(
    State(state): State<AppState>,
    Json(body): Json<CompleteResetBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    reset::complete(
        &state,
        &body.email,
        &body.reset_token,
        body.token_id,
        &body.password,
    )
    .await?;
    Ok(Json(MessageResponse {
        message: "password reset successful",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_body_uses_frontend_field_names() {
        let body: CompleteResetBody = serde_json::from_str(
            r#"{
                "email": "alice@x.com",
                "resetToken": "raw-secret",
                "password": "NewPass1",
                "tokenId": "6f0e1bde-66f1-4c0f-9c8a-2b8a3f3f8a11"
            }"#,
        )
        .unwrap();
        assert_eq!(body.email, "alice@x.com");
        assert_eq!(body.reset_token, "raw-secret");
        assert_eq!(body.password, "NewPass1");
    }

    #[test]
    fn complete_body_rejects_missing_token_id() {
        let res = serde_json::from_str::<CompleteResetBody>(
            r#"{"email": "a@x.com", "resetToken": "s", "password": "p"}"#,
        );
        assert!(res.is_err());
    }
}
