use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /reset/request`.
#[derive(Debug, Deserialize)]
pub struct RequestResetBody {
    pub email: String,
}

/// Body of `POST /reset/complete`. The fields mirror what the frontend
/// unpacks from the emailed payload, plus the replacement password.
#[derive(Debug, Deserialize)]
pub struct CompleteResetBody {
    pub email: String,
    #[serde(rename = "resetToken")]
    pub reset_token: String,
    pub password: String,
    #[serde(rename = "tokenId")]
    pub token_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
