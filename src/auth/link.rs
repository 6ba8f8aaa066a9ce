use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use uuid::Uuid;

use crate::error::ApiError;

/// Separator inside the decoded payload. Emails are checked against it at
/// issuance and generated secrets cannot contain it, so splitting is
/// unambiguous.
pub const DELIMITER: char = ':';

#[derive(Debug, PartialEq, Eq)]
pub struct ResetPayload {
    pub email: String,
    pub secret: String,
    pub token_id: Uuid,
}

/// Pack `email:secret:token_id` into a URL-safe opaque string for the
/// emailed link. Fields containing the delimiter never reach this point
/// (addresses are vetted at account creation, secrets are base64url), so a
/// hit here is a server-side invariant violation, not client input.
pub fn encode(email: &str, secret: &str, token_id: Uuid) -> Result<String, ApiError> {
    if email.contains(DELIMITER) || secret.contains(DELIMITER) {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "reset payload field contains the delimiter"
        )));
    }
    Ok(URL_SAFE_NO_PAD.encode(format!("{email}{DELIMITER}{secret}{DELIMITER}{token_id}")))
}

/// Reverse of [`encode`]. Anything that does not decode to exactly three
/// non-empty fields with a well-formed token id is an invalid token, never a
/// panic.
pub fn decode(payload: &str) -> Result<ResetPayload, ApiError> {
    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| ApiError::InvalidToken)?;
    let raw = String::from_utf8(raw).map_err(|_| ApiError::InvalidToken)?;

    let mut parts = raw.split(DELIMITER);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(email), Some(secret), Some(id), None) if !email.is_empty() && !secret.is_empty() => {
            let token_id = Uuid::parse_str(id).map_err(|_| ApiError::InvalidToken)?;
            Ok(ResetPayload {
                email: email.to_string(),
                secret: secret.to_string(),
                token_id,
            })
        }
        _ => Err(ApiError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let token_id = Uuid::new_v4();
        let payload = encode("alice@x.com", "s3cr3t-_value", token_id).expect("encode");
        let decoded = decode(&payload).expect("payload should decode");
        assert_eq!(decoded.email, "alice@x.com");
        assert_eq!(decoded.secret, "s3cr3t-_value");
        assert_eq!(decoded.token_id, token_id);
    }

    #[test]
    fn payload_is_url_safe() {
        let payload = encode("alice@x.com", "secret", Uuid::new_v4()).expect("encode");
        assert!(payload
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn encode_refuses_fields_containing_the_delimiter() {
        assert!(encode("a:b@x.com", "secret", Uuid::new_v4()).is_err());
        assert!(encode("a@x.com", "sec:ret", Uuid::new_v4()).is_err());
    }

    #[test]
    fn rejects_non_base64_input() {
        let err = decode("not valid base64!!").unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let two_fields = URL_SAFE_NO_PAD.encode("alice@x.com:secret-only");
        assert!(matches!(
            decode(&two_fields).unwrap_err(),
            ApiError::InvalidToken
        ));

        let four_fields =
            URL_SAFE_NO_PAD.encode(format!("a@x.com:s:{}:extra", Uuid::new_v4()));
        assert!(matches!(
            decode(&four_fields).unwrap_err(),
            ApiError::InvalidToken
        ));
    }

    #[test]
    fn rejects_malformed_token_id() {
        let bad_id = URL_SAFE_NO_PAD.encode("alice@x.com:secret:not-a-uuid");
        assert!(matches!(
            decode(&bad_id).unwrap_err(),
            ApiError::InvalidToken
        ));
    }

    #[test]
    fn rejects_empty_fields() {
        let empty_email = URL_SAFE_NO_PAD.encode(format!(":secret:{}", Uuid::new_v4()));
        assert!(matches!(
            decode(&empty_email).unwrap_err(),
            ApiError::InvalidToken
        ));

        let empty_secret = URL_SAFE_NO_PAD.encode(format!("a@x.com::{}", Uuid::new_v4()));
        assert!(matches!(
            decode(&empty_secret).unwrap_err(),
            ApiError::InvalidToken
        ));
    }

    #[test]
    fn rejects_non_utf8_payload() {
        let err = decode(&URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }
}
