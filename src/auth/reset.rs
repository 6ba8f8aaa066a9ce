use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{link, password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo::User;
use crate::users::MIN_PASSWORD_LEN;

/// One pending password-reset attempt. Only the argon2 hash of the secret is
/// stored; the raw secret exists solely inside the emailed link.
///
/// Lifecycle: created -> consumed (by the conditional update in
/// [`complete`]) or expired (purely by the clock passing `expires_at`).
#[derive(Debug, Clone, FromRow)]
pub struct ResetToken {
    pub id: Uuid,
    pub email: String,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
    pub consumed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl ResetToken {
    pub async fn create(
        db: &PgPool,
        email: &str,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> Result<ResetToken, sqlx::Error> {
        sqlx::query_as::<_, ResetToken>(
            r#"
            INSERT INTO reset_tokens (email, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, email, token_hash, expires_at, consumed_at, created_at
            "#,
        )
        .bind(email)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(db)
        .await
    }

    pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<ResetToken>, sqlx::Error> {
        sqlx::query_as::<_, ResetToken>(
            r#"
            SELECT id, email, token_hash, expires_at, consumed_at, created_at
            FROM reset_tokens
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }
}

/// Issue a reset secret for `email`: persist its hash with a bounded expiry
/// and hand the packed link to the mailer. A mail failure surfaces as
/// `Internal` but leaves the stored token in place; without the emailed
/// payload it is unreachable, and the client simply requests again.
pub async fn issue(state: &AppState, email: &str) -> Result<(), ApiError> {
    // Any address without an account, well-formed or not, is the same
    // failure: there is nothing to reset.
    let email = email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let secret = password::generate_reset_secret();
    let token_hash = password::hash_password(&secret)?;

    let expires_at =
        OffsetDateTime::now_utc() + Duration::seconds(state.config.reset.token_ttl_secs);
    let token = ResetToken::create(&state.db, &user.email, &token_hash, expires_at).await?;

    let payload = link::encode(&user.email, &secret, token.id)?;
    let url = format!("{}/reset/{}", state.config.reset.frontend_base, payload);
    state.mailer.send_reset_link(&user.email, &url).await?;

    info!(email = %user.email, token_id = %token.id, "reset token issued");
    Ok(())
}

/// Verify a presented secret and, on success, atomically swap the user's
/// password and consume the token.
pub async fn complete(
    state: &AppState,
    email: &str,
    secret: &str,
    token_id: Uuid,
    new_password: &str,
) -> Result<(), ApiError> {
    if new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let token = ResetToken::find(&state.db, token_id)
        .await?
        .ok_or(ApiError::NotFound("token"))?;

    let user = User::find_by_email(&state.db, &email.trim().to_lowercase())
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    check_token(&token, email, OffsetDateTime::now_utc())?;

    if !password::verify_password(secret, &token.token_hash)? {
        warn!(token_id = %token.id, "reset secret mismatch");
        return Err(ApiError::InvalidToken);
    }

    let new_hash = password::hash_password(new_password)?;

    // Consume the token and swap the password in one transaction. The
    // conditional UPDATE is the arbiter when two completions race: only the
    // request that flips consumed_at gets to change the password.
    let mut tx = state.db.begin().await?;

    let consumed = sqlx::query(
        r#"
        UPDATE reset_tokens
        SET consumed_at = now()
        WHERE id = $1 AND consumed_at IS NULL AND expires_at > now()
        "#,
    )
    .bind(token.id)
    .execute(&mut *tx)
    .await?;

    if consumed.rows_affected() == 0 {
        return Err(ApiError::InvalidToken);
    }

    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $1, updated_at = now()
        WHERE id = $2
        "#,
    )
    .bind(&new_hash)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(user_id = %user.id, token_id = %token.id, "password reset completed");
    Ok(())
}

/// Cheap checks against a loaded token, ordered so that the caller never
/// reaches hash verification with a token that could not succeed anyway.
/// The email comparison is exact and case-sensitive: the stored value came
/// out of the same payload the client is replaying.
fn check_token(
    token: &ResetToken,
    email: &str,
    now: OffsetDateTime,
) -> Result<(), ApiError> {
    if token.email != email {
        return Err(ApiError::InvalidToken);
    }
    if token.consumed_at.is_some() {
        return Err(ApiError::InvalidToken);
    }
    if token.expires_at <= now {
        return Err(ApiError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(email: &str, ttl_secs: i64) -> ResetToken {
        let now = OffsetDateTime::now_utc();
        ResetToken {
            id: Uuid::new_v4(),
            email: email.to_string(),
            token_hash: "unused".into(),
            expires_at: now + Duration::seconds(ttl_secs),
            consumed_at: None,
            created_at: now,
        }
    }

    #[test]
    fn live_token_with_matching_email_passes() {
        let t = token("alice@x.com", 3600);
        assert!(check_token(&t, "alice@x.com", OffsetDateTime::now_utc()).is_ok());
    }

    #[test]
    fn email_mismatch_is_invalid_token() {
        let t = token("alice@x.com", 3600);
        let err = check_token(&t, "mallory@x.com", OffsetDateTime::now_utc()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn email_comparison_is_case_sensitive() {
        let t = token("alice@x.com", 3600);
        let err = check_token(&t, "Alice@x.com", OffsetDateTime::now_utc()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn consumed_token_is_invalid_even_before_expiry() {
        let mut t = token("alice@x.com", 3600);
        t.consumed_at = Some(OffsetDateTime::now_utc());
        let err = check_token(&t, "alice@x.com", OffsetDateTime::now_utc()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn past_expiry_is_expired() {
        let t = token("alice@x.com", -1);
        let err = check_token(&t, "alice@x.com", OffsetDateTime::now_utc()).unwrap_err();
        assert!(matches!(err, ApiError::Expired));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let t = token("alice@x.com", 0);
        let err = check_token(&t, "alice@x.com", t.expires_at).unwrap_err();
        assert!(matches!(err, ApiError::Expired));
    }

    #[test]
    fn issued_payload_round_trips_and_verifies() {
        // The end-to-end shape of issuance without a store: secret -> hash,
        // payload -> decode -> verify.
        let secret = password::generate_reset_secret();
        let hash = password::hash_password(&secret).expect("hash");
        let token_id = Uuid::new_v4();

        let payload = link::encode("alice@x.com", &secret, token_id).expect("encode");
        let decoded = link::decode(&payload).expect("decode");

        assert_eq!(decoded.email, "alice@x.com");
        assert_eq!(decoded.token_id, token_id);
        assert!(password::verify_password(&decoded.secret, &hash).expect("verify"));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let secret = password::generate_reset_secret();
        let hash = password::hash_password(&secret).expect("hash");
        let other = password::generate_reset_secret();
        assert!(!password::verify_password(&other, &hash).expect("verify"));
    }
}
