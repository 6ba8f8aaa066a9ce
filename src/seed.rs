use tracing::info;

use crate::auth::password;
use crate::state::AppState;
use crate::users::repo::User;

/// Create the default admin and demo accounts on an empty users table so a
/// fresh deployment is usable immediately. Passwords come from the
/// environment, with development fallbacks.
pub async fn seed_default_users(state: &AppState) -> anyhow::Result<()> {
    if User::count(&state.db).await? > 0 {
        return Ok(());
    }

    let admin_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    let admin_hash = password::hash_password(&admin_password)?;
    let admin = User::create(
        &state.db,
        "admin",
        "admin@projectmanagement.com",
        &admin_hash,
        "admin",
    )
    .await?;
    info!(user_id = %admin.id, "default admin user created (username: admin)");

    let demo_password = std::env::var("SEED_DEMO_PASSWORD").unwrap_or_else(|_| "demo123".into());
    let demo_hash = password::hash_password(&demo_password)?;
    let demo = User::create(
        &state.db,
        "demo",
        "demo@projectmanagement.com",
        &demo_hash,
        "user",
    )
    .await?;
    info!(user_id = %demo.id, "demo user created (username: demo)");

    Ok(())
}
