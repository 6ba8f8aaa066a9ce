mod app;
mod auth;
mod authz;
mod config;
mod error;
mod mailer;
mod metadata;
mod projects;
mod seed;
mod state;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "workplace_registry=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;

    // A registry that cannot reach its store should not accept requests, so
    // migration failures are fatal rather than warned past.
    sqlx::migrate!("./migrations").run(&state.db).await?;

    seed::seed_default_users(&state).await?;

    let app = app::build_app(state);
    app::serve(app).await
}
