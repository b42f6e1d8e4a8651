use std::sync::Arc;

use like_state::config::AppConfig;
use like_state::database::client::{Database, DbConfig};
use like_state::error::AppResult;
use like_state::services::like_controller::LikeController;
use like_state::utils::log_notifier::LogNotifier;
use like_state::utils::session_auth::SessionAuth;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env();
    let post_id = std::env::var("DEMO_POST_ID").unwrap_or("welcome".to_string());
    let user_id = std::env::var("DEMO_USER_ID").unwrap_or("demo_user".to_string());

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await?;
    db.run_migrations().await?;

    if let Err(err) = db.likes.create_post(&post_id).await {
        warn!(post_id, error = ?err, "post not seeded, it probably exists");
    }

    let controller = LikeController::new(
        db.likes.clone(),
        db.change_feed.clone(),
        Arc::new(SessionAuth::signed_in(&user_id)),
        Arc::new(LogNotifier),
        config.controller_config(),
    );
    let mut states = controller.watch();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            info!(
                liked = state.is_liked,
                likes = state.likes_count,
                phase = %state.phase,
                "like state"
            );
        }
    });

    controller.bind(Some(&post_id)).await;
    for _ in 0..2 {
        let outcome = controller.toggle_like().await;
        info!(?outcome, "toggled");
    }
    controller.teardown().await;

    info!(active = db.change_feed.active_subscriptions(), "done");
    Ok(())
}
