use std::sync::Arc;

use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::info;

use crate::database::repositories::like::LikesRepository;
use crate::database::repositories::live_changes::SurrealChangeFeed;
use crate::error::AppResult;

pub type Db = Surreal<Any>;

#[derive(Debug)]
pub struct DbConfig<'a> {
    pub url: &'a str,
    pub database: &'a str,
    pub namespace: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub client: Arc<Db>,
    pub likes: Arc<LikesRepository>,
    pub change_feed: Arc<SurrealChangeFeed>,
}

impl Database {
    pub async fn connect(config: DbConfig<'_>) -> AppResult<Self> {
        info!("->> connecting DB config = {:?}", config);
        let conn = connect(config.url).await?;

        if let (Some(password), Some(username)) = (config.password, config.username) {
            conn.signin(Root { username, password }).await?;
        }

        conn.use_ns(config.namespace)
            .use_db(config.database)
            .await?;

        let version = conn.version().await?;

        info!("->> connected DB version: {version}");
        let client = Arc::new(conn);
        Ok(Self {
            likes: Arc::new(LikesRepository::new(client.clone())),
            change_feed: Arc::new(SurrealChangeFeed::new(client.clone())),
            client,
        })
    }

    pub async fn run_migrations(&self) -> AppResult<()> {
        self.likes.mutate_db().await
    }
}
