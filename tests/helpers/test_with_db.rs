#[macro_export]
macro_rules! test_with_db {
    ($name:ident, |$db:ident, $config:ident| $body:block) => {
        #[tokio::test(flavor = "multi_thread")]
        #[serial_test::serial]
        async fn $name() {
            use futures::FutureExt;
            use like_state::config::AppConfig;
            use like_state::database::client::{Database, DbConfig};
            use std::panic::resume_unwind;

            let $config = AppConfig {
                db_namespace: "test".to_string(),
                db_database: "test".to_string(),
                db_password: None,
                db_username: None,
                db_url: "mem://".to_string(),
                read_timeout_ms: 5_000,
                write_timeout_ms: 5_000,
            };

            let $db = Database::connect(DbConfig {
                url: &$config.db_url,
                database: &$config.db_database,
                namespace: &$config.db_namespace,
                password: $config.db_password.as_deref(),
                username: $config.db_username.as_deref(),
            })
            .await
            .expect("db connects");
            $db.run_migrations().await.expect("migrations run");

            let test_result = std::panic::AssertUnwindSafe(async {
                (|| async $body)().await;
            })
            .catch_unwind()
            .await;

            $db.client
                .query(format!("REMOVE DATABASE {};", $config.db_database))
                .await
                .expect("failed to remove database");

            if let Err(panic) = test_result {
                resume_unwind(panic);
            }
        }
    };
}
