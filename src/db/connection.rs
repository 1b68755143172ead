use diesel_async::{AsyncConnection, AsyncPgConnection};
use dotenvy::dotenv;
use tracing::info;

/// Connection string from the environment, `.env` included.
pub fn database_url() -> String {
    dotenv().ok();
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set")
}

pub async fn establish() -> AsyncPgConnection {
    let url = database_url();
    AsyncPgConnection::establish(&url)
        .await
        .unwrap_or_else(|e| panic!("Error connecting to {}: {}", url, e))
}

pub async fn run_migrations() {
    use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

    let conn: AsyncConnectionWrapper<AsyncPgConnection> = establish().await.into();

    // MigrationHarness is blocking.
    tokio::task::spawn_blocking(move || {
        let mut conn = conn;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .expect("Error running migrations");
        for version in applied {
            info!(%version, "applied migration");
        }
    })
    .await
    .expect("migration task panicked");
}
