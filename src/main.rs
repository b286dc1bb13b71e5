use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hackernews::auth::JwtSecret;
use hackernews::config::{Config, DEV_JWT_SECRET};
use hackernews::graphql;
use hackernews::migration::Migrator;
use hackernews::server::{self, AppState};
use hackernews::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sqlx=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    if config.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("JWT_SECRET is not set, falling back to the insecure development secret");
    }

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connected!");

    tracing::info!("Running migrations...");
    Migrator::up(&db, None).await?;

    let store = Store::new(db);
    let schema = graphql::build_schema(store.clone(), JwtSecret(config.jwt_secret.clone()));

    let state = AppState {
        schema,
        store,
        jwt_secret: JwtSecret(config.jwt_secret),
    };
    let app = server::router(state);

    tracing::info!("GraphQL server listening on http://{}", config.listen_addr);
    tracing::info!("Apollo Sandbox available at http://{}/", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
