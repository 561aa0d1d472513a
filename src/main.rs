use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use storefront::config::Config;
use storefront::migrations::Migrator;
use storefront::store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let config = Config::from_env();
    let db: DatabaseConnection = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let store = Store::new(db);
    let app = storefront::app::router(store);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "storefront API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
