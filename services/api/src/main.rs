use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

use api::{
    repositories::{
        UserRepository, catalog::CatalogRepository, orders::OrderRepository,
        reviews::ReviewRepository, shipping::ShippingAddressRepository,
    },
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting marketplace API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());
    let catalog_repository = CatalogRepository::new(pool.clone());
    let order_repository = OrderRepository::new(pool.clone());
    let shipping_repository = ShippingAddressRepository::new(pool.clone());
    let review_repository = ReviewRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        user_repository,
        catalog_repository,
        order_repository,
        shipping_repository,
        review_repository,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API service listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
