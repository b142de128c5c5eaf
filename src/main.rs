use std::io;

use delivery_order_service::config::AppConfig;
use delivery_order_service::{build_server, create_pool, run_migrations, AppState};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    if config.service.transitions.is_permissive() {
        log::info!("Order status transitions are unrestricted");
    }
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = AppState::postgres(pool, &config.service);
    build_server(state, &config.host, config.port)?.await
}
