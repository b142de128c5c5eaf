pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::application::{OrderService, PersonnelService, UserService};
use crate::config::ServiceSettings;
use crate::domain::ports::{CatalogRepository, OrderRepository, PersonnelRepository, UserRepository};
use crate::errors::AppError;
use crate::infrastructure::{
    DieselCatalogRepository, DieselOrderRepository, DieselPersonnelRepository, DieselUserRepository,
    JwtCredentials, MemoryStore,
};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Services shared by every worker.
pub struct AppState {
    pub orders: OrderService,
    pub personnel: PersonnelService,
    pub users: UserService,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        personnel: Arc<dyn PersonnelRepository>,
        users: Arc<dyn UserRepository>,
        settings: &ServiceSettings,
    ) -> Self {
        let credentials = Arc::new(JwtCredentials::new(
            settings.token_secret.as_bytes(),
            settings.token_ttl,
        ));
        Self {
            orders: OrderService::new(orders, catalog, settings.transitions.clone()),
            personnel: PersonnelService::new(personnel, credentials.clone(), settings.bcrypt_cost),
            users: UserService::new(users, credentials, settings.bcrypt_cost),
        }
    }

    pub fn postgres(pool: DbPool, settings: &ServiceSettings) -> Self {
        Self::new(
            Arc::new(DieselOrderRepository::new(pool.clone())),
            Arc::new(DieselCatalogRepository::new(pool.clone())),
            Arc::new(DieselPersonnelRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool)),
            settings,
        )
    }

    pub fn in_memory(store: MemoryStore, settings: &ServiceSettings) -> Self {
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            settings,
        )
    }
}

/// Registers every route, plus JSON error handling, on an actix `App`.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(state)
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
            }))
            .route("/", web::get().to(handlers::banner))
            .route("/api-docs/openapi.json", web::get().to(handlers::openapi_json))
            .route("/api/signup", web::post().to(handlers::users::signup))
            .route("/api/login", web::post().to(handlers::users::login))
            .service(
                web::scope("/api/customer")
                    .route("/register", web::post().to(handlers::personnel::register))
                    .route("/login", web::post().to(handlers::personnel::login))
                    .route(
                        "/delivery-personnel",
                        web::get().to(handlers::personnel::list_delivery_personnel),
                    )
                    .route(
                        "/availability",
                        web::put().to(handlers::personnel::set_availability),
                    )
                    .route("/place-order", web::post().to(handlers::orders::place_order))
                    .route("/orders", web::get().to(handlers::orders::list_available))
                    .route("/orders/{id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/orders/{id}/accept",
                        web::put().to(handlers::orders::accept_order),
                    )
                    .route(
                        "/orders/{id}/status",
                        web::put().to(handlers::orders::set_status),
                    ),
            );
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or spawning) the returned
/// server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure(state.clone()))
    })
    .bind((host.to_string(), port))?
    .run())
}
