pub mod application;
pub mod config;
pub mod db;
pub mod docs;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
use domain::ports::{Notifier, PaymentProvider, Store};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Collaborators shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub notifier: Arc<dyn Notifier>,
    pub payments: Arc<dyn PaymentProvider>,
    pub admin_api_key: Option<String>,
}

/// Registers every API route. Shared by the server and the HTTP tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health::health))
        .service(
            web::scope("/products")
                .route("", web::get().to(handlers::products::list_products))
                .route("", web::post().to(handlers::products::create_product))
                .route("/{id}", web::get().to(handlers::products::get_product))
                .route("/{id}", web::put().to(handlers::products::update_product))
                .route("/{id}", web::delete().to(handlers::products::delete_product)),
        )
        .service(
            web::scope("/orders")
                .route("", web::post().to(handlers::orders::create_order))
                .route("", web::get().to(handlers::orders::list_orders))
                .route(
                    "/user/{user_id}",
                    web::get().to(handlers::orders::list_user_orders),
                )
                .route("/{id}", web::get().to(handlers::orders::get_order))
                .route(
                    "/{id}/status",
                    web::patch().to(handlers::orders::update_order_status),
                ),
        )
        .service(
            web::scope("/payments")
                .route(
                    "/create-preference",
                    web::post().to(handlers::payments::create_preference),
                )
                .route("/webhook", web::post().to(handlers::payments::webhook))
                .route(
                    "/payment-status/{payment_id}",
                    web::get().to(handlers::payments::payment_status),
                ),
        )
        .route("/contact", web::post().to(handlers::contact::submit_contact));
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            .configure(routes)
    })
    .bind((host.to_string(), port))?
    .run())
}
