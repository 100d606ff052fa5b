use std::sync::Arc;

use dotenvy::dotenv;
use storefront_service::config::{Config, StoreBackend};
use storefront_service::domain::ports::{PaymentProvider, Store};
use storefront_service::infrastructure::diesel_store::DieselStore;
use storefront_service::infrastructure::memory_store::InMemoryStore;
use storefront_service::infrastructure::mercadopago::{MercadoPagoClient, SandboxPaymentProvider};
use storefront_service::infrastructure::notifier::LogNotifier;
use storefront_service::{build_server, create_pool, run_migrations, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let store: Arc<dyn Store> = match (config.store_backend, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(database_url)) => {
            let pool = create_pool(database_url).map_err(std::io::Error::other)?;
            run_migrations(&pool).map_err(std::io::Error::other)?;
            Arc::new(DieselStore::new(pool))
        }
        _ => {
            log::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let payments: Arc<dyn PaymentProvider> = match config.mercadopago_access_token.as_deref() {
        Some(token) => Arc::new(MercadoPagoClient::new(
            token,
            config.mercadopago_api_url.as_str(),
            config.frontend_url.as_str(),
            config.backend_url.as_str(),
        )),
        None => {
            log::warn!("MERCADOPAGO_ACCESS_TOKEN not set; using the sandbox payment provider");
            Arc::new(SandboxPaymentProvider::new())
        }
    };

    if config.admin_api_key.is_none() {
        log::warn!("ADMIN_API_KEY not set; admin routes are open");
    }

    let state = AppState {
        store,
        notifier: Arc::new(LogNotifier::new(config.admin_email.clone())),
        payments,
        admin_api_key: config.admin_api_key.clone(),
    };

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
