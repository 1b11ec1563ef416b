use std::io;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use taskboard::config::Config;
use taskboard::routes;
use taskboard::state::AppState;
use taskboard::store::{MemoryStore, PgStore, Store};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            store
                .migrate()
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            log::info!("connected to PostgreSQL, migrations applied");
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store, data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    if config.linear_webhook_secret.is_none() {
        log::warn!("LINEAR_WEBHOOK_SECRET is not set; webhook deliveries will be rejected");
    }

    let state = web::Data::new(AppState::new(
        store,
        config.jwt_secret.clone(),
        config.linear_webhook_secret.clone(),
    ));

    log::info!("Starting TaskBoard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(routes::cors())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
