use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use chrono::Duration;
use crypto_core::TokenCodec;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts_service::db::{MemoryStore, PgStore, Store};
use tts_service::storage::BlobStore;
use tts_service::{handlers, AppState, Config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting TTS Service");

    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;
    if config.auth.secret_is_fallback {
        warn!("JWT_SECRET is not set; using an insecure development fallback");
    }

    let codec = Arc::new(TokenCodec::new(
        config.auth.jwt_secret.as_bytes(),
        Duration::hours(config.auth.token_ttl_hours),
    ));

    BlobStore::new(config.media.dir.clone())
        .ensure_root()
        .await
        .with_context(|| format!("failed to create media dir {}", config.media.dir.display()))?;

    let store: Arc<dyn Store> = match &config.database {
        Some(database) => {
            let db_config =
                db_pool::DbConfig::new("tts-service", &database.url, database.max_connections);
            db_config.log_config();
            let pool = db_pool::create_pool(db_config)
                .await
                .context("failed to connect to database")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run database migrations")?;
            info!("Database migrations applied");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; using in-memory storage (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    let state = web::Data::new(AppState::new(store, codec, &config.media));
    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();

    info!(address = %bind_address, env = %config.app.env, "HTTP server listening");

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &allowed_origins {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(12 * 3600);

        let codec = state.codec.clone();
        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(|cfg| handlers::configure(cfg, codec))
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    Ok(())
}
