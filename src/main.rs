use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use santa_algo::config::Settings;
use santa_algo::core::{Matcher, MatcherSettings, Notifier};
use santa_algo::models::ErrorResponse;
use santa_algo::routes::{self, AppState};
use santa_algo::services::{PostgresClient, SessionStore, TelegramNotifier};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// JSON error for malformed request payloads
#[derive(Debug)]
struct JsonError(ErrorResponse);

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle JSON payload errors
fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError(ErrorResponse {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    })
    .into()
}

/// Handle path parameter errors
fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError(ErrorResponse {
        error: "invalid_path".to_string(),
        message: format!("Invalid path parameter: {}", err),
        status_code: 400,
    })
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so its level applies
    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        io_error(e)
    })?;

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_logging(&log_level, &log_format);

    info!("Starting Santa Algo service...");

    if settings.admin.api_key.trim().is_empty() {
        error!("admin.api_key is empty: administrator routes will reject every request");
    }

    let notifier: Arc<dyn Notifier> = Arc::new(
        TelegramNotifier::new(
            settings.telegram.api_base.clone(),
            settings.telegram.bot_token.clone(),
            settings.telegram.timeout_secs,
        )
        .map_err(|e| {
            error!("Failed to create Telegram client: {}", e);
            io_error(e)
        })?,
    );

    info!("Telegram notifier initialized");

    let db = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            io_error(e)
        })?,
    );

    info!("PostgreSQL client initialized");

    let sessions = Arc::new(SessionStore::new(
        settings.sessions.capacity,
        settings.sessions.ttl_secs,
    ));

    let matcher = Matcher::new(MatcherSettings::from(&settings.matching));

    info!("Matcher initialized with {:?}", matcher.settings());

    let app_state = AppState {
        db,
        notifier,
        sessions,
        matcher,
        admin_key: Arc::from(settings.admin.api_key.as_str()),
        matching_seed: settings.matching.seed,
        notify_concurrency: settings.notifications.concurrency,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
