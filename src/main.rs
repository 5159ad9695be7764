use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use plantao_api::application::auth_service::AuthService;
use plantao_api::application::hospital_service::HospitalService;
use plantao_api::data::hospital_repository::InMemoryHospitalRepository;
use plantao_api::data::user_repository::InMemoryUserRepository;
use plantao_api::infrastructure::config::AppConfig;
use plantao_api::infrastructure::logging::init_logging;
use plantao_api::infrastructure::notifier::LoggingNotifier;
use plantao_api::presentation::handlers::AppState;
use plantao_api::presentation::middleware::{JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware};
use plantao_api::presentation::routes;
use std::sync::Arc;
use tracing::{error, info, instrument};

fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .expose_headers(["x-request-id", "x-inertia", "x-inertia-location"])
            .supports_credentials()
            .max_age(3600),
        None => Cors::default(),
    }
}

#[tokio::main]
#[instrument]
async fn main() -> std::io::Result<()> {
    init_logging();
    info!("Logging initialized");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    info!(environment = ?config.environment, app_url = %config.app_url, "Configuration loaded");

    let user_repository = InMemoryUserRepository::new();
    let hospital_repository = InMemoryHospitalRepository::new();

    let notifier = Arc::new(LoggingNotifier::new(config.app_url.clone()));
    let auth_service = AuthService::new(
        Arc::new(user_repository),
        notifier,
        config.jwt_secret.clone(),
    )
    .with_token_ttl(config.token_ttl_secs);
    let hospital_service = HospitalService::new(Arc::new(hospital_repository));

    if config.seed_sample_data {
        hospital_service.seed_sample_data().await.map_err(|e| {
            error!(error = %e, "Failed to seed sample data");
            std::io::Error::other(e.to_string())
        })?;
    }

    let state = web::Data::new(AppState {
        auth_service: Arc::new(auth_service),
        hospital_service,
        asset_version: config.asset_version.clone(),
    });
    info!("Application state initialized");

    let jwt_secret = config.jwt_secret.clone();
    let cors_origin = config.cors_allowed_origin.clone();
    let server = HttpServer::new(move || {
        tracing::trace!("Creating new application instance");
        App::new()
            .app_data(state.clone())
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .wrap(cors(cors_origin.as_deref()))
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .configure(routes::configure)
    });

    let (host, port) = config.bind_address();
    info!(host = %host, port, "Binding server");
    let server = server.bind((host.as_str(), port))?;

    info!(
        routes = %"GET /, POST /register, POST /login, POST /logout, GET /dashboard, /hospitals (index, create, store, edit, update, destroy), /settings/{profile,password}",
        "Starting HTTP server"
    );
    server.run().await
}
