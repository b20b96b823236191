//! # navedex: Ownership-Scoped Directory Service
//!
//! `navedex` is a small internal directory application. It registers and
//! authenticates users, and lets each authenticated user manage employee
//! records ("navers") and projects, with a many-to-many relationship between
//! them. Every resource belongs to the user who created it: a resource is
//! visible and mutable only to its owner, and cross-owner access is
//! indistinguishable from a missing resource.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence.
//!
//! The **API layer** ([`api`]) exposes RESTful CRUD endpoints for navers and
//! projects, plus registration and login. Each resource has three typed
//! representations: a flat summary for lists, an id-based write shape for
//! create/update, and a detail shape with nested summaries of the related
//! resource.
//!
//! The **authentication layer** ([`auth`]) issues bearer tokens (signed JWTs)
//! on login and resolves the `Authorization: Bearer` header into a
//! [`api::models::users::CurrentUser`] before any handler logic runs.
//!
//! The **database layer** ([`db`]) uses the repository pattern. Each owned
//! entity has a repository implementing
//! [`db::handlers::OwnedRepository`], which scopes every query to the owning
//! user. Writes that touch association rows run inside a single transaction.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use navedex::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = navedex::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     navedex::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs
//! migrations on startup via [`migrator`].

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use axum::http::HeaderValue;
use axum::{
    Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use config::CorsOrigin;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;

pub use types::{NaverId, ProjectId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from environment/files
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the navedex database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.cors.allow_credentials);

    if let Some(max_age) = config.auth.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Authentication routes (register, login)
/// - Naver and Project CRUD routes
/// - OpenAPI document endpoint
/// - CORS configuration
/// - Tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication routes (open, no bearer token required)
    let auth_routes = Router::new()
        .route("/register", post(api::handlers::auth::register))
        .route("/login", post(api::handlers::auth::login))
        .with_state(state.clone());

    // Resource routes; every handler resolves the caller from its bearer token
    let resource_routes = Router::new()
        .route("/navers", get(api::handlers::navers::list_navers).post(api::handlers::navers::create_naver))
        .route(
            "/navers/{id}",
            get(api::handlers::navers::get_naver)
                .patch(api::handlers::navers::update_naver)
                .put(api::handlers::navers::replace_naver)
                .delete(api::handlers::navers::delete_naver),
        )
        .route(
            "/projects",
            get(api::handlers::projects::list_projects).post(api::handlers::projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(api::handlers::projects::get_project)
                .patch(api::handlers::projects::update_project)
                .put(api::handlers::projects::replace_project)
                .delete(api::handlers::projects::delete_project),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(openapi::ApiDoc::openapi()) }),
        )
        .merge(auth_routes)
        .merge(resource_routes);

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database and runs
///    migrations
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts
///    handling requests
/// 3. **Shutdown**: when the shutdown signal resolves, the server drains and
///    database connections are closed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool_settings = &config.database.pool;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(pool_settings.max_connections)
            .min_connections(pool_settings.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(pool_settings.acquire_timeout_secs))
            .connect(&config.database.url)
            .await?;

        migrator().run(&pool).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "navedex listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
