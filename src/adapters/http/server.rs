use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers;
use crate::domain::models::{Config, PersonaRegistry, ServerConfig};
use crate::domain::ports::CompletionGateway;
use crate::services::{CompletionProxy, StudyCalendar, TemplateFallback, TieredGenerator};

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for HttpServerConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}

/// Shared, read-only state for every request.
pub struct AppState {
    pub proxy: CompletionProxy,
    pub generator: TieredGenerator,
    pub calendar: StudyCalendar,
}

impl AppState {
    /// Wire the services over `gateway` using the loaded configuration.
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: &Config) -> Self {
        let personas = Arc::new(PersonaRegistry::with_overrides(&config.personas));
        let proxy = CompletionProxy::new(gateway, personas, config.gateway.model.clone());
        let generator = TieredGenerator::new(proxy.clone(), Arc::new(TemplateFallback));
        Self {
            proxy,
            generator,
            calendar: StudyCalendar::new(&config.exams),
        }
    }
}

/// Build the router with all endpoints.
///
/// CORS is the outermost layer so error responses and preflight requests
/// carry the headers too.
pub fn build_router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    let mut router = Router::new()
        .route("/v1/generate/stream", post(handlers::generate_stream))
        .route("/v1/generate/text", post(handlers::generate_text))
        .route("/v1/generate/questions", post(handlers::generate_questions))
        .route("/v1/format", post(handlers::format_text))
        .route("/v1/personas", get(handlers::list_personas))
        .route("/v1/countdown", get(handlers::countdown))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(trace);

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Mentor gateway HTTP server.
pub struct GatewayHttpServer {
    state: Arc<AppState>,
    config: HttpServerConfig,
}

impl GatewayHttpServer {
    pub fn new(state: AppState, config: HttpServerConfig) -> Self {
        Self {
            state: Arc::new(state),
            config,
        }
    }

    /// Router over this server's state.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.enable_cors)
    }

    fn addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
        Ok(format!("{}:{}", self.config.host, self.config.port).parse()?)
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = self.router();

        tracing::info!("Mentor gateway listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
