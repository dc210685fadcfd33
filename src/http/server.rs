//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, panic catcher, limits, capture)
//! - Own the shared logs and the swappable forwarder
//! - Apply hot-reloaded forwarding settings
//! - Serve until the shutdown signal fires

use arc_swap::ArcSwap;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::capture::LogStore;
use crate::config::{AppConfig, ServerMode};
use crate::forward::{ForwardError, Forwarder};
use crate::http::{handlers, request::capture_request, response};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub logs: Arc<LogStore>,
    pub forwarder: Arc<ArcSwap<Forwarder>>,
    pub mode: ServerMode,
    pub max_body_size: usize,
}

impl AppState {
    /// Fresh logs and a forwarder built from `config.forward`.
    pub fn new(config: &AppConfig) -> Result<Self, ForwardError> {
        Ok(Self::with_forwarder(config, Forwarder::new(&config.forward)?))
    }

    pub fn with_forwarder(config: &AppConfig, forwarder: Forwarder) -> Self {
        Self {
            logs: Arc::new(LogStore::new(&config.logs)),
            forwarder: Arc::new(ArcSwap::from_pointee(forwarder)),
            mode: config.mode,
            max_body_size: config.listener.max_body_size,
        }
    }
}

/// HTTP server for the attack-log service.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, ForwardError> {
        let state = AppState::new(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around pre-built state.
    pub fn with_state(config: AppConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::index))
            .route("/login", post(handlers::login))
            .route("/comments", get(handlers::comments_page).post(handlers::post_comment))
            .route("/api/login", post(handlers::receive_log))
            .route("/api/log", post(handlers::forward_log))
            .route("/api/status", get(handlers::status));

        if config.mode.is_dev() {
            router = router
                .route("/logs", get(handlers::request_dashboard))
                .route("/attack-logs", get(handlers::attack_dashboard))
                .route("/api/logs", get(handlers::request_log_json))
                .route("/api/attack-logs", get(handlers::attack_log_json));
        }

        let mode = config.mode;
        router
            .fallback(handlers::not_found)
            .layer(middleware::from_fn_with_state(state.clone(), capture_request))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(CatchPanicLayer::custom(move |panic| {
                        response::panic_response(panic, mode)
                    }))
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires, applying config updates as
    /// they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = self.config.mode.as_str(),
            "HTTP server starting"
        );

        let state = self.state.clone();
        let mut current = self.config.clone();
        let mut updates_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(new_config) => apply_config_update(&state, &mut current, new_config),
                        None => break,
                    },
                    _ = updates_shutdown.recv() => break,
                }
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Swap in a new forwarder if `[forward]` changed. Other sections are only
/// read at startup.
pub fn apply_config_update(state: &AppState, current: &mut AppConfig, new_config: AppConfig) {
    if new_config.forward != current.forward {
        match Forwarder::new(&new_config.forward) {
            Ok(forwarder) => {
                state.forwarder.store(Arc::new(forwarder));
                tracing::info!(
                    timeout_ms = new_config.forward.timeout_ms,
                    default_host = %new_config.forward.default_host,
                    preview_chars = new_config.forward.preview_chars,
                    "Forwarding settings reloaded"
                );
                current.forward = new_config.forward.clone();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to rebuild forwarder, keeping current settings");
            }
        }
    }

    let mut rest = new_config;
    rest.forward = current.forward.clone();
    if rest != *current {
        tracing::warn!("Configuration changes outside [forward] take effect after restart");
    }
}
