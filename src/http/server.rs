//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the six management handlers
//! - Wire up middleware (request ID, tracing, panic recovery, metrics)
//! - Serve on a bound listener until shutdown
//! - Apply hot-reloaded upstream settings

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::ShimConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::upstream::{ClientSettings, GrpcManagementClient, ManagementApi};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ManagementApi>,
}

/// HTTP front end of the management shim.
pub struct HttpServer {
    router: Router,
    config: ShimConfig,
    settings: Arc<ArcSwap<ClientSettings>>,
}

impl HttpServer {
    /// Create a server that talks to the configured management service.
    pub fn new(config: ShimConfig) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(ClientSettings::from(&config)));
        let api = Arc::new(GrpcManagementClient::with_shared_settings(settings.clone()));
        Self::build(config, settings, api)
    }

    /// Create a server that dispatches to the given implementation.
    pub fn with_api(config: ShimConfig, api: Arc<dyn ManagementApi>) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(ClientSettings::from(&config)));
        Self::build(config, settings, api)
    }

    fn build(
        config: ShimConfig,
        settings: Arc<ArcSwap<ClientSettings>>,
        api: Arc<dyn ManagementApi>,
    ) -> Self {
        let router = build_router(AppState { api });
        Self {
            router,
            config,
            settings,
        }
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns once `shutdown` fires and in-flight requests have finished.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ShimConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.endpoint_uri(),
            "HTTP server starting"
        );

        let settings = self.settings.clone();
        let bind_address = self.config.listener.bind_address.clone();
        let reload = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_config_update(&settings, &bind_address, &new_config);
            }
        });

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await;
        reload.abort();
        result?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Settings currently used for management calls.
    pub fn settings(&self) -> Arc<ClientSettings> {
        self.settings.load_full()
    }
}

/// Swap in the upstream part of a reloaded config.
pub fn apply_config_update(
    settings: &ArcSwap<ClientSettings>,
    bind_address: &str,
    new_config: &ShimConfig,
) {
    if new_config.listener.bind_address != bind_address {
        tracing::warn!(
            current = %bind_address,
            requested = %new_config.listener.bind_address,
            "Listener address changes need a restart; keeping current listener"
        );
    }

    let new_settings = ClientSettings::from(new_config);
    if *settings.load_full() != new_settings {
        tracing::info!(
            upstream = %new_settings.upstream.endpoint_uri(),
            inbound_tag = %new_settings.upstream.inbound_tag,
            "Applied upstream configuration"
        );
        settings.store(Arc::new(new_settings));
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/add-user", get(handlers::add_user))
        .route("/remove-user", get(handlers::remove_user))
        .route("/query-user-traffic", get(handlers::query_user_traffic))
        .route("/query-traffic", get(handlers::query_traffic))
        .route("/reset-user-traffic", get(handlers::reset_user_traffic))
        .route("/reset-traffic", get(handlers::reset_traffic))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(set_request_id_layer())
}

async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    metrics::record_request(&route, response.status().as_u16(), start);
    response
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
