//! madek-cli library
//!
//! Wires configuration to a compilation [`Client`] and serves compiled
//! documents over HTTP.

use axum::Router;
use madek_common::config::Settings;
use madek_compiler::transport::HttpTransport;
use madek_compiler::Client;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod server;

use server::cache::ResponseCache;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Compilation session; its reference cache lives as long as the server
    pub client: Client,
    /// Whole-response cache
    pub cache: Arc<ResponseCache>,
    /// Store compiled responses in `cache`
    pub cache_enabled: bool,
}

impl AppState {
    pub fn new(client: Client, cache_enabled: bool) -> Self {
        Self {
            client,
            cache: Arc::new(ResponseCache::new()),
            cache_enabled,
        }
    }
}

/// Build the HTTP transport and client described by `settings`
pub fn build_client(settings: &Settings) -> anyhow::Result<Client> {
    let mut transport = HttpTransport::builder().log_requests(settings.log_requests);
    if let Some(username) = &settings.username {
        let password = settings.password.clone().unwrap_or_default();
        transport = transport.credentials(username.clone(), password);
    }
    if let Some(timeout) = settings.request_timeout {
        transport = transport.timeout(timeout);
    }

    let client = Client::builder(settings.address.clone(), Arc::new(transport.build()?))
        .max_pages(settings.max_pages)
        .build();
    Ok(client)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/media-entries/:id", get(server::handlers::get_media_entry))
        .route("/:id", get(server::handlers::get_collection))
        .merge(server::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
