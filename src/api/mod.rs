//! REST API over the data layer.
//!
//! Every endpoint is a pure transformation of its request body:
//! - `POST /distribution/dictionary`: form rows to wire dictionary
//! - `POST /distribution/array`: wire dictionary to form rows
//! - `POST /zones/validate`: annotate a GeoJSON zone collection
//! - `POST /analyses/payload`: validate a form and build its payload
//! - `GET /defaults`: initial form state
//! - `GET /legend`: choropleth legend rows

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::config::DssConfig;
use crate::zones::{ZONE_INPUTS_SCHEMA, ZoneField};

pub use types::{DictionaryResponse, ErrorResponse, LegendQuery, PayloadQuery, ZonesResponse};

/// Immutable application state shared across all request handlers.
pub struct AppState {
    /// Defaults new forms are built from.
    pub config: DssConfig,
    /// Zone inputs checked by `/zones/validate`.
    pub schema: &'static [ZoneField],
}

impl AppState {
    pub fn new(config: DssConfig) -> Self {
        Self {
            config,
            schema: ZONE_INPUTS_SCHEMA,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/distribution/dictionary", post(handlers::to_dictionary))
        .route("/distribution/array", post(handlers::to_array))
        .route("/zones/validate", post(handlers::validate_zones))
        .route("/analyses/payload", post(handlers::build_payload))
        .route("/defaults", get(handlers::get_defaults))
        .route("/legend", get(handlers::get_legend))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns the I/O error if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
