//! Venue, artist and show listings served as form-driven pages.

use axum::{
    http::{header, HeaderValue},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub mod api;
pub mod config;
pub mod error;
pub mod flash;
pub mod forms;
pub mod logging;
pub mod render;
pub mod state;
pub mod views;

pub use config::ServerConfig;
pub use error::AppError;
pub use state::AppState;

/// Build the full router: pages, form endpoints, error pages and the
/// response-wide layers.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::home::index))
        // Venues
        .route("/venues", get(api::venues::list_venues))
        .route("/venues/search", post(api::venues::search_venues))
        .route(
            "/venues/create",
            get(api::venues::create_venue_form).post(api::venues::create_venue),
        )
        .route(
            "/venues/{id}",
            get(api::venues::show_venue).delete(api::venues::delete_venue),
        )
        .route("/venues/{id}/delete", post(api::venues::delete_venue))
        .route(
            "/venues/{id}/edit",
            get(api::venues::edit_venue_form).post(api::venues::edit_venue),
        )
        // Artists
        .route("/artists", get(api::artists::list_artists))
        .route("/artists/search", post(api::artists::search_artists))
        .route(
            "/artists/create",
            get(api::artists::create_artist_form).post(api::artists::create_artist),
        )
        .route("/artists/{id}", get(api::artists::show_artist))
        .route(
            "/artists/{id}/edit",
            get(api::artists::edit_artist_form).post(api::artists::edit_artist),
        )
        // Shows
        .route("/shows", get(api::shows::list_shows))
        .route(
            "/shows/create",
            get(api::shows::create_show_form).post(api::shows::create_show),
        )
        .fallback(error::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            error::render_error_pages,
        ))
        .layer(TraceLayer::new_for_http())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}
