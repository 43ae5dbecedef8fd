pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod mailer;
pub mod message;
pub mod service;

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{any, get},
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use service::ContactService;

pub const CONTACT_PATH: &str = "/api/contact";

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "POST,OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Builds the service router. Every response, errors included, carries the
/// CORS headers the landing page needs for its cross-origin POST.
pub fn app(service: Arc<ContactService>) -> Router {
    Router::new()
        .route("/", get(handler::health_check))
        .route(CONTACT_PATH, any(handler::contact))
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-doc/openapi.json", handler::ApiDoc::openapi()),
        )
        .with_state(service)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}
