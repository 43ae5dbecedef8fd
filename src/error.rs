use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{config::ConfigError, dto::ContactResponse, message::MissingFields};

pub const DELIVERY_FALLBACK: &str = "Failed to send email";

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error(transparent)]
    Validation(#[from] MissingFields),

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("{0}")]
    Delivery(String),
}

impl ContactError {
    /// Delivery failure carrying the mailer's message, or a generic one when
    /// the mailer gave none.
    pub fn delivery(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Delivery(DELIVERY_FALLBACK.to_string())
        } else {
            Self::Delivery(message)
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Configuration(_) | Self::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Contact request failed: {self}");
        } else {
            tracing::warn!("Contact request rejected: {self}");
        }

        (status, Json(ContactResponse::failed(self.to_string()))).into_response()
    }
}
