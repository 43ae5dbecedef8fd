use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{ContactRequest, ContactResponse},
    error::ContactError,
    service::ContactService,
};

#[derive(OpenApi)]
#[openapi(
    paths(contact),
    components(schemas(ContactRequest, ContactResponse)),
    tags(
        (name = "contact", description = "Contact form relay")
    )
)]
pub struct ApiDoc;

fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ContactError> {
    body.map_err(|rejection| {
        tracing::debug!("Failed to read contact body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ContactError::BodyTooLarge
        } else {
            ContactError::InvalidBody
        }
    })
}

/// A missing, blank or `null` body is read as an empty form.
fn parse_body(body: &[u8]) -> Result<ContactRequest, ContactError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ContactRequest::default());
    }

    serde_json::from_slice::<Option<ContactRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            tracing::debug!("Unparsable contact body: {e}");
            ContactError::InvalidBody
        })
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message relayed", body = ContactResponse),
        (status = 400, description = "Missing required fields or malformed body", body = ContactResponse),
        (status = 405, description = "Method not allowed", body = ContactResponse),
        (status = 413, description = "Body over the request size limit", body = ContactResponse),
        (status = 500, description = "Relay not configured or delivery failed", body = ContactResponse)
    ),
    tag = "contact"
)]
#[debug_handler]
pub async fn contact(
    State(service): State<Arc<ContactService>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ContactError> {
    // CORS preflight
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    if method != Method::POST {
        return Err(ContactError::MethodNotAllowed);
    }

    let body = read_body(body)?;
    let request = parse_body(&body)?;
    service.submit(request).await?;

    Ok((StatusCode::OK, Json(ContactResponse::sent())).into_response())
}

#[debug_handler]
pub async fn health_check() -> Response {
    (StatusCode::OK, "Hello from contact relay!").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_null_bodies_are_empty_forms() {
        let bodies: [&[u8]; 3] = [b"", b"  \n", b"null"];
        for body in bodies {
            let request = parse_body(body).unwrap();
            assert!(request.full_name.is_none());
            assert!(request.request.is_none());
        }
    }

    #[test]
    fn camel_case_fields() {
        let request =
            parse_body(br#"{"fullName":"Mario Rossi","email":"mario@example.com","phone":null}"#)
                .unwrap();

        assert_eq!(request.full_name.as_deref(), Some("Mario Rossi"));
        assert_eq!(request.email.as_deref(), Some("mario@example.com"));
        assert!(request.phone.is_none());
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert!(matches!(
            parse_body(b"{\"fullName\":"),
            Err(ContactError::InvalidBody)
        ));
    }
}
