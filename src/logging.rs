//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::{StatusCode, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// Bodies longer than this many bytes are truncated in the `info` level log.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The top level JSON fields whose values are never written to the log.
const REDACTED_FIELDS: [&str; 2] = ["password", "token"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords and session tokens in JSON bodies are replaced with asterisks.
///
/// The request body is passed on byte for byte. Bodies over axum's body limit are
/// rejected with `413 Payload Too Large`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_request_body(&parts, body).await {
        Ok(bytes) => bytes,
        Err(error) => return error.into_response(),
    };

    log_request(&parts, &redact(&String::from_utf8_lossy(&body_bytes)));

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return Error::BodyRead(error.to_string()).into_response();
        }
    };
    log_response(&parts, &redact(&String::from_utf8_lossy(&body_bytes)));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Buffer the request body, honouring the body limit set on the request.
async fn read_request_body(parts: &request::Parts, body: Body) -> Result<Bytes, Error> {
    let mut request = Request::new(body);
    *request.extensions_mut() = parts.extensions.clone();

    <Bytes as FromRequest<()>>::from_request(request, &())
        .await
        .map_err(|rejection| {
            tracing::warn!("could not read request body: {rejection}");

            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                Error::PayloadTooLarge
            } else {
                Error::Validation("Could not read the request body".to_owned())
            }
        })
}

/// Replace the values of sensitive top level fields in a JSON object with asterisks.
///
/// Text that is not a JSON object is returned as is.
fn redact(body_text: &str) -> String {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(body_text) else {
        return body_text.to_owned();
    };

    let mut redacted = false;

    for field in REDACTED_FIELDS {
        if let Some(value) = object.get_mut(field) {
            *value = Value::String("********".to_owned());
            redacted = true;
        }
    }

    if redacted {
        Value::Object(object).to_string()
    } else {
        body_text.to_owned()
    }
}

/// The longest prefix of `text` that is at most `limit` bytes and ends on a character boundary.
fn truncate(text: &str, limit: usize) -> &str {
    let end = (0..=limit.min(text.len()))
        .rev()
        .find(|&index| text.is_char_boundary(index))
        .unwrap_or(0);

    &text[..end]
}

fn log_request(parts: &request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {}...",
            parts.method,
            parts.uri,
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {}...",
            parts.status,
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}

#[cfg(test)]
mod logging_tests {
    use serde_json::{Value, json};

    use super::{redact, truncate};

    #[test]
    fn redacts_password_field() {
        let body = json!({"email": "test@test.com", "password": "hunter22"}).to_string();

        let redacted: Value = serde_json::from_str(&redact(&body)).unwrap();

        assert_eq!(
            redacted,
            json!({"email": "test@test.com", "password": "********"})
        );
    }

    #[test]
    fn redacts_token_field() {
        let body = json!({
            "error": false,
            "message": "Login successful",
            "token": "eyJhbGciOiJIUzI1NiJ9.e30.signature",
        })
        .to_string();

        let redacted: Value = serde_json::from_str(&redact(&body)).unwrap();

        assert_eq!(
            redacted,
            json!({"error": false, "message": "Login successful", "token": "********"})
        );
    }

    #[test]
    fn leaves_other_bodies_alone() {
        assert_eq!(redact(""), "");
        assert_eq!(redact("password=hunter22"), "password=hunter22");
        assert_eq!(redact(r#"{"name":"food"}"#), r#"{"name":"food"}"#);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hello", 64), "hello");
        // 'é' is two bytes long.
        assert_eq!(truncate("héllo", 2), "h");
    }
}
