//! The JSON envelope wrapped around every successful API response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// A successful response: `{"error": false, "message": ..., <body fields>}`.
///
/// The fields of `body` are flattened into the top level object, so `body` must serialize
/// to a JSON object.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    error: bool,
    message: String,
    #[serde(flatten)]
    body: T,
    #[serde(skip)]
    status: StatusCode,
}

/// A response body with no fields besides the envelope's.
#[derive(Debug, Serialize)]
pub struct NoContent {}

impl<T: Serialize> Envelope<T> {
    /// A 200 OK response.
    pub fn ok(message: &str, body: T) -> Self {
        Self {
            error: false,
            message: message.to_owned(),
            body,
            status: StatusCode::OK,
        }
    }

    /// A 201 Created response.
    pub fn created(message: &str, body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, body)
        }
    }

    #[cfg(test)]
    pub fn body(&self) -> &T {
        &self.body
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status, Json(&self)).into_response()
    }
}

#[cfg(test)]
mod envelope_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use super::Envelope;

    #[tokio::test]
    async fn flattens_body_into_envelope() {
        let response =
            Envelope::created("Category created", json!({"data": {"id": 1}})).into_response();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({"error": false, "message": "Category created", "data": {"id": 1}})
        );
    }
}
