//! Authentication middleware that checks the bearer token on protected routes.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejectionReason,
};

use crate::{
    AppState, Error,
    auth::{SessionKeys, TokenError, verify_token},
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The keys used to verify session tokens.
    pub session_keys: SessionKeys,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session_keys: state.session_keys.clone(),
        }
    }
}

/// Middleware function that checks for a valid `Authorization: Bearer <token>` header.
///
/// The [Identity](crate::auth::Identity) carried by the token is placed into the request
/// extensions and the request executed normally if the token is valid, otherwise a 401
/// response describing the problem is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(identity): Extension<Identity>` to receive the caller's identity.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bearer =
        match TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state).await {
            Ok(TypedHeader(Authorization(bearer))) => bearer,
            Err(rejection) => {
                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => TokenError::MissingHeader,
                    _ => TokenError::InvalidHeaderFormat,
                };
                tracing::debug!("Rejected request to {}: {error}", parts.uri);
                return Error::Token(error).into_response();
            }
        };

    let identity = match verify_token(bearer.token(), &state.session_keys) {
        Ok(identity) => identity,
        Err(error) => {
            tracing::debug!("Rejected session token for {}: {error}", parts.uri);
            return Error::Token(error).into_response();
        }
    };

    parts.extensions.insert(identity);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;
    use serde_json::Value;
    use time::{Duration, OffsetDateTime};

    use crate::auth::{
        Identity, SessionKeys, UserID, auth_guard, issue_token, middleware::AuthState,
    };

    async fn whoami(Extension(identity): Extension<Identity>) -> String {
        identity.email
    }

    fn get_test_server() -> (TestServer, SessionKeys) {
        let session_keys = SessionKeys::from_secret("foobar").unwrap();
        let state = AuthState {
            session_keys: session_keys.clone(),
        };
        let app = Router::new()
            .route("/protected", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .with_state(state);

        (
            TestServer::try_new(app).expect("Could not create test server."),
            session_keys,
        )
    }

    fn test_identity() -> Identity {
        Identity {
            user_id: UserID::new(1),
            email: "test@test.com".to_owned(),
            name: "Test".to_owned(),
        }
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_token() {
        let (server, keys) = get_test_server();
        let token = issue_token(&test_identity(), OffsetDateTime::now_utc(), &keys).unwrap();

        let response = server
            .get("/protected")
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_text("test@test.com");
    }

    #[tokio::test]
    async fn get_protected_route_with_no_header() {
        let (server, _) = get_test_server();

        let response = server.get("/protected").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "missing_authorization");
    }

    #[tokio::test]
    async fn get_protected_route_with_wrong_scheme() {
        let (server, _) = get_test_server();

        let response = server
            .get("/protected")
            .authorization("Basic dXNlcjpwYXNz")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>()["error"],
            "invalid_authorization_format"
        );
    }

    #[tokio::test]
    async fn get_protected_route_with_expired_token() {
        let (server, keys) = get_test_server();
        let issued_at = OffsetDateTime::now_utc() - Duration::days(2);
        let token = issue_token(&test_identity(), issued_at, &keys).unwrap();

        let response = server
            .get("/protected")
            .authorization_bearer(token)
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "token_expired");
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_token() {
        let (server, _) = get_test_server();

        let response = server
            .get("/protected")
            .authorization_bearer("FOOBAR")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "invalid_token");
    }
}
