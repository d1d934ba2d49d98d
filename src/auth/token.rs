//! Issues and verifies the signed session tokens presented as bearer credentials.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// How long a session token is valid for after it is issued.
pub const SESSION_DURATION: Duration = Duration::hours(24);

/// The `iss` claim of every token this server issues.
pub const ISSUER: &str = "moniplan";

/// The identity a session token vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The ID of the user the token was issued to.
    pub user_id: UserID,
    /// The user's email at the time the token was issued.
    pub email: String,
    /// The user's display name at the time the token was issued.
    pub name: String,
}

/// The contents of a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub user_id: UserID,
    /// Email associated with the token.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// Who issued the token, always [ISSUER].
    pub iss: String,
    /// The subject of the token, the user ID as a string.
    pub sub: String,
    /// The time the token was issued as a unix timestamp.
    pub iat: i64,
    /// The token must not be accepted before this unix timestamp.
    pub nbf: i64,
    /// The expiry time of the token as a unix timestamp.
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Why a request's session token was not accepted.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// The request had no `Authorization` header.
    #[error("missing authorization header")]
    MissingHeader,
    /// The `Authorization` header was not of the form `Bearer <token>`.
    #[error("authorization header is not a bearer token")]
    InvalidHeaderFormat,
    /// The token was not signed with the server's secret.
    #[error("the token signature is invalid")]
    InvalidSignature,
    /// The token is past its expiry time.
    #[error("the token has expired")]
    Expired,
    /// The token could not be parsed, used an unexpected algorithm or had bad claims.
    #[error("the token is invalid")]
    Invalid,
}

impl TokenError {
    /// The machine readable error code sent to the client.
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::MissingHeader => "missing_authorization",
            TokenError::InvalidHeaderFormat => "invalid_authorization_format",
            TokenError::InvalidSignature => "invalid_token_signature",
            TokenError::Expired => "token_expired",
            TokenError::Invalid => "invalid_token",
        }
    }

    /// The human readable message sent to the client.
    pub fn message(&self) -> &'static str {
        match self {
            TokenError::MissingHeader => {
                "Please provide a valid JWT token in the Authorization header"
            }
            TokenError::InvalidHeaderFormat => {
                "Authorization header must be in format: Bearer <token>"
            }
            TokenError::InvalidSignature => "The token signature is invalid",
            TokenError::Expired => "Your session has expired. Please login again",
            TokenError::Invalid => "The provided token is invalid",
        }
    }
}

/// The keys for signing and verifying session tokens, derived from the configured secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionKeys {
    /// Create the signing keys from `secret`.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingSigningSecret] if `secret` is empty.
    pub fn from_secret(secret: &str) -> Result<Self, Error> {
        if secret.is_empty() {
            return Err(Error::MissingSigningSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKeys(********)")
    }
}

/// Sign a token for `identity` that is valid from `issued_at` for [SESSION_DURATION].
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the claims could not be signed.
pub fn issue_token(
    identity: &Identity,
    issued_at: OffsetDateTime,
    keys: &SessionKeys,
) -> Result<String, Error> {
    let iat = issued_at.unix_timestamp();
    let claims = Claims {
        user_id: identity.user_id,
        email: identity.email.clone(),
        name: identity.name.clone(),
        iss: ISSUER.to_owned(),
        sub: identity.user_id.to_string(),
        iat,
        nbf: iat,
        exp: (issued_at + SESSION_DURATION).unix_timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature, algorithm, issuer and validity period of `token` and return the
/// identity it carries.
///
/// Only the HMAC family of algorithms is accepted.
///
/// # Errors
///
/// Returns [TokenError::InvalidSignature] or [TokenError::Expired] for those two cases and
/// [TokenError::Invalid] for anything else.
pub fn verify_token(token: &str, keys: &SessionKeys) -> Result<Identity, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss", "sub"]);
    validation.set_issuer(&[ISSUER]);

    decode::<Claims>(token, &keys.decoding_key, &validation)
        .map(|token_data| token_data.claims.into())
        .map_err(|error| match error.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
}
