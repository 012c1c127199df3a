use std::{
	fmt::{Display, Formatter},
	mem,
};

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde_json::json;

/// A list of all the possible errors that can come out of the auth core.
///
/// Anything that maps to a 401 renders the same opaque body, so a failed
/// login attempt cannot tell which part of the flow rejected it.
#[derive(Debug)]
pub enum ErrorType {
	/// The login request did not carry an authorization code
	MissingAuthorizationCode,
	/// The identity provider could not be reached, even after exhausting the
	/// retry budget of the token exchange
	UpstreamUnavailable,
	/// The bearer-authorized profile lookup against the identity provider
	/// failed. Not retried
	IdentityLookupFailed,
	/// No user record exists for the resolved provider id. This service does
	/// not self-register identities
	UnknownUser,
	/// The bearer hash held by the session does not match the hash of the
	/// persisted bearer token. Treated as tampering, never retried
	CredentialMismatch,
	/// The request carried no usable session, or the session failed
	/// re-validation
	Unauthorized,
	/// The liveness cache could not be queried. Infrastructure fault, not a
	/// credential problem
	CacheUnavailable(anyhow::Error),
	/// A credential read or write against the database failed
	PersistenceFailure(anyhow::Error),
	/// An internal server error. This should not happen unless there is a
	/// bug in the server
	InternalServerError(anyhow::Error),
}

impl ErrorType {
	/// Returns the status code that should be used for this error
	pub fn default_status_code(&self) -> StatusCode {
		match self {
			Self::MissingAuthorizationCode => StatusCode::UNAUTHORIZED,
			Self::UpstreamUnavailable => StatusCode::UNAUTHORIZED,
			Self::IdentityLookupFailed => StatusCode::UNAUTHORIZED,
			Self::UnknownUser => StatusCode::UNAUTHORIZED,
			Self::CredentialMismatch => StatusCode::UNAUTHORIZED,
			Self::Unauthorized => StatusCode::UNAUTHORIZED,
			Self::CacheUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// A stable machine-readable code for this error, rendered in 500-class
	/// bodies only
	pub fn code(&self) -> &'static str {
		match self {
			Self::MissingAuthorizationCode => "MISSING_AUTHORIZATION_CODE",
			Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
			Self::IdentityLookupFailed => "IDENTITY_LOOKUP_FAILED",
			Self::UnknownUser => "UNKNOWN_USER",
			Self::CredentialMismatch => "CREDENTIAL_MISMATCH",
			Self::Unauthorized => "UNAUTHORISED",
			Self::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
			Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
			Self::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
		}
	}

	/// The message that should be used for this error
	pub fn message(&self) -> String {
		match self {
			Self::MissingAuthorizationCode => {
				"no authorization code was provided".to_string()
			}
			Self::UpstreamUnavailable => {
				"could not contact identity provider servers".to_string()
			}
			Self::IdentityLookupFailed => {
				"could not resolve the user's identity".to_string()
			}
			Self::UnknownUser => "no user exists for that identity".to_string(),
			Self::CredentialMismatch => {
				"session credential does not match stored state".to_string()
			}
			Self::Unauthorized => "unauthorised".to_string(),
			Self::CacheUnavailable(err) => {
				format!("session cache unavailable: {}", err)
			}
			Self::PersistenceFailure(err) => {
				format!("credential store unavailable: {}", err)
			}
			Self::InternalServerError(err) => {
				format!("internal authentication error: {}", err)
			}
		}
	}

	/// Creates an [`ErrorType::InternalServerError`] with the given message
	pub fn server_error(message: impl Display) -> Self {
		Self::InternalServerError(anyhow::anyhow!(message.to_string()))
	}
}

impl Display for ErrorType {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(formatter, "{}: {}", self.code(), self.message())
	}
}

impl std::error::Error for ErrorType {}

impl PartialEq for ErrorType {
	fn eq(&self, other: &Self) -> bool {
		mem::discriminant(self) == mem::discriminant(other)
	}
}

impl Eq for ErrorType {}

impl From<sqlx::Error> for ErrorType {
	fn from(error: sqlx::Error) -> Self {
		Self::PersistenceFailure(error.into())
	}
}

impl From<redis::RedisError> for ErrorType {
	fn from(error: redis::RedisError) -> Self {
		Self::CacheUnavailable(error.into())
	}
}

impl IntoResponse for ErrorType {
	fn into_response(self) -> Response {
		let status = self.default_status_code();
		let body = if status == StatusCode::UNAUTHORIZED {
			// Uniform rejection body. Anything more specific would confirm
			// to an attacker which part of the flow failed.
			json!({
				"status": 401,
				"statusText": "401 Unauthorised.",
			})
		} else {
			json!({
				"status": status.as_u16(),
				"statusText": "INTERNAL SERVER ERROR",
				"error": {
					"code": self.code(),
					"message": self.message(),
				},
			})
		};

		(status, Json(body)).into_response()
	}
}
