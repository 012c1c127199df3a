use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::errors::ErrorType;

/// Data about the user that is embedded in the session. Holds a one-way
/// hash of the current bearer token, never the raw token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
	pub disc_name: String,
	pub disc_avatar: Option<String>,
	pub bearer_hash: String,
}

/// A server-side session, stored in the session store under its id and
/// referenced by the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
	pub session_id: Uuid,
	pub authenticated: bool,
	pub user: Option<SessionUser>,
}

impl Session {
	/// A new authenticated session for the given user projection.
	pub fn authenticated(session_id: Uuid, user: SessionUser) -> Self {
		Self {
			session_id,
			authenticated: true,
			user: Some(user),
		}
	}
}

/// The terminal outcome of running the session authenticator over one
/// inbound request. The boundary layer turns this into an HTTP status.
#[derive(Debug)]
pub enum AuthOutcome {
	/// The request may continue, carrying this (possibly refreshed) session.
	Proceed(Session),
	/// The request is short-circuited with a 401.
	Reject(RejectReason),
	/// Infrastructure failed underneath the authenticator; 500-class.
	Fault(ErrorType),
}

/// Why the session authenticator rejected a request. Logged server-side
/// only; every reason renders the same opaque 401 body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
	NotAuthenticated,
	MissingBearerHash,
	UnknownUser,
	MissingBearerToken,
	CredentialMismatch,
	MissingRefreshToken,
	RefreshFailed,
}
