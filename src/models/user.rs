use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user, keyed by the provider identity handle. Created outside
/// this service; never deleted by it.
#[derive(Debug, Clone, FromRow)]
pub struct UserIdentity {
	pub user_id: i64,
	pub disc_id: String,
	pub disc_avatar: Option<String>,
}

/// The one-per-user login record, joined with the owning user's identity
/// handle.
#[derive(Debug, Clone, FromRow)]
pub struct LoginCredential {
	pub user_id: i64,
	pub disc_id: String,
	pub bearer_token: Option<String>,
	pub refresh_token: Option<String>,
	pub session_id: Option<Uuid>,
	pub session_active: bool,
	pub session_expires: Option<DateTime<Utc>>,
	pub init_ip: Option<String>,
	pub last_ip: Option<String>,
	pub last_interaction: Option<DateTime<Utc>>,
}

/// The fields written to a login record by the login and refresh flows. The
/// store keeps `init_ip` from the first write for a user and takes
/// `client_ip` as `last_ip` on every subsequent one.
#[derive(Debug, Clone)]
pub struct CredentialWrite {
	pub bearer_token: String,
	pub refresh_token: String,
	pub session_id: Uuid,
	pub session_active: bool,
	pub session_expires: DateTime<Utc>,
	pub client_ip: String,
	pub last_interaction: DateTime<Utc>,
}
