use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::*;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
	models::{
		BearerTokenSet,
		CredentialWrite,
		LoginCredential,
		ProviderProfile,
		Session,
		UserIdentity,
	},
	utils::errors::ErrorType,
};

mod auth;
pub mod discord;

pub use self::auth::*;

/// The identity provider's OAuth2 surface: the two token-endpoint grants
/// and the bearer-authorized profile lookup.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
	async fn exchange_code(&self, code: &str) -> Result<BearerTokenSet, ErrorType>;

	async fn exchange_refresh_token(
		&self,
		refresh_token: &str,
	) -> Result<BearerTokenSet, ErrorType>;

	async fn identify(&self, access_token: &str) -> Result<ProviderProfile, ErrorType>;
}

/// Persistence of user identities and per-user login records, keyed by the
/// provider identity handle.
#[async_trait]
pub trait CredentialStore: Send + Sync {
	async fn find_user(&self, disc_id: &str) -> Result<Option<UserIdentity>, ErrorType>;

	async fn find_credential(
		&self,
		disc_id: &str,
	) -> Result<Option<LoginCredential>, ErrorType>;

	/// Create-if-absent else update. Must be atomic per user_id.
	async fn upsert_credential(
		&self,
		user_id: i64,
		write: &CredentialWrite,
	) -> Result<(), ErrorType>;

	/// Update-only; the caller has already confirmed the record exists.
	async fn update_credential(
		&self,
		user_id: i64,
		write: &CredentialWrite,
	) -> Result<(), ErrorType>;
}

/// TTL-keyed record of which sessions still need no re-validation. Store
/// errors must surface as [`ErrorType::CacheUnavailable`], never be treated
/// as "absent".
#[async_trait]
pub trait LivenessCache: Send + Sync {
	/// Remaining TTL in seconds, or None if no entry exists.
	async fn remaining_ttl(&self, session_id: &Uuid) -> Result<Option<i64>, ErrorType>;

	async fn set_live(&self, session_id: &Uuid, ttl: Duration) -> Result<(), ErrorType>;

	async fn delete(&self, session_id: &Uuid) -> Result<(), ErrorType>;
}

/// Durable storage of session records, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn get(&self, session_id: &Uuid) -> Result<Option<Session>, ErrorType>;

	async fn put(&self, session: &Session, ttl: Duration) -> Result<(), ErrorType>;

	async fn remove(&self, session_id: &Uuid) -> Result<(), ErrorType>;
}

/// One-way hash of a bearer token as stored in the session, SHA-256 encoded
/// to base64. The raw token never leaves server-side storage.
pub fn hash_bearer_token(token: &str) -> String {
	BASE64_STANDARD.encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
	use super::hash_bearer_token;

	#[test]
	fn bearer_hash_is_stable_and_token_specific() {
		assert_eq!(hash_bearer_token("oldtok"), hash_bearer_token("oldtok"));
		assert_ne!(hash_bearer_token("oldtok"), hash_bearer_token("newtok"));
	}

	#[test]
	fn bearer_hash_never_contains_the_raw_token() {
		assert!(!hash_bearer_token("supersecret").contains("supersecret"));
	}
}
