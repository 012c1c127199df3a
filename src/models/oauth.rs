use serde::Deserialize;

/// The token set minted by the identity provider's token endpoint, for both
/// the `authorization_code` and the `refresh_token` grant.
#[derive(Debug, Clone, Deserialize)]
pub struct BearerTokenSet {
	pub access_token: String,
	pub refresh_token: String,
	#[serde(default)]
	pub token_type: String,
	#[serde(default)]
	pub expires_in: i64,
	#[serde(default)]
	pub scope: String,
}

/// The subset of the provider's profile record this service consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderProfile {
	pub username: String,
	pub discriminator: String,
	#[serde(default)]
	pub avatar: Option<String>,
}

impl ProviderProfile {
	/// The stable external identity handle, `username#discriminator`.
	pub fn provider_id(&self) -> String {
		format!("{}#{}", self.username, self.discriminator)
	}
}
