use std::{
	env,
	fmt::{Display, Formatter},
	net::SocketAddr,
};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Reads `config/dev` or `config/prod` (any format the config crate
/// understands) and merges `APP_`-prefixed environment variables on top.
#[instrument]
pub fn parse_config() -> AppConfig {
	trace!("Reading config data...");

	let env = if cfg!(debug_assertions) {
		"dev".to_string()
	} else {
		env::var("APP_ENV").unwrap_or_else(|_| "prod".into())
	};

	match env.as_ref() {
		"prod" | "production" => Config::builder()
			.add_source(File::with_name("config/prod").required(false))
			.set_default("environment", "production")
			.expect("unable to set environment to production"),
		"dev" | "development" => Config::builder()
			.add_source(File::with_name("config/dev").required(false))
			.set_default("environment", "development")
			.expect("unable to set environment to development"),
		_ => {
			panic!("Unknown running environment found!");
		}
	}
	.add_source(Environment::with_prefix("APP").separator("_"))
	.build()
	.expect("unable to merge with environment variables")
	.try_deserialize()
	.expect("unable to parse settings")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
	#[serde(alias = "bindaddr")]
	pub bind_addr: SocketAddr,
	#[serde(alias = "basepath", default = "default_base_path")]
	pub base_path: String,
	pub environment: RunningEnvironment,
	pub database: DatabaseConfig,
	pub redis: RedisConfig,
	pub discord: DiscordConfig,
}

fn default_base_path() -> String {
	"/api/v0".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunningEnvironment {
	Development,
	Production,
}

impl Display for RunningEnvironment {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			formatter,
			"{}",
			match self {
				RunningEnvironment::Development => "Development",
				RunningEnvironment::Production => "Production",
			}
		)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
	pub host: String,
	pub port: u16,
	pub user: String,
	pub password: String,
	pub database: String,
	#[serde(alias = "connectionlimit", default = "default_connection_limit")]
	pub connection_limit: u32,
}

fn default_connection_limit() -> u32 {
	10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisConfig {
	pub host: String,
	pub port: u16,
	pub user: Option<String>,
	pub password: Option<String>,
	#[serde(default)]
	pub database: u8,
	#[serde(default)]
	pub secure: bool,
}

/// The OAuth2 endpoints and client credentials of the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordConfig {
	#[serde(alias = "clientid")]
	pub client_id: String,
	#[serde(alias = "clientsecret")]
	pub client_secret: String,
	#[serde(alias = "redirecturl")]
	pub redirect_url: String,
	#[serde(alias = "tokenurl", default = "default_token_url")]
	pub token_url: String,
	#[serde(alias = "identityurl", default = "default_identity_url")]
	pub identity_url: String,
}

fn default_token_url() -> String {
	"https://discord.com/api/oauth2/token".to_string()
}

fn default_identity_url() -> String {
	"https://discord.com/api/users/@me".to_string()
}
