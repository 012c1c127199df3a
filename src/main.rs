use std::sync::Arc;

use gtm_api::{
	app::{self, AppState},
	db::{self, DatabaseCredentialStore},
	redis::{self, RedisLivenessCache, RedisSessionStore},
	service::discord::DiscordOAuth,
	utils::config::{self, RunningEnvironment},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = config::parse_config();

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			EnvFilter::new(match config.environment {
				RunningEnvironment::Development => "gtm_api=trace,info",
				RunningEnvironment::Production => "gtm_api=debug,warn",
			})
		}))
		.init();
	info!(
		"Configuration read. Running environment set to {}",
		config.environment
	);

	let database = db::connect(&config.database).await?;
	db::initialize(&database).await?;
	info!("Database connection pool established");

	let redis = redis::connect(&config.redis).await?;
	info!("Redis connection established");

	let state = AppState {
		oauth: Arc::new(DiscordOAuth::new(config.discord.clone())),
		credentials: Arc::new(DatabaseCredentialStore::new(database)),
		liveness: Arc::new(RedisLivenessCache::new(redis.clone())),
		sessions: Arc::new(RedisSessionStore::new(redis)),
		config,
	};

	app::start_server(state).await
}
