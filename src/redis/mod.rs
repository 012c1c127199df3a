use ::redis::{aio::MultiplexedConnection as RedisConnection, RedisError};

use crate::{prelude::*, utils::config::RedisConfig};

mod session;

pub use self::session::*;

/// Connect to a Redis server using the given configuration
#[instrument(skip(config))]
pub async fn connect(config: &RedisConfig) -> Result<RedisConnection, RedisError> {
	::redis::Client::open(format!(
		"{}://{}{}:{}/{}",
		if config.secure { "rediss" } else { "redis" },
		if let Some((username, password)) =
			config.user.as_ref().zip(config.password.as_ref())
		{
			format!("{}:{}@", username, password)
		} else {
			"".to_string()
		},
		config.host,
		config.port,
		config.database
	))?
	.get_multiplexed_tokio_connection()
	.await
}
