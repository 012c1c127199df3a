use std::time::Duration;

use ::redis::{
	aio::MultiplexedConnection as RedisConnection,
	AsyncCommands,
	RedisError,
};
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
	models::Session,
	prelude::*,
	service::{LivenessCache, SessionStore},
};

fn get_key_for_session_liveness(session_id: &Uuid) -> String {
	format!("gtm:{}", session_id)
}
fn get_key_for_session_record(session_id: &Uuid) -> String {
	format!("gtm-sess:{}", session_id)
}

/// Remaining TTL in seconds of the liveness entry for the given session, or
/// None if no entry exists. A key without an expiry reports -1 and is
/// treated as stale by the caller.
pub async fn get_session_liveness_ttl(
	redis_conn: &mut RedisConnection,
	session_id: &Uuid,
) -> Result<Option<i64>, RedisError> {
	let ttl: i64 = redis_conn
		.ttl(get_key_for_session_liveness(session_id))
		.await?;
	// -2 means the key does not exist
	Ok((ttl != -2).then_some(ttl))
}

pub async fn mark_session_live(
	redis_conn: &mut RedisConnection,
	session_id: &Uuid,
	ttl: &Duration,
) -> Result<(), RedisError> {
	redis_conn
		.set_ex(get_key_for_session_liveness(session_id), 1u8, ttl.as_secs())
		.await
}

pub async fn remove_session_liveness(
	redis_conn: &mut RedisConnection,
	session_id: &Uuid,
) -> Result<(), RedisError> {
	redis_conn
		.del(get_key_for_session_liveness(session_id))
		.await
}

pub async fn get_session_record(
	redis_conn: &mut RedisConnection,
	session_id: &Uuid,
) -> Result<Option<Session>, RedisError> {
	let raw: Option<String> = redis_conn
		.get(get_key_for_session_record(session_id))
		.await?;
	Ok(raw.and_then(|raw| {
		serde_json::from_str(&raw)
			.map_err(|err| {
				warn!("discarding unparseable session record {session_id}: {err}");
			})
			.ok()
	}))
}

pub async fn store_session_record(
	redis_conn: &mut RedisConnection,
	session_id: &Uuid,
	record: &str,
	ttl: &Duration,
) -> Result<(), RedisError> {
	redis_conn
		.set_ex(get_key_for_session_record(session_id), record, ttl.as_secs())
		.await
}

pub async fn remove_session_record(
	redis_conn: &mut RedisConnection,
	session_id: &Uuid,
) -> Result<(), RedisError> {
	redis_conn
		.del(get_key_for_session_record(session_id))
		.await
}

/// The production [`LivenessCache`] over the shared multiplexed connection.
pub struct RedisLivenessCache {
	redis: RedisConnection,
}

impl RedisLivenessCache {
	pub fn new(redis: RedisConnection) -> Self {
		Self { redis }
	}
}

#[async_trait]
impl LivenessCache for RedisLivenessCache {
	async fn remaining_ttl(
		&self,
		session_id: &Uuid,
	) -> Result<Option<i64>, ErrorType> {
		let mut redis_conn = self.redis.clone();
		Ok(get_session_liveness_ttl(&mut redis_conn, session_id).await?)
	}

	async fn set_live(
		&self,
		session_id: &Uuid,
		ttl: Duration,
	) -> Result<(), ErrorType> {
		let mut redis_conn = self.redis.clone();
		Ok(mark_session_live(&mut redis_conn, session_id, &ttl).await?)
	}

	async fn delete(&self, session_id: &Uuid) -> Result<(), ErrorType> {
		let mut redis_conn = self.redis.clone();
		Ok(remove_session_liveness(&mut redis_conn, session_id).await?)
	}
}

/// The production [`SessionStore`], sessions as JSON records in Redis.
pub struct RedisSessionStore {
	redis: RedisConnection,
}

impl RedisSessionStore {
	pub fn new(redis: RedisConnection) -> Self {
		Self { redis }
	}
}

#[async_trait]
impl SessionStore for RedisSessionStore {
	async fn get(&self, session_id: &Uuid) -> Result<Option<Session>, ErrorType> {
		let mut redis_conn = self.redis.clone();
		Ok(get_session_record(&mut redis_conn, session_id).await?)
	}

	async fn put(&self, session: &Session, ttl: Duration) -> Result<(), ErrorType> {
		let record = serde_json::to_string(session).map_err(ErrorType::server_error)?;
		let mut redis_conn = self.redis.clone();
		Ok(
			store_session_record(&mut redis_conn, &session.session_id, &record, &ttl)
				.await?,
		)
	}

	async fn remove(&self, session_id: &Uuid) -> Result<(), ErrorType> {
		let mut redis_conn = self.redis.clone();
		Ok(remove_session_record(&mut redis_conn, session_id).await?)
	}
}
