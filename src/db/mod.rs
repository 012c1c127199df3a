use async_trait::async_trait;
use sqlx::{pool::PoolOptions, PgPool, Postgres};

use crate::{
	models::{CredentialWrite, LoginCredential, UserIdentity},
	prelude::*,
	service::CredentialStore,
	utils::config::DatabaseConfig,
};

mod user;

pub use self::user::*;

/// Connects to the database based on a config. Not much to say here.
#[instrument(skip(config))]
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
	PoolOptions::<Postgres>::new()
		.max_connections(config.connection_limit)
		.connect_with(
			<<Postgres as sqlx::Database>::Connection as sqlx::Connection>::Options::new()
				.username(config.user.as_str())
				.password(config.password.as_str())
				.host(config.host.as_str())
				.port(config.port)
				.database(config.database.as_str()),
		)
		.await
}

/// Creates the tables this service reads and writes, if they don't exist
/// yet. The user table is normally seeded by the registration service.
#[instrument(skip(pool))]
pub async fn initialize(pool: &PgPool) -> Result<(), sqlx::Error> {
	info!("Initializing user tables");
	user::initialize_users(pool).await
}

/// The production [`CredentialStore`], backed by the Postgres pool.
pub struct DatabaseCredentialStore {
	pool: PgPool,
}

impl DatabaseCredentialStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl CredentialStore for DatabaseCredentialStore {
	async fn find_user(
		&self,
		disc_id: &str,
	) -> Result<Option<UserIdentity>, ErrorType> {
		Ok(user::get_user_by_disc_id(&self.pool, disc_id).await?)
	}

	async fn find_credential(
		&self,
		disc_id: &str,
	) -> Result<Option<LoginCredential>, ErrorType> {
		Ok(user::get_login_credential_by_disc_id(&self.pool, disc_id).await?)
	}

	async fn upsert_credential(
		&self,
		user_id: i64,
		write: &CredentialWrite,
	) -> Result<(), ErrorType> {
		Ok(user::upsert_login_credential(&self.pool, user_id, write).await?)
	}

	async fn update_credential(
		&self,
		user_id: i64,
		write: &CredentialWrite,
	) -> Result<(), ErrorType> {
		Ok(user::update_login_credential(&self.pool, user_id, write).await?)
	}
}
