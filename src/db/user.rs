use sqlx::PgPool;

use crate::{
	models::{CredentialWrite, LoginCredential, UserIdentity},
	utils::constants,
};

pub(super) async fn initialize_users(pool: &PgPool) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS "user"(
			user_id BIGSERIAL CONSTRAINT user_pk PRIMARY KEY,
			disc_id VARCHAR(100) NOT NULL
				CONSTRAINT user_uq_disc_id UNIQUE,
			disc_avatar TEXT
		);
		"#,
	)
	.execute(pool)
	.await?;

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS user_login_info(
			user_id BIGINT
				CONSTRAINT user_login_info_pk PRIMARY KEY
				CONSTRAINT user_login_info_fk_user_id
					REFERENCES "user"(user_id),
			oauth_provider VARCHAR(20) NOT NULL,
			bearer_token TEXT,
			refresh_token TEXT,
			session_id UUID,
			session_active BOOLEAN NOT NULL DEFAULT FALSE,
			session_expires TIMESTAMPTZ,
			init_ip VARCHAR(45),
			last_ip VARCHAR(45),
			last_interaction TIMESTAMPTZ
		);
		"#,
	)
	.execute(pool)
	.await?;

	Ok(())
}

pub async fn get_user_by_disc_id(
	pool: &PgPool,
	disc_id: &str,
) -> Result<Option<UserIdentity>, sqlx::Error> {
	sqlx::query_as::<_, UserIdentity>(
		r#"
		SELECT
			user_id,
			disc_id,
			disc_avatar
		FROM
			"user"
		WHERE
			disc_id = $1;
		"#,
	)
	.bind(disc_id)
	.fetch_optional(pool)
	.await
}

pub async fn get_login_credential_by_disc_id(
	pool: &PgPool,
	disc_id: &str,
) -> Result<Option<LoginCredential>, sqlx::Error> {
	sqlx::query_as::<_, LoginCredential>(
		r#"
		SELECT
			"user".user_id,
			"user".disc_id,
			user_login_info.bearer_token,
			user_login_info.refresh_token,
			user_login_info.session_id,
			user_login_info.session_active,
			user_login_info.session_expires,
			user_login_info.init_ip,
			user_login_info.last_ip,
			user_login_info.last_interaction
		FROM
			"user"
		JOIN
			user_login_info
		ON
			user_login_info.user_id = "user".user_id
		WHERE
			"user".disc_id = $1;
		"#,
	)
	.bind(disc_id)
	.fetch_optional(pool)
	.await
}

/// Create-or-update, atomic per user_id. `init_ip` is only written on the
/// creating insert.
pub async fn upsert_login_credential(
	pool: &PgPool,
	user_id: i64,
	write: &CredentialWrite,
) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
		INSERT INTO
			user_login_info(
				user_id,
				oauth_provider,
				bearer_token,
				refresh_token,
				session_id,
				session_active,
				session_expires,
				init_ip,
				last_ip,
				last_interaction
			)
		VALUES
			($1, $2, $3, $4, $5, $6, $7, $8, $8, $9)
		ON CONFLICT(user_id) DO UPDATE SET
			oauth_provider = EXCLUDED.oauth_provider,
			bearer_token = EXCLUDED.bearer_token,
			refresh_token = EXCLUDED.refresh_token,
			session_id = EXCLUDED.session_id,
			session_active = EXCLUDED.session_active,
			session_expires = EXCLUDED.session_expires,
			last_ip = EXCLUDED.last_ip,
			last_interaction = EXCLUDED.last_interaction;
		"#,
	)
	.bind(user_id)
	.bind(constants::OAUTH_PROVIDER_DISCORD)
	.bind(&write.bearer_token)
	.bind(&write.refresh_token)
	.bind(write.session_id)
	.bind(write.session_active)
	.bind(write.session_expires)
	.bind(&write.client_ip)
	.bind(write.last_interaction)
	.execute(pool)
	.await?;

	Ok(())
}

/// Update-only variant for the refresh path; the caller has already
/// confirmed the record exists.
pub async fn update_login_credential(
	pool: &PgPool,
	user_id: i64,
	write: &CredentialWrite,
) -> Result<(), sqlx::Error> {
	sqlx::query(
		r#"
		UPDATE
			user_login_info
		SET
			bearer_token = $2,
			refresh_token = $3,
			session_id = $4,
			session_active = $5,
			session_expires = $6,
			last_ip = $7,
			last_interaction = $8
		WHERE
			user_id = $1;
		"#,
	)
	.bind(user_id)
	.bind(&write.bearer_token)
	.bind(&write.refresh_token)
	.bind(write.session_id)
	.bind(write.session_active)
	.bind(write.session_expires)
	.bind(&write.client_ip)
	.bind(write.last_interaction)
	.execute(pool)
	.await?;

	Ok(())
}
