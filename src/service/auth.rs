//! The two orchestrations at the heart of the service: the initial login
//! flow and the per-request session authenticator.

use std::net::IpAddr;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use uuid::Uuid;

use super::hash_bearer_token;
use crate::{
	models::{AuthOutcome, CredentialWrite, RejectReason, Session, SessionUser},
	prelude::*,
};

fn session_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
	now + ChronoDuration::seconds(constants::SESSION_TTL.as_secs() as i64)
}

/// Runs the full login orchestration for a fresh OAuth redirect: code
/// exchange, identity lookup, credential upsert, session establishment.
///
/// Establishing the new session invalidates the previous one's liveness
/// entry and session record, so a user can never hold two live sessions.
#[instrument(skip(state, code))]
pub async fn sign_in_user(
	state: &AppState,
	code: Option<&str>,
	client_ip: IpAddr,
) -> Result<Session, ErrorType> {
	let code = code
		.filter(|code| !code.is_empty())
		.ok_or(ErrorType::MissingAuthorizationCode)?;

	let token_set = state.oauth.exchange_code(code).await?;
	let profile = state.oauth.identify(&token_set.access_token).await?;
	let disc_id = profile.provider_id();

	// This service does not self-register identities
	let user = state
		.credentials
		.find_user(&disc_id)
		.await?
		.ok_or(ErrorType::UnknownUser)?;
	trace!("resolved {disc_id} to user {}", user.user_id);

	// Supersede any previous session so a user cannot accumulate multiple
	// live keys. Cache errors here are logged, not fatal.
	if let Some(previous) = state
		.credentials
		.find_credential(&disc_id)
		.await?
		.and_then(|credential| credential.session_id)
	{
		if let Err(err) = state.liveness.delete(&previous).await {
			error!("failed to invalidate previous session {previous}: {err}");
		}
		if let Err(err) = state.sessions.remove(&previous).await {
			error!("failed to remove previous session record {previous}: {err}");
		}
	}

	let now = Utc::now();
	let session_id = Uuid::new_v4();
	state
		.credentials
		.upsert_credential(
			user.user_id,
			&CredentialWrite {
				bearer_token: token_set.access_token.clone(),
				refresh_token: token_set.refresh_token.clone(),
				session_id,
				session_active: true,
				session_expires: session_expiry(now),
				client_ip: client_ip.to_string(),
				last_interaction: now,
			},
		)
		.await?;

	let session_user = SessionUser {
		disc_name: user.disc_id,
		disc_avatar: profile.avatar.or(user.disc_avatar),
		bearer_hash: hash_bearer_token(&token_set.access_token),
	};
	info!(
		"user {} signed in with session {session_id}",
		session_user.disc_name
	);
	let session = Session::authenticated(session_id, session_user);
	state.sessions.put(&session, constants::SESSION_TTL).await?;
	state
		.liveness
		.set_live(&session_id, constants::SESSION_TTL)
		.await?;

	Ok(session)
}

/// The per-request state machine over an inbound request's optional
/// session.
///
/// A session with a live cache entry passes straight through with no store
/// or provider calls. A stale one is re-validated against the persisted
/// credential's bearer hash and, on a match, refreshed in place through the
/// identity provider's refresh grant.
#[instrument(skip_all)]
pub async fn authenticate_session(
	state: &AppState,
	session: Option<Session>,
	client_ip: IpAddr,
) -> AuthOutcome {
	let Some(session) = session else {
		return AuthOutcome::Reject(RejectReason::NotAuthenticated);
	};
	if !session.authenticated {
		return AuthOutcome::Reject(RejectReason::NotAuthenticated);
	}

	match state.liveness.remaining_ttl(&session.session_id).await {
		// Fast path: nothing else is checked
		Ok(Some(remaining)) if remaining > 0 => {
			trace!(
				"session {} live for another {remaining}s",
				session.session_id
			);
			return AuthOutcome::Proceed(session);
		}
		Ok(_) => (),
		Err(err) => return AuthOutcome::Fault(err),
	}
	debug!("session {} is stale, re-validating", session.session_id);

	let Some(session_user) = session.user.clone() else {
		return AuthOutcome::Reject(RejectReason::MissingBearerHash);
	};
	if session_user.bearer_hash.is_empty() {
		return AuthOutcome::Reject(RejectReason::MissingBearerHash);
	}

	let credential = match state
		.credentials
		.find_credential(&session_user.disc_name)
		.await
	{
		Ok(Some(credential)) => credential,
		Ok(None) => return AuthOutcome::Reject(RejectReason::UnknownUser),
		Err(err) => return AuthOutcome::Fault(err),
	};
	let Some(bearer_token) = credential.bearer_token.as_deref() else {
		return AuthOutcome::Reject(RejectReason::MissingBearerToken);
	};

	if hash_bearer_token(bearer_token) != session_user.bearer_hash {
		// If we're here someone's trying to be fruity
		warn!(
			"bearer hash mismatch for session {}, rejecting",
			session.session_id
		);
		return AuthOutcome::Reject(RejectReason::CredentialMismatch);
	}

	let Some(refresh_token) = credential.refresh_token.as_deref() else {
		return AuthOutcome::Reject(RejectReason::MissingRefreshToken);
	};
	let token_set = match state.oauth.exchange_refresh_token(refresh_token).await {
		Ok(token_set) => token_set,
		Err(err) => {
			info!(
				"refresh exchange failed for session {}: {err}",
				session.session_id
			);
			return AuthOutcome::Reject(RejectReason::RefreshFailed);
		}
	};

	// Avatar refresh is best-effort; keep the previous one if the profile
	// lookup fails.
	let disc_avatar = match state.oauth.identify(&token_set.access_token).await {
		Ok(profile) => profile.avatar,
		Err(_) => session_user.disc_avatar.clone(),
	};
	let refreshed = Session::authenticated(
		session.session_id,
		SessionUser {
			disc_name: session_user.disc_name.clone(),
			disc_avatar,
			bearer_hash: hash_bearer_token(&token_set.access_token),
		},
	);

	let now = Utc::now();
	let write_result = state
		.credentials
		.update_credential(
			credential.user_id,
			&CredentialWrite {
				bearer_token: token_set.access_token.clone(),
				refresh_token: token_set.refresh_token.clone(),
				session_id: session.session_id,
				session_active: true,
				session_expires: session_expiry(now),
				client_ip: client_ip.to_string(),
				last_interaction: now,
			},
		)
		.await;
	if let Err(err) = write_result {
		// Availability over consistency: the request proceeds on the new
		// token even if persistence lags behind.
		error!(
			"failed to persist refreshed credential for user {}: {err}",
			credential.user_id
		);
	}

	if let Err(err) = state.sessions.put(&refreshed, constants::SESSION_TTL).await {
		return AuthOutcome::Fault(err);
	}
	if let Err(err) = state
		.liveness
		.set_live(&session.session_id, constants::SESSION_TTL)
		.await
	{
		return AuthOutcome::Fault(err);
	}

	debug!("session {} refreshed in place", session.session_id);
	AuthOutcome::Proceed(refreshed)
}
