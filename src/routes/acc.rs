use axum::{
	extract::{Request, State},
	middleware::Next,
	response::{IntoResponse, Response},
	routing::get,
	Extension,
	Json,
	Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use uuid::Uuid;

use crate::{
	models::{AuthOutcome, Session},
	prelude::*,
	service,
	utils::client_ip::ClientIP,
};

pub(super) fn setup_routes() -> Router<AppState> {
	Router::new().route("/acc/whoami", get(whoami))
}

/// Wraps every protected route. Resolves the session cookie, runs the
/// session authenticator and either forwards the request with the
/// (possibly refreshed) session attached, or short-circuits it.
pub(super) async fn session_guard(
	State(state): State<AppState>,
	ClientIP(client_ip): ClientIP,
	jar: CookieJar,
	mut request: Request,
	next: Next,
) -> Response {
	let session_id = jar
		.get(constants::SESSION_COOKIE)
		.and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

	let session = match session_id {
		Some(session_id) => match state.sessions.get(&session_id).await {
			Ok(session) => session,
			Err(err) => return err.into_response(),
		},
		None => None,
	};

	match service::authenticate_session(&state, session, client_ip).await {
		AuthOutcome::Proceed(session) => {
			request.extensions_mut().insert(session);
			next.run(request).await
		}
		AuthOutcome::Reject(reason) => {
			debug!("rejecting request: {reason:?}");
			// The session is done for; drop whatever state it still has
			if let Some(session_id) = session_id {
				if let Err(err) = state.sessions.remove(&session_id).await {
					error!("failed to remove rejected session {session_id}: {err}");
				}
				if let Err(err) = state.liveness.delete(&session_id).await {
					error!(
						"failed to drop liveness of rejected session {session_id}: {err}"
					);
				}
			}
			ErrorType::Unauthorized.into_response()
		}
		AuthOutcome::Fault(err) => err.into_response(),
	}
}

#[derive(Debug, Serialize)]
struct UserData {
	disc_name: String,
	disc_avatar: Option<String>,
}

/// Returns the authenticated user's projection as held by the session.
async fn whoami(
	Extension(session): Extension<Session>,
) -> Result<Json<UserData>, ErrorType> {
	let user = session.user.ok_or(ErrorType::Unauthorized)?;

	Ok(Json(UserData {
		disc_name: user.disc_name,
		disc_avatar: user.disc_avatar,
	}))
}
