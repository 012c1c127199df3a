use axum::{extract::{Query, State}, routing::get, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{prelude::*, service, utils::client_ip::ClientIP};

pub(super) fn setup_routes() -> Router<AppState> {
	Router::new()
		.route("/auth/discord", get(login_with_discord))
		.route("/auth/apple", get(login_with_apple))
}

#[derive(Debug, Deserialize)]
struct LoginQuery {
	code: Option<String>,
}

/// The OAuth redirect target. Drives the full login flow and, on success,
/// binds the new session id into the session cookie.
async fn login_with_discord(
	State(state): State<AppState>,
	ClientIP(client_ip): ClientIP,
	jar: CookieJar,
	Query(query): Query<LoginQuery>,
) -> Result<(CookieJar, Json<Value>), ErrorType> {
	let session =
		match service::sign_in_user(&state, query.code.as_deref(), client_ip).await {
			Ok(session) => session,
			Err(err) => {
				// Collapse every login failure to the same opaque 401 so a
				// failed attempt learns nothing about which step broke.
				info!("login attempt failed: {err}");
				return Err(ErrorType::Unauthorized);
			}
		};

	let jar = jar.add(
		Cookie::build((constants::SESSION_COOKIE, session.session_id.to_string()))
			.path("/")
			.http_only(true),
	);

	Ok((
		jar,
		Json(json!({
			"status": 200,
			"statusText": "200 OK.",
		})),
	))
}

async fn login_with_apple() -> &'static str {
	"Coming soon, 🍎 bro. ✌🏼"
}
