use axum::{middleware, routing::get, Router};

use crate::prelude::*;

mod acc;
mod auth;

/// Assembles every route under the configured base path.
pub fn setup_routes(state: &AppState) -> Router {
	let protected = Router::new()
		.merge(acc::setup_routes())
		.layer(middleware::from_fn_with_state(
			state.clone(),
			acc::session_guard,
		));

	let router = Router::new()
		.route("/", get(root))
		.merge(auth::setup_routes())
		.merge(protected)
		.with_state(state.clone());

	// Nesting maps the inner "/" onto the bare prefix only, so the
	// trailing-slash form of the base path needs its own route.
	Router::new()
		.route(&format!("{}/", state.config.base_path), get(root))
		.nest(&state.config.base_path, router)
}

async fn root() -> &'static str {
	"Hello Future"
}
