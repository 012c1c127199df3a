use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;

use crate::{
	prelude::*,
	routes,
	service::{CredentialStore, LivenessCache, OAuthProvider, SessionStore},
	utils::config::AppConfig,
};

/// Everything a request handler needs, with all external collaborators
/// behind trait objects so tests can swap them out.
#[derive(Clone)]
pub struct AppState {
	pub config: AppConfig,
	pub oauth: Arc<dyn OAuthProvider>,
	pub credentials: Arc<dyn CredentialStore>,
	pub liveness: Arc<dyn LivenessCache>,
	pub sessions: Arc<dyn SessionStore>,
}

/// Binds to the configured address and serves the API until the process is
/// stopped.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
	let bind_addr = state.config.bind_addr;
	let router = routes::setup_routes(&state);

	let listener = TcpListener::bind(bind_addr).await?;
	info!("Listening for connections on {}", bind_addr);

	axum::serve(
		listener,
		router.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await?;

	Ok(())
}
