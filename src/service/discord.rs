//! The reqwest-backed [`OAuthProvider`] for Discord's OAuth2 endpoints.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::AUTHORIZATION;

use super::OAuthProvider;
use crate::{
	models::{BearerTokenSet, ProviderProfile},
	prelude::*,
	utils::config::DiscordConfig,
};

pub struct DiscordOAuth {
	client: reqwest::Client,
	config: DiscordConfig,
}

impl DiscordOAuth {
	pub fn new(config: DiscordConfig) -> Self {
		let client = reqwest::Client::builder()
			.timeout(constants::PROVIDER_CALL_TIMEOUT)
			.build()
			.expect("reqwest client builder cannot fail with these options");
		Self { client, config }
	}

	/// One POST against the token endpoint. A response that doesn't decode
	/// to a token set (e.g. no access token) fails the attempt.
	async fn try_exchange(
		&self,
		params: &[(&str, &str)],
	) -> Result<BearerTokenSet, reqwest::Error> {
		self.client
			.post(&self.config.token_url)
			.form(params)
			.send()
			.await?
			.error_for_status()?
			.json::<BearerTokenSet>()
			.await
	}

	/// Calls the token endpoint with a retry budget of
	/// [`constants::TOKEN_EXCHANGE_ATTEMPTS`] total attempts and jittered
	/// sleeps in between.
	async fn exchange(
		&self,
		params: &[(&str, &str)],
	) -> Result<BearerTokenSet, ErrorType> {
		let mut attempts_remaining = constants::TOKEN_EXCHANGE_ATTEMPTS;
		loop {
			match self.try_exchange(params).await {
				Ok(token_set) => return Ok(token_set),
				Err(err) => {
					attempts_remaining -= 1;
					if attempts_remaining == 0 {
						warn!("token exchange retry budget exhausted: {err}");
						return Err(ErrorType::UpstreamUnavailable);
					}
					debug!(
						"token exchange attempt failed ({} remaining): {err}",
						attempts_remaining
					);
					tokio::time::sleep(retry_jitter()).await;
				}
			}
		}
	}
}

fn retry_jitter() -> Duration {
	Duration::from_millis(rand::thread_rng().gen_range(25..100))
}

#[async_trait]
impl OAuthProvider for DiscordOAuth {
	async fn exchange_code(&self, code: &str) -> Result<BearerTokenSet, ErrorType> {
		self.exchange(&[
			("client_id", self.config.client_id.as_str()),
			("client_secret", self.config.client_secret.as_str()),
			("grant_type", "authorization_code"),
			("code", code),
			("redirect_uri", self.config.redirect_url.as_str()),
		])
		.await
	}

	async fn exchange_refresh_token(
		&self,
		refresh_token: &str,
	) -> Result<BearerTokenSet, ErrorType> {
		self.exchange(&[
			("client_id", self.config.client_id.as_str()),
			("client_secret", self.config.client_secret.as_str()),
			("grant_type", "refresh_token"),
			("refresh_token", refresh_token),
		])
		.await
	}

	/// Single bearer-authorized GET, no retry. A transient failure here
	/// surfaces immediately.
	async fn identify(&self, access_token: &str) -> Result<ProviderProfile, ErrorType> {
		self.client
			.get(&self.config.identity_url)
			.header(AUTHORIZATION, format!("Bearer {}", access_token))
			.send()
			.await
			.and_then(|response| response.error_for_status())
			.map_err(|err| {
				debug!("identity lookup failed: {err}");
				ErrorType::IdentityLookupFailed
			})?
			.json::<ProviderProfile>()
			.await
			.map_err(|err| {
				debug!("identity response did not parse: {err}");
				ErrorType::IdentityLookupFailed
			})
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	};

	use tokio::{
		io::{AsyncReadExt, AsyncWriteExt},
		net::TcpListener,
	};

	use super::*;
	use crate::{service::OAuthProvider, utils::config::DiscordConfig};

	/// Serves canned HTTP/1.1 responses on a throwaway local port and counts
	/// how many requests arrived.
	async fn spawn_stub_endpoint(
		responses: Vec<String>,
	) -> (String, Arc<AtomicUsize>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let hits = Arc::new(AtomicUsize::new(0));

		tokio::spawn({
			let hits = hits.clone();
			async move {
				loop {
					let Ok((mut socket, _)) = listener.accept().await else {
						break;
					};
					let served = hits.fetch_add(1, Ordering::SeqCst);
					let response = responses
						.get(served)
						.or(responses.last())
						.cloned()
						.unwrap();
					tokio::spawn(async move {
						let mut buffer = [0u8; 4096];
						let _ = socket.read(&mut buffer).await;
						let _ = socket.write_all(response.as_bytes()).await;
						let _ = socket.shutdown().await;
					});
				}
			}
		});

		(format!("http://{}", addr), hits)
	}

	fn http_response(status: &str, body: &str) -> String {
		format!(
			"HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
			body.len()
		)
	}

	fn provider_for(endpoint: &str) -> DiscordOAuth {
		DiscordOAuth::new(DiscordConfig {
			client_id: "cid".to_string(),
			client_secret: "csecret".to_string(),
			redirect_url: "http://localhost/redirect".to_string(),
			token_url: endpoint.to_string(),
			identity_url: endpoint.to_string(),
		})
	}

	#[tokio::test]
	async fn exchange_gives_up_after_exactly_four_attempts() {
		let (endpoint, hits) = spawn_stub_endpoint(vec![http_response(
			"500 Internal Server Error",
			"{}",
		)])
		.await;

		let result = provider_for(&endpoint).exchange_code("abc123").await;

		assert_eq!(result.unwrap_err(), ErrorType::UpstreamUnavailable);
		assert_eq!(hits.load(Ordering::SeqCst), 4);
	}

	#[tokio::test]
	async fn response_without_access_token_counts_as_a_failed_attempt() {
		let (endpoint, hits) = spawn_stub_endpoint(vec![http_response(
			"200 OK",
			r#"{"token_type":"Bearer"}"#,
		)])
		.await;

		let result = provider_for(&endpoint).exchange_code("abc123").await;

		assert_eq!(result.unwrap_err(), ErrorType::UpstreamUnavailable);
		assert_eq!(hits.load(Ordering::SeqCst), 4);
	}

	#[tokio::test]
	async fn exchange_recovers_within_the_retry_budget() {
		let token_body =
			r#"{"access_token":"tok1","refresh_token":"ref1","token_type":"Bearer","expires_in":604800,"scope":"identify"}"#;
		let (endpoint, hits) = spawn_stub_endpoint(vec![
			http_response("500 Internal Server Error", "{}"),
			http_response("500 Internal Server Error", "{}"),
			http_response("200 OK", token_body),
		])
		.await;

		let token_set = provider_for(&endpoint)
			.exchange_refresh_token("ref0")
			.await
			.unwrap();

		assert_eq!(token_set.access_token, "tok1");
		assert_eq!(token_set.refresh_token, "ref1");
		assert_eq!(hits.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn identify_does_not_retry() {
		let (endpoint, hits) = spawn_stub_endpoint(vec![http_response(
			"500 Internal Server Error",
			"{}",
		)])
		.await;

		let result = provider_for(&endpoint).identify("tok1").await;

		assert_eq!(result.unwrap_err(), ErrorType::IdentityLookupFailed);
		assert_eq!(hits.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn identify_parses_the_profile() {
		let (endpoint, _) = spawn_stub_endpoint(vec![http_response(
			"200 OK",
			r#"{"username":"alice","discriminator":"0001","avatar":"av.png"}"#,
		)])
		.await;

		let profile = provider_for(&endpoint).identify("tok1").await.unwrap();

		assert_eq!(profile.provider_id(), "alice#0001");
		assert_eq!(profile.avatar.as_deref(), Some("av.png"));
	}
}
