use std::{
	convert::Infallible,
	net::{IpAddr, Ipv4Addr, SocketAddr},
	str::FromStr,
};

use axum::{
	extract::{ConnectInfo, FromRequestParts},
	http::request::Parts,
};

/// Extractor for the client IP address, which tries the first hop of the
/// X-Forwarded-For header before falling back to the socket address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientIP(
	/// The IP address of the client.
	pub IpAddr,
);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientIP
where
	S: Send + Sync,
{
	type Rejection = Infallible;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let x_forwarded_for = parts
			.headers
			.get("X-Forwarded-For")
			.and_then(|header_value| header_value.to_str().ok())
			.and_then(|value| {
				value
					.split(',')
					.next()
					.and_then(|ip| IpAddr::from_str(ip.trim()).ok())
			});
		let socket_ip = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
			.await
			.map(|ConnectInfo(addr)| addr.ip())
			.ok();

		Ok(Self(
			x_forwarded_for
				.or(socket_ip)
				.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
		))
	}
}
