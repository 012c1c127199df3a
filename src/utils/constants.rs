use std::time::Duration;

/// How long a session stays live before it has to be re-validated against
/// the stored credential. Also used as the expiry of the session record
/// itself and of the persisted `session_expires` column.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Total number of attempts the token exchange makes against the identity
/// provider before giving up. Fixed cap, do not raise without revisiting the
/// provider's rate limits.
pub const TOKEN_EXCHANGE_ATTEMPTS: u32 = 4;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "gtm_sid";

/// Provider tag stored in `user_login_info.oauth_provider`.
pub const OAUTH_PROVIDER_DISCORD: &str = "discord";

/// Per-call timeout for all outbound calls to the identity provider. A
/// timeout is treated the same as any other network failure.
pub const PROVIDER_CALL_TIMEOUT: Duration = Duration::from_secs(10);
