//! Session and OAuth2 token lifecycle service for the GTM game backend.
//!
//! Users authenticate through Discord's OAuth2 endpoints. A successful login
//! binds a server-side session to a hash of the issued bearer token; every
//! privileged request afterwards is either passed through on a live session,
//! transparently refreshed against the identity provider, or rejected.

pub mod app;
pub mod db;
pub mod models;
pub mod prelude;
pub mod redis;
pub mod routes;
pub mod service;
pub mod utils;
