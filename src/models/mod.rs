mod oauth;
mod session;
mod user;

pub use self::{oauth::*, session::*, user::*};
