//! Commonly used imports, `use crate::prelude::*` pulls these in.

pub use tracing::{debug, error, info, instrument, trace, warn};

pub use crate::{
	app::AppState,
	utils::{constants, errors::ErrorType},
};
