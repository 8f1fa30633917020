//! `tracing-subscriber` setup for the binary.
//!
//! The filter comes from `RUST_LOG`. Unset means `info`; set but unparsable
//! refuses to start, the same as any other bad configuration value.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::Error;

const DEFAULT_FILTER: &str = "info";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
///
/// # Errors
///
/// [`Error::Config`] if `RUST_LOG` is set but is not a valid filter, or if a
/// global subscriber is already installed.
pub fn init() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| Error::Config(format!("logging: {e}")))
}

fn env_filter() -> Result<EnvFilter, Error> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(e) if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() => {
            Err(Error::Config(format!("{}: {e}", EnvFilter::DEFAULT_ENV)))
        }
        Err(_) => Ok(EnvFilter::new(DEFAULT_FILTER)),
    }
}
