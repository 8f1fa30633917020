//! Runtime configuration.
//!
//! Built-in defaults, overridden by `CONDUIT_*` environment variables:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `CONDUIT_ADDR` | `0.0.0.0:3000` | Address to listen on. |
//! | `CONDUIT_SHUTDOWN_GRACE_SECS` | `30` | How long shutdown waits for in-flight requests before cancelling them. |
//!
//! The log filter is not part of this struct; [`logging::init`](crate::logging::init)
//! reads `RUST_LOG` itself.
//!
//! ```rust,no_run
//! use conduit::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("listening on {}", config.addr);
//! # Ok::<(), conduit::Error>(())
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};

use crate::error::Error;

const ENV_PREFIX: &str = "CONDUIT_";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub addr: SocketAddr,
    pub shutdown_grace_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            shutdown_grace_secs: 30,
        }
    }
}

impl Config {
    /// Loads defaults, then `CONDUIT_*` variables on top.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if a variable does not parse into its field.
    pub fn from_env() -> Result<Self, Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
