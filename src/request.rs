//! Incoming HTTP request type.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// What a route handler receives: the request body, already read in full,
/// and the request's cancellation signal.
///
/// Method and path have been consumed by the router by the time a handler
/// runs, so they are not carried along.
pub struct Request {
    body: Bytes,
    cancel: CancellationToken,
}

impl Request {
    pub(crate) fn new(body: Bytes, cancel: CancellationToken) -> Self {
        Self { body, cancel }
    }

    pub fn body(&self) -> &[u8] { &self.body }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Cancelled when the server gives up waiting for in-flight requests
    /// during shutdown.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
impl Request {
    /// A request as the router would hand it to a handler.
    pub(crate) fn for_test(body: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(body), CancellationToken::new())
    }
}
