//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// Result of a routing lookup.
pub(crate) enum Route {
    Found(BoxedHandler),
    /// The path exists, but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an earlier route for
    /// the same method.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Route {
        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            return Route::Found(Arc::clone(matched.value));
        }

        if self.allows_path(path) {
            Route::MethodNotAllowed
        } else {
            Route::NotFound
        }
    }

    /// Whether any method has a route for `path`.
    fn allows_path(&self, path: &str) -> bool {
        self.routes.values().any(|tree| tree.at(path).is_ok())
    }
}
