//! Route handler trait and type erasure.
//!
//! # Storing handlers of different types
//!
//! Every route handler is its own concrete type: each `async fn` item and
//! each closure gets a unique, unnameable type from the compiler. The router
//! keeps all of them in one `HashMap<Method, matchit::Router<_>>`, so the
//! concrete type has to disappear somewhere. That happens here, once, at
//! registration:
//!
//! ```text
//! with_state(mediator, create)                        ← or any Fn(Request)
//!        ↓ router.on(Method::Post, "/companies", …)
//! handler.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(handler))                        ← BoxedHandler
//!        ↓ at request time, after routing
//! handler.call(req)                                   ← one vtable dispatch
//!        ↓
//! Box::pin(async { handler(req).await.into_response() })
//! ```
//!
//! Per request that costs one `Arc` clone out of the routing table, one
//! virtual call and one boxed future. The mediator behind the route already
//! boxes a future per pipeline stage, so this adds nothing new in kind.
//!
//! # Shared state
//!
//! A handler is `Fn(Request)` and nothing else; there is no extractor
//! machinery. State such as the [`Mediator`](crate::pipeline::Mediator)
//! reaches a route through [`with_state`], which closes over an `Arc` and
//! clones it into each call.

use std::future::Future;
use std::sync::Arc;

use crate::pipeline::BoxFuture;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Erased form ───────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)`: it shows up in the return
/// type of [`Handler::into_boxed_handler`], and a private trait may not
/// appear in a public signature. Nothing outside the crate can do anything
/// useful with it.
///
/// The returned future is `'static` because the server spawns it onto its
/// own connection task; it must not borrow the router or the handler.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, Response>;
}

/// A type-erased handler as stored in the routing table.
///
/// `Arc` rather than `Box` because the table is shared by every connection
/// task, and each lookup hands out its own reference.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public trait ──────────────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Never implemented by hand. Any function or closure of this shape
/// qualifies:
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse> + Send + 'static
/// ```
///
/// The future has to own everything it touches, which is why route handlers
/// take `Request` by value and why state goes through `with_state`.
///
/// Sealed through the private `Sealed` supertrait, so the blanket impl below
/// is the only one there will ever be.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// `Sealed` is nameable only inside this module, so no other crate can
/// implement [`Handler`].
mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Pairs `f` with shared state, producing a [`Handler`].
///
/// Each request gets its own clone of `state`, so the future `f` returns can
/// own it and stay `'static`.
///
/// ```rust,ignore
/// router.on(Method::Post, "/companies", with_state(mediator, |m, req| async move {
///     create_company(&m, req).await
/// }))
/// ```
pub(crate) fn with_state<S, F, Fut, R>(state: Arc<S>, f: F) -> impl Handler
where
    S: Send + Sync + 'static,
    F: Fn(Arc<S>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req: Request| f(Arc::clone(&state), req)
}

// ── Wrapper ───────────────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        // Calling `F` only builds the future; the handler body runs when the
        // server polls the boxed result.
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
