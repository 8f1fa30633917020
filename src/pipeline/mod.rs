//! In-process mediator pipeline.
//!
//! A [`Command`] is sent to the [`Mediator`], which looks up the pipeline
//! registered for that command type and walks it:
//!
//! ```text
//! mediator.send(cmd)
//!        ↓
//! Behavior₁ ── before ──┐                    ┌── after ── Behavior₁ → caller
//!        ↓              │                    │
//! Behavior₂ ── before ──┤                    ├── after ── Behavior₂
//!        ↓              │                    │
//!        …              └──→ CommandHandler ─┘
//! ```
//!
//! Behaviors run in the order they were registered. Each one receives the
//! command by value and a [`Next`] for the rest of the chain. It may change
//! the command before passing it on, refuse to pass it on (returning an
//! error), or look at the output on its way back.
//!
//! Ownership of the command moves from stage to stage. That is the only
//! channel between stages of one dispatch; concurrent dispatches share
//! nothing but the immutable [`Mediator`].

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::DispatchError;

mod mediator;
mod trace;

pub use mediator::{Mediator, MediatorBuilder, Pipeline};
pub use trace::Trace;

// ── Core types ────────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future borrowed for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What every pipeline stage resolves to.
pub type DispatchResult<C> = Result<<C as Command>::Output, DispatchError>;

/// A request that can be sent through the [`Mediator`].
///
/// The associated `Output` is the value its handler produces.
pub trait Command: Send + 'static {
    type Output: Send + 'static;
}

/// Terminal stage of a pipeline. Exactly one per command type.
pub trait CommandHandler<C: Command>: Send + Sync + 'static {
    fn handle<'a>(&'a self, cmd: C, cancel: &'a CancellationToken) -> BoxFuture<'a, DispatchResult<C>>;
}

/// An interceptor wrapped around the rest of the pipeline.
///
/// Implementations must call `next.run(cmd)` at most once. Returning without
/// calling it short-circuits the chain: no later behavior and no handler runs.
pub trait Behavior<C: Command>: Send + Sync + 'static {
    fn handle<'a>(&'a self, cmd: C, next: Next<'a, C>) -> BoxFuture<'a, DispatchResult<C>>;
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The remainder of a pipeline, from the behavior at `index` to the handler.
pub struct Next<'a, C: Command> {
    behaviors: &'a [Box<dyn Behavior<C>>],
    index: usize,
    handler: &'a dyn CommandHandler<C>,
    cancel: &'a CancellationToken,
}

impl<'a, C: Command> Next<'a, C> {
    pub(crate) fn new(
        behaviors: &'a [Box<dyn Behavior<C>>],
        handler: &'a dyn CommandHandler<C>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self { behaviors, index: 0, handler, cancel }
    }

    /// Runs the next stage: the behavior at `index`, or the handler once every
    /// behavior has been entered.
    ///
    /// Fails with [`DispatchError::Cancelled`] without entering the stage if
    /// the dispatch has been cancelled.
    pub fn run(self, cmd: C) -> BoxFuture<'a, DispatchResult<C>> {
        if self.cancel.is_cancelled() {
            return Box::pin(std::future::ready(Err(DispatchError::Cancelled)));
        }

        let behaviors = self.behaviors;
        match behaviors.get(self.index) {
            Some(behavior) => behavior.handle(cmd, Next { index: self.index + 1, ..self }),
            None => self.handler.handle(cmd, self.cancel),
        }
    }

    /// The cancellation signal of this dispatch.
    pub fn cancellation(&self) -> &'a CancellationToken {
        self.cancel
    }
}

// ── Function handlers ─────────────────────────────────────────────────────────

/// Adapts an async function into a [`CommandHandler`].
///
/// ```rust
/// use conduit::pipeline::{handler_fn, Command, Mediator, Pipeline};
///
/// struct Ping;
/// impl Command for Ping { type Output = &'static str; }
///
/// let mediator = Mediator::builder()
///     .register(Pipeline::new(handler_fn(|_: Ping| async { Ok("pong") })))
///     .build();
/// ```
pub fn handler_fn<C, F, Fut>(f: F) -> HandlerFn<F, C>
where
    C: Command,
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DispatchResult<C>> + Send + 'static,
{
    HandlerFn { f, _command: PhantomData }
}

/// Returned by [`handler_fn`].
pub struct HandlerFn<F, C> {
    f: F,
    _command: PhantomData<fn(C)>,
}

impl<C, F, Fut> CommandHandler<C> for HandlerFn<F, C>
where
    C: Command,
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DispatchResult<C>> + Send + 'static,
{
    fn handle<'a>(&'a self, cmd: C, _cancel: &'a CancellationToken) -> BoxFuture<'a, DispatchResult<C>> {
        Box::pin((self.f)(cmd))
    }
}
