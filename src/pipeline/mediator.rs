//! Pipeline registry and dispatch.
//!
//! One pipeline per command type, keyed by [`TypeId`]. Build it once at
//! startup; share it behind an `Arc`. Nothing in here is mutable after
//! [`MediatorBuilder::build`], so concurrent dispatches need no locking.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Behavior, Command, CommandHandler, DispatchResult, Next};
use crate::error::DispatchError;

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// A handler plus the behaviors wrapped around it, in execution order.
pub struct Pipeline<C: Command> {
    behaviors: Vec<Box<dyn Behavior<C>>>,
    handler: Box<dyn CommandHandler<C>>,
}

impl<C: Command> Pipeline<C> {
    pub fn new(handler: impl CommandHandler<C>) -> Self {
        Self { behaviors: Vec::new(), handler: Box::new(handler) }
    }

    /// Appends a behavior. Behaviors run in the order they are added:
    /// the first one added sees the command first and the output last.
    pub fn behavior(mut self, behavior: impl Behavior<C>) -> Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

// ── Mediator ──────────────────────────────────────────────────────────────────

/// Routes each command to the pipeline registered for its type.
///
/// ```rust
/// use conduit::pipeline::{handler_fn, Command, Mediator, Pipeline, Trace};
///
/// struct Ping;
/// impl Command for Ping { type Output = u32; }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mediator = Mediator::builder()
///     .register(Pipeline::new(handler_fn(|_: Ping| async { Ok(7) })).behavior(Trace))
///     .build();
///
/// assert_eq!(mediator.send(Ping).await.unwrap(), 7);
/// # }
/// ```
pub struct Mediator {
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Mediator {
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder { pipelines: HashMap::new() }
    }

    /// Sends `cmd` through its pipeline with a fresh, never-cancelled token.
    pub async fn send<C: Command>(&self, cmd: C) -> DispatchResult<C> {
        self.send_cancellable(cmd, &CancellationToken::new()).await
    }

    /// Sends `cmd` through its pipeline.
    ///
    /// Each registered behavior is entered at most once, in registration
    /// order, and the handler at most once after all of them. `cancel` is
    /// checked before every stage.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NoHandlerRegistered`] if `C` has no pipeline; no
    /// behavior runs in that case. Otherwise whatever a stage returns.
    pub async fn send_cancellable<C: Command>(
        &self,
        cmd: C,
        cancel: &CancellationToken,
    ) -> DispatchResult<C> {
        let pipeline = self.pipeline::<C>().ok_or(DispatchError::NoHandlerRegistered {
            command: type_name::<C>(),
        })?;

        debug!(command = type_name::<C>(), behaviors = pipeline.len(), "dispatching");
        Next::new(&pipeline.behaviors, pipeline.handler.as_ref(), cancel)
            .run(cmd)
            .await
    }

    /// Whether a pipeline is registered for `C`.
    pub fn handles<C: Command>(&self) -> bool {
        self.pipeline::<C>().is_some()
    }

    fn pipeline<C: Command>(&self) -> Option<&Pipeline<C>> {
        self.pipelines
            .get(&TypeId::of::<C>())
            .and_then(|p| p.downcast_ref::<Pipeline<C>>())
    }
}

// ── MediatorBuilder ───────────────────────────────────────────────────────────

/// Collects pipelines before they are frozen into a [`Mediator`].
pub struct MediatorBuilder {
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MediatorBuilder {
    /// Registers the pipeline for command type `C`. Returns `self` for chaining.
    ///
    /// # Panics
    ///
    /// Panics if a pipeline for `C` is already registered. A command type has
    /// exactly one handler; a second registration is a wiring bug.
    pub fn register<C: Command>(mut self, pipeline: Pipeline<C>) -> Self {
        if self.pipelines.insert(TypeId::of::<C>(), Box::new(pipeline)).is_some() {
            panic!("duplicate pipeline for `{}`", type_name::<C>());
        }
        self
    }

    pub fn build(self) -> Mediator {
        Mediator { pipelines: self.pipelines }
    }
}
