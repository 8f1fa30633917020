//! Per-dispatch tracing span.

use std::any::type_name;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use super::{Behavior, BoxFuture, Command, DispatchResult, Next};

/// Wraps the rest of the pipeline in a span named after the command type and
/// logs the outcome with its latency. Leaves command and output untouched.
///
/// Register it first to cover every other stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl<C: Command> Behavior<C> for Trace {
    fn handle<'a>(&'a self, cmd: C, next: Next<'a, C>) -> BoxFuture<'a, DispatchResult<C>> {
        let span = info_span!("dispatch", command = short_name::<C>());
        Box::pin(
            async move {
                info!("handling command");
                let started = Instant::now();
                let out = next.run(cmd).await;
                let elapsed_us = started.elapsed().as_micros() as u64;
                match &out {
                    Ok(_) => info!(elapsed_us, "command handled"),
                    Err(e) => warn!(elapsed_us, error = %e, "command failed"),
                }
                out
            }
            .instrument(span),
        )
    }
}

/// `conduit::company::CreateCompany` → `CreateCompany`.
fn short_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
