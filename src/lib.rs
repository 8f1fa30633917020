//! # conduit
//!
//! An in-process mediator with ordered behaviors, and a small HTTP front for
//! it.
//!
//! A [`Command`](pipeline::Command) is sent to a [`Mediator`](pipeline::Mediator).
//! The mediator runs the behaviors registered for that command type in
//! registration order, then the command's one handler, then hands the output
//! back out through the same behaviors in reverse:
//!
//! ```text
//! POST /companies ─→ Trace ─→ AddKey ─→ AddHash ─→ CreateCompanyHandler
//!                 ←─       ←─        ←─         ←─ CompanyCreated
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use conduit::{Router, Server, company};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), conduit::Error> {
//!     let mediator = Arc::new(company::mediator());
//!     let app = company::routes(Router::new(), mediator);
//!
//!     Server::bind("0.0.0.0:3000".parse().unwrap()).await?.serve(app).await
//! }
//! ```
//!
//! ## Writing a behavior
//!
//! ```rust
//! use conduit::pipeline::{Behavior, BoxFuture, Command, DispatchResult, Next};
//!
//! struct Audit;
//!
//! impl<C: Command> Behavior<C> for Audit {
//!     fn handle<'a>(&'a self, cmd: C, next: Next<'a, C>) -> BoxFuture<'a, DispatchResult<C>> {
//!         Box::pin(async move {
//!             let out = next.run(cmd).await;
//!             tracing::info!(ok = out.is_ok(), "audited");
//!             out
//!         })
//!     }
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod company;
pub mod config;
pub mod logging;
pub mod pipeline;

pub use error::{DispatchError, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
