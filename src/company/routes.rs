//! HTTP adapter for the company commands.

use std::sync::Arc;

use tracing::debug;

use super::CreateCompany;
use crate::handler::with_state;
use crate::method::Method;
use crate::pipeline::Mediator;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;

/// Adds the company routes to `router`.
pub fn routes(router: Router, mediator: Arc<Mediator>) -> Router {
    router.on(
        Method::Post,
        "/companies",
        with_state(mediator, |mediator, req| async move { create_company(&mediator, req).await }),
    )
}

/// `POST /companies`: decode, dispatch, encode.
///
/// `400` for a body that is not a valid [`CreateCompany`]; dispatch failures
/// map through [`DispatchError`](crate::DispatchError)'s `IntoResponse`.
pub async fn create_company(mediator: &Mediator, req: Request) -> Response {
    let cmd: CreateCompany = match req.json() {
        Ok(cmd) => cmd,
        Err(e) => {
            debug!("rejecting company body: {e}");
            return Response::error(Status::BadRequest, format!("invalid body: {e}"));
        }
    };

    mediator
        .send_cancellable(cmd, req.cancellation())
        .await
        .map(Json)
        .into_response()
}
