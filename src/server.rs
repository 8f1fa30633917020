//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Stops accepting connections and asks every open connection to close
//!    once its current request is answered.
//! 2. Waits up to the shutdown grace period for those connections to finish.
//! 3. If some are still running, cancels their requests' cancellation tokens
//!    (pipelines stop at their next stage) and waits for them to unwind.
//!
//! Keep the grace period shorter than the orchestrator's kill timeout.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Route, Router};
use crate::status::Status;

const DEFAULT_GRACE: Duration = Duration::from_secs(30);

/// The HTTP server.
pub struct Server {
    listener: TcpListener,
    shutdown_grace: Duration,
}

impl Server {
    /// Binds the listening socket. Port `0` picks a free port; see
    /// [`local_addr`](Server::local_addr).
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, shutdown_grace: DEFAULT_GRACE })
    }

    /// How long shutdown waits for in-flight requests before cancelling them.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then shuts down gracefully.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then shuts down gracefully.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let addr = self.local_addr()?;
        let router = Arc::new(router);

        // `closing` tells connections to finish up; `abort` reaches into the
        // requests themselves once the grace period is over.
        let closing = CancellationToken::new();
        let abort = CancellationToken::new();
        let mut tasks = JoinSet::new();

        info!(%addr, "conduit listening");

        tokio::pin!(signal);

        loop {
            tokio::select! {
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = self.listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };
                    tasks.spawn(serve_connection(
                        stream,
                        peer,
                        Arc::clone(&router),
                        closing.clone(),
                        abort.clone(),
                    ));
                }

                // Reap finished connection tasks so the set does not grow
                // without bound.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(self.listener);
        closing.cancel();

        if tokio::time::timeout(self.shutdown_grace, drain(&mut tasks)).await.is_err() {
            warn!(
                in_flight = tasks.len(),
                grace_secs = self.shutdown_grace.as_secs(),
                "grace period elapsed, cancelling in-flight requests"
            );
            abort.cancel();
            drain(&mut tasks).await;
        }

        info!("conduit stopped");
        Ok(())
    }
}

async fn drain(tasks: &mut JoinSet<()>) {
    while tasks.join_next().await.is_some() {}
}

async fn serve_connection(
    stream: tokio::net::TcpStream,
    peer: SocketAddr,
    router: Arc<Router>,
    closing: CancellationToken,
    abort: CancellationToken,
) {
    let svc = service_fn(move |req| {
        let router = Arc::clone(&router);
        let cancel = abort.child_token();
        async move { dispatch(&router, req, cancel).await }
    });

    // HTTP/1.1 or HTTP/2, whichever the client speaks.
    let builder = ConnBuilder::new(TokioExecutor::new());
    let conn = builder.serve_connection(TokioIo::new(stream), svc);
    tokio::pin!(conn);

    let res = tokio::select! {
        res = conn.as_mut() => res,
        () = closing.cancelled() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    };

    if let Err(e) = res {
        error!(%peer, "connection error: {e}");
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Routes one request and produces one response. Every failure becomes a
/// response, so hyper never sees an error.
async fn dispatch(
    router: &Router,
    req: hyper::Request<Incoming>,
    cancel: CancellationToken,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    Ok(route(router, req, cancel).await.into_inner())
}

async fn route(router: &Router, req: hyper::Request<Incoming>, cancel: CancellationToken) -> Response {
    let Ok(method) = Method::try_from(req.method()) else {
        return Response::status(Status::MethodNotAllowed);
    };
    let path = req.uri().path().to_owned();

    let handler = match router.lookup(method, &path) {
        Route::Found(handler) => handler,
        Route::MethodNotAllowed => return Response::status(Status::MethodNotAllowed),
        Route::NotFound => return Response::status(Status::NotFound),
    };

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(%method, path = %path, "failed to read request body: {e}");
            return Response::status(Status::BadRequest);
        }
    };

    debug!(%method, path = %path, len = body.len(), "routing request");
    handler.call(Request::new(body, cancel)).await
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on SIGTERM or Ctrl-C (Ctrl-C only off Unix).
///
/// If a handler cannot be installed that signal is logged and ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
