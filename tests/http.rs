use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use conduit::company::{self, CompanyCreated, CreateCompany, CreateCompanyHandler};
use conduit::pipeline::{Behavior, BoxFuture, Command, DispatchResult, Mediator, Next, Pipeline};
use conduit::{Router, Server};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use regex::Regex;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), conduit::Error>>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(company::mediator(), Duration::from_secs(30)).await
    }

    async fn start_with(mediator: Mediator, grace: Duration) -> Self {
        let app = company::routes(Router::new(), Arc::new(mediator));
        let server = Server::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap()
            .shutdown_grace(grace);
        let addr = server.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve_with_shutdown(app, async {
            let _ = stopped.await;
        }));
        Self { addr, stop, handle }
    }

    async fn send(&self, method: &str, path: &str, body: &'static str) -> (u16, Bytes) {
        send(self.addr, method, path, body).await
    }

    async fn stop(self) {
        self.stop.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

/// Sends one request on a fresh connection and returns status and body.
async fn send(addr: SocketAddr, method: &str, path: &str, body: &'static str) -> (u16, Bytes) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
    tokio::spawn(conn);

    let req = http::Request::builder()
        .method(method)
        .uri(path)
        .header("host", addr.to_string())
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap();

    let res = sender.send_request(req).await.unwrap();
    let status = res.status().as_u16();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

/// Holds the command for a while before passing it on.
struct Stall(Duration);

impl<C: Command> Behavior<C> for Stall {
    fn handle<'a>(&'a self, cmd: C, next: Next<'a, C>) -> BoxFuture<'a, DispatchResult<C>> {
        Box::pin(async move {
            tokio::time::sleep(self.0).await;
            next.run(cmd).await
        })
    }
}

#[tokio::test]
async fn post_companies_returns_enriched_record() {
    let server = TestServer::start().await;

    let (status, body) = server
        .send("POST", "/companies", r#"{"name":"Acme","address":"1 Road Runner Way"}"#)
        .await;

    assert_eq!(status, 200);
    let out: CompanyCreated = serde_json::from_slice(&body).unwrap();
    assert_eq!(out.name, "Acme");
    assert_eq!(out.address, "1 Road Runner Way");
    assert!(Regex::new(r"^123456789-.{20}$").unwrap().is_match(&out.key));
    assert!(uuid::Uuid::parse_str(&out.hash).is_ok());

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let mut fields: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    fields.sort();
    assert_eq!(fields, ["address", "hash", "id", "key", "name"]);

    server.stop().await;
}

#[tokio::test]
async fn invalid_body_is_rejected() {
    let server = TestServer::start().await;

    let (status, body) = server.send("POST", "/companies", "{").await;
    assert_eq!(status, 400);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("invalid body"));

    server.stop().await;
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let server = TestServer::start().await;

    assert_eq!(server.send("GET", "/companies", "").await.0, 405);
    assert_eq!(server.send("POST", "/elsewhere", "").await.0, 404);
    assert_eq!(server.send("PURGE", "/companies", "").await.0, 405);

    server.stop().await;
}

#[tokio::test]
async fn expired_grace_period_cancels_in_flight_pipeline() {
    let mediator = Mediator::builder()
        .register(
            Pipeline::<CreateCompany>::new(CreateCompanyHandler)
                .behavior(Stall(Duration::from_millis(600))),
        )
        .build();
    let server = TestServer::start_with(mediator, Duration::from_millis(100)).await;

    let in_flight = tokio::spawn(send(
        server.addr,
        "POST",
        "/companies",
        r#"{"name":"Acme","address":"x"}"#,
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    server.stop().await;

    let (status, body) = in_flight.await.unwrap();
    assert_eq!(status, 503);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "error": "dispatch cancelled" }));
}

#[tokio::test]
async fn request_within_grace_period_completes() {
    let mediator = Mediator::builder()
        .register(company::pipeline().behavior(Stall(Duration::from_millis(100))))
        .build();
    let server = TestServer::start_with(mediator, Duration::from_secs(5)).await;

    let in_flight = tokio::spawn(send(
        server.addr,
        "POST",
        "/companies",
        r#"{"name":"Acme","address":"x"}"#,
    ));
    tokio::time::sleep(Duration::from_millis(20)).await;
    server.stop().await;

    let (status, body) = in_flight.await.unwrap();
    assert_eq!(status, 200);
    let out: CompanyCreated = serde_json::from_slice(&body).unwrap();
    assert_eq!(out.name, "Acme");
}
