use std::net::SocketAddr;
use std::sync::Arc;

use commandeer::commands::{self, Command, CommandStatus, CommandStore, Data};
use async_trait::async_trait;
use commandeer::middleware::{Middleware, Next, RequestLogging};
use commandeer::sink::{Logger, MemorySink};
use commandeer::{health, Error, Request, Response, Router, Server};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing_subscriber::filter::LevelFilter;

struct TestServer {
    addr: SocketAddr,
    sink: MemorySink,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), commandeer::Error>>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(|app| app).await
    }

    /// Starts with extra layers added inside the request logger.
    async fn start_with(inner: impl FnOnce(Router) -> Router) -> Self {
        let sink = MemorySink::new();
        let logger = Logger::with_writer(sink.clone(), LevelFilter::INFO);
        let store = Arc::new(CommandStore::in_memory().unwrap());

        let app = Router::new()
            .get("/healthz", health::liveness)
            .get("/readyz", health::readiness);
        let app = inner(commands::mount(app, store).layer(RequestLogging::new(logger)));

        let server = Server::bind(([127, 0, 0, 1], 0).into()).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve_with_shutdown(app, async move {
            let _ = stopped.await;
        }));

        Self { addr, sink, stop, handle }
    }

    /// One HTTP/1.1 exchange on a fresh connection; returns status and body.
    async fn send(&self, method: &str, path: &str, body: Option<&str>) -> (u16, String) {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        let body = body.unwrap_or("");
        let request = format!(
            "{method} {path} HTTP/1.1\r\n\
             host: {addr}\r\n\
             content-type: application/json\r\n\
             content-length: {len}\r\n\
             connection: close\r\n\r\n{body}",
            addr = self.addr,
            len = body.len(),
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let raw = String::from_utf8(raw).unwrap();

        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
        (status, body.to_owned())
    }

    async fn stop(self) -> MemorySink {
        self.stop.send(()).unwrap();
        self.handle.await.unwrap().unwrap();
        self.sink
    }
}

#[tokio::test]
async fn create_list_delete_roundtrip() {
    let server = TestServer::start().await;

    let (status, body) = server.send("GET", "/commands/", None).await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"data":[]}"#);

    let (status, body) = server
        .send("POST", "/commands/", Some(r#"{"command_type":1,"params":"1,2,3"}"#))
        .await;
    assert_eq!(status, 200);
    let created: Data<Command> = serde_json::from_str(&body).unwrap();
    assert_eq!(created.data.command_type, 1);
    assert_eq!(created.data.status, CommandStatus::Pending);
    assert_eq!(created.data.params.as_deref(), Some("1,2,3"));

    let (_, body) = server.send("POST", "/commands/", Some(r#"{"command_type":2}"#)).await;
    let second: Data<Command> = serde_json::from_str(&body).unwrap();

    let (status, body) = server.send("GET", "/commands/", None).await;
    assert_eq!(status, 200);
    let listed: Data<Vec<Command>> = serde_json::from_str(&body).unwrap();
    assert_eq!(listed.data, vec![created.data.clone(), second.data.clone()]);

    let path = format!("/commands/{}", created.data.id);
    let (status, body) = server.send("DELETE", &path, None).await;
    assert_eq!(status, 200);
    let remaining: Data<Vec<Command>> = serde_json::from_str(&body).unwrap();
    assert_eq!(remaining.data, vec![second.data]);

    server.stop().await;
}

#[tokio::test]
async fn deleting_unknown_id_is_404() {
    let server = TestServer::start().await;

    let (status, body) = server.send("DELETE", "/commands/99", None).await;
    assert_eq!(status, 404);
    let detail: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(detail["detail"], "Command with id 99 not found.");

    server.stop().await;
}

#[tokio::test]
async fn invalid_input_is_422() {
    let server = TestServer::start().await;

    let (status, _) = server.send("POST", "/commands/", Some(r#"{"params":"x"}"#)).await;
    assert_eq!(status, 422);
    let (status, _) = server.send("POST", "/commands/", Some("not json")).await;
    assert_eq!(status, 422);
    let (status, _) = server.send("DELETE", "/commands/abc", None).await;
    assert_eq!(status, 422);

    server.stop().await;
}

#[tokio::test]
async fn health_probes_answer() {
    let server = TestServer::start().await;
    assert_eq!(server.send("GET", "/healthz", None).await, (200, "ok".to_owned()));
    assert_eq!(server.send("GET", "/readyz", None).await, (200, "ready".to_owned()));
    server.stop().await;
}

#[tokio::test]
async fn every_request_over_the_wire_is_logged() {
    let server = TestServer::start().await;
    server.send("GET", "/commands/?verbose=1", None).await;
    server.send("DELETE", "/commands/5", None).await;
    let sink = server.stop().await;

    let lines = sink.lines();
    assert_eq!(lines.len(), 4, "{lines:#?}");
    assert!(lines[0].contains("Incoming request method=GET"));
    assert!(lines[0].contains(r#"query_params={"verbose": "1"}"#));
    assert!(lines[1].contains("Outgoing response status_code=200"));
    assert!(lines[2].contains("Incoming request method=DELETE"));
    assert!(lines[3].contains("Outgoing response status_code=404"));
}

/// Fails every request it sees.
struct Unavailable;

#[async_trait]
impl Middleware for Unavailable {
    async fn handle(&self, _req: Request, _next: Next) -> Result<Response, Error> {
        Err(Error::downstream("backend unavailable"))
    }
}

#[tokio::test]
async fn chain_failure_is_a_500_and_an_error_entry() {
    let server = TestServer::start_with(|app| app.layer(Unavailable)).await;

    let (status, body) = server.send("GET", "/commands/", None).await;
    assert_eq!(status, 500);
    assert!(body.is_empty(), "{body}");

    let lines = server.stop().await.lines();
    assert_eq!(lines.len(), 2, "{lines:#?}");
    assert!(lines[0].contains(" | INFO | Incoming request method=GET"), "{}", lines[0]);
    assert!(lines[1].contains(" | ERROR | Request failed "), "{}", lines[1]);
    assert!(lines[1].contains("error=backend unavailable"), "{}", lines[1]);
}
