use docket_documents::DocumentDomain;
use docket_kernel::prelude::*;
use docket_schema::SchemaRegistry;
use docket_server::bootstrap::DocketRest;
use docket_server::{App, LifecycleState, RestServer};
use docket_storage::DocumentRepository;
use std::future::pending;
use std::net::{Ipv4Addr, TcpListener};
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, Instant, sleep};

const SCHEMA_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../schemas/post_document.json");

async fn rest_on(data_dir: &Path, port: u16) -> DocketRest {
    let source = format!(
        "[storage]\ndata_dir = '{}'\n\n[server]\nport = {port}\ntimeout = \"2s\"\nschema = '{SCHEMA_PATH}'\n",
        data_dir.display()
    );
    let conf = Settings::from_toml(&source).unwrap();
    let store = DocumentRepository::connect(&conf).await.unwrap();
    RestServer::new(&conf, DocumentDomain::new(store), SchemaRegistry::new()).await.unwrap()
}

fn free_port() -> u16 {
    TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap().local_addr().unwrap().port()
}

async fn connect(port: u16) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await {
            return stream;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("server on port {port} never accepted a connection");
}

async fn request(port: u16, raw: &str) -> String {
    let mut stream = connect(port).await;
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_over_tcp_until_signalled_then_stops() {
    let dir = TempDir::new().unwrap();
    let port = free_port();
    let mut app = App::new(rest_on(dir.path(), port).await);

    let mut response = String::new();
    let signal = async {
        response = request(
            port,
            "GET /documents/000000000000000000000000 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        Ok::<_, Error>("SIGTERM")
    };
    app.start_until(signal).await.unwrap();
    assert_eq!(app.state(), LifecycleState::Stopping);
    assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");

    app.stop(Instant::now() + Duration::from_secs(5)).await.unwrap();
    assert_eq!(app.state(), LifecycleState::Stopped);
    assert!(TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await.is_err());
}

#[tokio::test]
async fn occupied_port_fails_start() {
    let dir = TempDir::new().unwrap();
    let taken = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
    let port = taken.local_addr().unwrap().port();
    let mut app = App::new(rest_on(dir.path(), port).await);

    let err = app.start_until(pending()).await.unwrap_err();
    assert!(err.to_string().starts_with("failed to start drivers: "), "{err}");
    assert!(err.to_string().contains(&format!("0.0.0.0:{port}")), "{err}");
    assert!(err.is(ErrorKind::Internal));
    assert_eq!(app.state(), LifecycleState::Stopped);

    app.stop(Instant::now() + Duration::from_secs(5)).await.unwrap();
    drop(taken);
}
