//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use v2ray_user_api::config::ShimConfig;
use v2ray_user_api::upstream::{StatRecord, StatsQuery, UpstreamError, UserIdentity};
use v2ray_user_api::{HttpServer, ManagementApi, Shutdown};

/// In-memory stand-in for the management service.
///
/// Records every call and answers with whatever the test scripted.
#[derive(Default)]
pub struct MockManagement {
    calls: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
    stats: Mutex<Vec<StatRecord>>,
}

#[allow(dead_code)]
impl MockManagement {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every following call fail with this remote error text.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_stats(&self, stats: Vec<StatRecord>) {
        *self.stats.lock().unwrap() = stats;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), UpstreamError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(UpstreamError::Rpc(tonic::Status::unknown(message.clone()))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ManagementApi for MockManagement {
    async fn add_user(&self, identity: &UserIdentity) -> Result<(), UpstreamError> {
        self.record(format!("add {} {}", identity.email, identity.uuid))
    }

    async fn remove_user(&self, email: &str) -> Result<(), UpstreamError> {
        self.record(format!("remove {email}"))
    }

    async fn query_stats(&self, query: StatsQuery) -> Result<Vec<StatRecord>, UpstreamError> {
        self.record(format!("stats {} reset={}", query.pattern, query.reset))?;
        Ok(self.stats.lock().unwrap().clone())
    }
}

/// A running shim instance; dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

async fn serve(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown }
}

/// Start the shim in front of a mock management service.
#[allow(dead_code)]
pub async fn start_with_mock(api: Arc<MockManagement>) -> TestServer {
    serve(HttpServer::with_api(ShimConfig::default(), api)).await
}

/// Start the shim with its real gRPC client.
#[allow(dead_code)]
pub async fn start_with_config(config: ShimConfig) -> TestServer {
    serve(HttpServer::new(config)).await
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Start a backend that answers every connection with plain HTTP/1.1,
/// which no gRPC client can use.
#[allow(dead_code)]
pub async fn start_non_grpc_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let body = "not grpc";
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
