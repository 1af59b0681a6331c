//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use rest_resource::config::{ResourceConfig, ServerConfig};
use rest_resource::http::HttpServer;
use rest_resource::lifecycle::{build_server, Shutdown};
use tokio::net::TcpListener;

/// A server running on an ephemeral port. Stops when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// The three records every scenario starts from.
pub fn seeded_resource(name: &str, path: &str) -> ResourceConfig {
    let mut resource = ResourceConfig {
        name: name.into(),
        path: path.into(),
        ..Default::default()
    };
    for (key, value) in [("Peter", "Lemon"), ("Paul", "Tree"), ("Mary", "Very Pretty")] {
        resource.seed.insert(key.into(), value.into());
    }
    resource
}

/// Default config with the seeded resource mounted at `/`.
pub fn seeded_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.resources = vec![seeded_resource("kv", "/")];
    config
}

/// Build the server the binary would build and start it.
pub async fn spawn_config(config: ServerConfig) -> TestServer {
    spawn_server(build_server(config).unwrap()).await
}

/// Start an already assembled server.
pub async fn spawn_server(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stopped = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, stopped).await;
    });

    TestServer { addr, shutdown }
}

/// Client that never reuses connections, so an abandoned body closes its socket.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
