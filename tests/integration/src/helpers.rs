//! Test helpers for spawning a cubby-server and speaking its protocol.

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A cubby-server subprocess managed by the test harness.
pub struct TestServer {
    child: Child,
    pub port: u16,
}

/// Options for starting a test server.
pub struct ServerOptions {
    pub max_sessions: usize,
    pub max_entries: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            max_sessions: 5,
            max_entries: 5,
        }
    }
}

impl TestServer {
    /// Starts a new cubby-server on a random port with default capacities.
    ///
    /// Blocks until the server is accepting connections (up to 5 seconds).
    pub fn start() -> Self {
        Self::start_with(ServerOptions::default())
    }

    /// Starts a new cubby-server with custom capacities.
    pub fn start_with(opts: ServerOptions) -> Self {
        let port = find_free_port();
        let binary = server_binary();

        let mut cmd = Command::new(&binary);
        cmd.arg("--host").arg("127.0.0.1");
        cmd.arg("--port").arg(port.to_string());
        cmd.arg("--max-sessions").arg(opts.max_sessions.to_string());
        cmd.arg("--max-entries").arg(opts.max_entries.to_string());
        // suppress tracing output in tests
        cmd.env("RUST_LOG", "error");

        let child = cmd
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .unwrap_or_else(|e| {
                panic!("failed to spawn cubby-server at {}: {e}", binary.display())
            });

        // wait for the server to be ready
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            if std::time::Instant::now() > deadline {
                panic!("cubby-server failed to start within 5 seconds on port {port}");
            }
            if std::net::TcpStream::connect(format!("127.0.0.1:{port}")).is_ok() {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        Self { child, port }
    }

    /// Opens a raw (not yet CONNECTed) client to this server.
    pub async fn client(&self) -> TestClient {
        TestClient::open(self.port).await
    }

    /// Opens a client and completes the CONNECT exchange as `id`.
    pub async fn connect_as(&self, id: &str) -> TestClient {
        let mut c = self.client().await;
        assert_eq!(c.cmd(&format!("CONNECT {id}")).await, "CONNECT: OK");
        c
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A minimal line-protocol client for integration testing.
pub struct TestClient {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl TestClient {
    async fn open(port: u16) -> Self {
        let stream = TcpStream::connect(format!("127.0.0.1:{port}"))
            .await
            .unwrap_or_else(|e| panic!("failed to connect to 127.0.0.1:{port}: {e}"));
        Self {
            stream,
            buf: Vec::new(),
        }
    }

    /// Sends one newline-terminated request line.
    pub async fn send(&mut self, line: &str) {
        self.stream
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    /// Reads one newline-terminated response line.
    pub async fn reply(&mut self) -> String {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buf.drain(..=pos).take(pos).collect();
                return String::from_utf8(line).unwrap();
            }
            let mut chunk = [0u8; 256];
            let n = self.stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "server closed connection while waiting for a reply");
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }

    /// Sends a request line and returns the response line.
    pub async fn cmd(&mut self, line: &str) -> String {
        self.send(line).await;
        self.reply().await
    }

    /// Asserts the server has closed this connection without further data.
    pub async fn expect_closed(&mut self) {
        let mut chunk = [0u8; 1];
        assert_eq!(
            self.stream.read(&mut chunk).await.unwrap(),
            0,
            "expected the server to close the connection"
        );
    }
}

/// Finds a free TCP port by binding to port 0.
fn find_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Locates the cubby-server binary in the cargo target directory.
fn server_binary() -> PathBuf {
    // test binary is in target/debug/deps/ — go up to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("cubby-server");
    if !path.exists() {
        panic!(
            "cubby-server binary not found. run `cargo build` first.\nlooked at: {}",
            path.display()
        );
    }
    path
}
