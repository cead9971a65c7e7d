//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use connectivity_monitor::{Probe, ProbeResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Notify};

/// Read until the end of the request head and return it.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        204 => "204 No Content",
        301 => "301 Moved Permanently",
        302 => "302 Found",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a backend answering every request with `status` and `body`.
/// Each request head received is forwarded on the returned channel.
pub async fn start_backend(
    status: u16,
    extra_headers: String,
    body: String,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let body = Arc::new(body);
    let extra_headers = Arc::new(extra_headers);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            let body = body.clone();
            let extra_headers = extra_headers.clone();
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                let _ = tx.send(request);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
                    status_line(status),
                    body.len(),
                    extra_headers,
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(body.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

pub async fn start_status_backend(status: u16) -> SocketAddr {
    start_backend(status, String::new(), "ok".to_string()).await.0
}

/// Start a backend that accepts and reads the request but never answers.
/// The returned `Notify` fires when the client closes the connection.
pub async fn start_hanging_backend() -> (SocketAddr, Arc<Notify>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let disconnected = Arc::new(Notify::new());
    let notify = disconnected.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let notify = notify.clone();
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                let mut rest = [0u8; 256];
                loop {
                    match socket.read(&mut rest).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => continue,
                    }
                }
                notify.notify_one();
            });
        }
    });

    (addr, disconnected)
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Call and concurrency counters shared with a `ScriptedProbe`.
#[derive(Default)]
pub struct ProbeStats {
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ProbeStats {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a ProbeStats);

impl<'a> InFlight<'a> {
    fn enter(stats: &'a ProbeStats) -> Self {
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(stats)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A probe returning queued results, then a fallback, after an optional delay.
pub struct ScriptedProbe {
    name: &'static str,
    script: Mutex<VecDeque<ProbeResult>>,
    fallback: ProbeResult,
    delay: Duration,
    stats: Arc<ProbeStats>,
}

impl ScriptedProbe {
    pub fn always(name: &'static str, result: ProbeResult) -> Self {
        Self::scripted(name, Vec::new(), result)
    }

    pub fn scripted(
        name: &'static str,
        script: impl IntoIterator<Item = ProbeResult>,
        fallback: ProbeResult,
    ) -> Self {
        Self {
            name,
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            delay: Duration::ZERO,
            stats: Arc::new(ProbeStats::default()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn stats(&self) -> Arc<ProbeStats> {
        self.stats.clone()
    }
}

impl Probe for ScriptedProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn probe(&self) -> ProbeResult {
        self.stats.calls.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight::enter(&self.stats);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(self.fallback)
    }
}

/// A probe that always panics.
pub struct PanickingProbe;

impl Probe for PanickingProbe {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn probe(&self) -> ProbeResult {
        panic!("simulated probe defect")
    }
}

pub fn ok(ms: f64) -> ProbeResult {
    ProbeResult::success(ms)
}

pub fn fail() -> ProbeResult {
    ProbeResult::failure()
}
