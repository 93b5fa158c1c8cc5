// src/test_support.rs
// =============================================================================
// Test helpers: tiny HTTP origins running on localhost so checker tests never
// touch the internet.
//
// MockOrigin answers every request with a status chosen by a routing closure
// and remembers the method, path and Cookie header of everything it was
// asked. It can also hand out a cookie on HEAD, hold each answer back for a
// while, and count how many requests it was serving at the same time.
// =============================================================================

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

type Route = dyn Fn(&str, &str) -> u16 + Send + Sync;

/// One request as the origin saw it
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub cookie: Option<String>,
}

// Extras that change how the origin answers
#[derive(Default)]
struct Behavior {
    set_cookie_on_head: Option<&'static str>,
    delay: Duration,
}

// Requests being answered right now, and the most ever seen at once
#[derive(Default)]
struct InFlight {
    now: AtomicUsize,
    peak: AtomicUsize,
}

pub struct MockOrigin {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<SeenRequest>>>,
    in_flight: Arc<InFlight>,
}

impl MockOrigin {
    /// Starts an origin whose status comes from `route(method, path)`
    pub async fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &str) -> u16 + Send + Sync + 'static,
    {
        Self::serve(Arc::new(route), Behavior::default()).await
    }

    /// Like start(), but every HEAD answer also sets `cookie` (e.g. "session=abc")
    pub async fn start_with_cookie<F>(cookie: &'static str, route: F) -> Self
    where
        F: Fn(&str, &str) -> u16 + Send + Sync + 'static,
    {
        let behavior = Behavior {
            set_cookie_on_head: Some(cookie),
            ..Behavior::default()
        };
        Self::serve(Arc::new(route), behavior).await
    }

    /// Answers 200 to everything, but only after waiting `delay`
    pub async fn start_slow(delay: Duration) -> Self {
        let behavior = Behavior {
            delay,
            ..Behavior::default()
        };
        Self::serve(Arc::new(|_: &str, _: &str| 200), behavior).await
    }

    async fn serve(route: Arc<Route>, behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let in_flight = Arc::new(InFlight::default());
        let behavior = Arc::new(behavior);

        let seen = Arc::clone(&requests);
        let counter = Arc::clone(&in_flight);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let route = Arc::clone(&route);
                let seen = Arc::clone(&seen);
                let counter = Arc::clone(&counter);
                let behavior = Arc::clone(&behavior);
                tokio::spawn(async move {
                    let mut reader = BufReader::new(socket);

                    let mut request_line = String::new();
                    if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                        return;
                    }
                    let mut parts = request_line.split_whitespace();
                    let method = parts.next().unwrap_or_default().to_string();
                    let path = parts.next().unwrap_or_default().to_string();

                    // Read headers up to the blank line, keeping only Cookie
                    let mut cookie = None;
                    loop {
                        let mut header = String::new();
                        match reader.read_line(&mut header).await {
                            Ok(0) | Err(_) => break,
                            Ok(_) if header == "\r\n" || header == "\n" => break,
                            Ok(_) => {
                                if let Some((name, value)) = header.split_once(':') {
                                    if name.trim().eq_ignore_ascii_case("cookie") {
                                        cookie = Some(value.trim().to_string());
                                    }
                                }
                            }
                        }
                    }

                    let current = counter.now.fetch_add(1, Ordering::SeqCst) + 1;
                    counter.peak.fetch_max(current, Ordering::SeqCst);

                    let status = route(&method, &path);
                    seen.lock().unwrap().push(SeenRequest {
                        method: method.clone(),
                        path,
                        cookie,
                    });

                    if !behavior.delay.is_zero() {
                        tokio::time::sleep(behavior.delay).await;
                    }

                    let body = "mock body";
                    let mut response = format!("HTTP/1.1 {} Mock\r\n", status);
                    if let (Some(cookie), "HEAD") = (behavior.set_cookie_on_head, method.as_str()) {
                        response.push_str(&format!("Set-Cookie: {}; Path=/\r\n", cookie));
                    }
                    response.push_str(&format!(
                        "Content-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    ));
                    if method != "HEAD" {
                        response.push_str(body);
                    }

                    let mut socket = reader.into_inner();
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;

                    counter.now.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        Self {
            addr,
            requests,
            in_flight,
        }
    }

    /// Origin where "/status/<code>" answers with <code> and everything else with 200
    pub async fn with_status_paths() -> Self {
        Self::start(|_, path| {
            path.strip_prefix("/status/")
                .and_then(|code| code.parse().ok())
                .unwrap_or(200)
        })
        .await
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Every (method, path) pair received so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.seen()
            .into_iter()
            .map(|request| (request.method, request.path))
            .collect()
    }

    /// Every request received so far, headers included
    pub fn seen(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.seen()
            .iter()
            .filter(|request| request.method == method)
            .count()
    }

    /// The Cookie header sent with the first `method` request for `path`
    pub fn cookie_sent(&self, method: &str, path: &str) -> Option<String> {
        self.seen()
            .into_iter()
            .find(|request| request.method == method && request.path == path)
            .and_then(|request| request.cookie)
    }

    /// Most requests this origin was answering at the same moment
    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak.load(Ordering::SeqCst)
    }
}

/// An origin that accepts connections and never answers
pub async fn start_silent_origin() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address nothing listens on, so connecting to it is refused
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    // Give the OS a moment to release the port
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

/// An in-memory sink that tests can read after handing a clone to a reporter
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn boxed(&self) -> Box<dyn std::io::Write + Send> {
        Box::new(self.clone())
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
