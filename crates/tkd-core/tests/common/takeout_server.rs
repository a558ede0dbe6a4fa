//! Minimal HTTP/1.1 server imitating the Takeout download endpoint.
//!
//! Serves one body per part, selected by the `i` query parameter. HEAD returns
//! size, type and filename; GET honors `Range: bytes=N-` with 206 (or 416 past
//! the end). Every request is recorded before it is answered. Options inject
//! the failures a real endpoint shows: dropped connections, error statuses,
//! and bodies cut short.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Part {
    pub body: Vec<u8>,
    /// Sent as `Content-Disposition: attachment; filename="..."` when set.
    pub filename: Option<String>,
}

impl Part {
    pub fn named(name: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            filename: Some(name.to_string()),
        }
    }

    pub fn unnamed(body: Vec<u8>) -> Self {
        Self {
            body,
            filename: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Close the connection without answering the first N requests for a part index.
    pub drop_first: HashMap<usize, usize>,
    /// HEAD for a part index always answers this status (no body, no length).
    pub head_status: HashMap<usize, u16>,
    /// Answer `500` to the first N GETs for a part index.
    pub error_first_gets: HashMap<usize, usize>,
    /// First GET for a part index declares the full `Content-Length` but
    /// sends only this many bytes before closing.
    pub truncate_first_get: HashMap<usize, usize>,
    /// GET always answers 200 with the full body.
    pub ignore_range: bool,
    /// Every response is `text/html` (a sign-in page).
    pub html: bool,
    /// HEAD omits `Content-Length`.
    pub hide_length: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub index: Option<usize>,
    pub query: String,
    pub range: Option<String>,
    pub cookie: Option<String>,
}

pub struct TakeoutServer {
    /// Download endpoint, e.g. `http://127.0.0.1:12345/takeout/download`.
    pub url: String,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TakeoutServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_for(&self, index: usize) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.index == Some(index))
            .collect()
    }

    pub fn gets_for(&self, index: usize) -> Vec<RecordedRequest> {
        self.requests_for(index)
            .into_iter()
            .filter(|r| r.method == "GET")
            .collect()
    }
}

struct Shared {
    parts: HashMap<usize, Part>,
    opts: ServerOptions,
    drops_left: Mutex<HashMap<usize, usize>>,
    errors_left: Mutex<HashMap<usize, usize>>,
    truncations_left: Mutex<HashMap<usize, usize>>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub fn start(parts: HashMap<usize, Part>) -> TakeoutServer {
    start_with_options(parts, ServerOptions::default())
}

/// Starts the server in a background thread; it runs until the process exits.
pub fn start_with_options(parts: HashMap<usize, Part>, opts: ServerOptions) -> TakeoutServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let log = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::new(Shared {
        parts,
        drops_left: Mutex::new(opts.drop_first.clone()),
        errors_left: Mutex::new(opts.error_first_gets.clone()),
        truncations_left: Mutex::new(opts.truncate_first_get.clone()),
        opts,
        log: Arc::clone(&log),
    });
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let shared = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &shared));
        }
    });
    TakeoutServer {
        url: format!("http://127.0.0.1:{}/takeout/download", port),
        log,
    }
}

fn handle(mut stream: TcpStream, shared: &Shared) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => parse_request(s),
        Err(_) => return,
    };
    shared.log.lock().unwrap().push(request.clone());

    if let Some(index) = request.index {
        if take_one(&shared.drops_left, index) {
            return; // connection closed with no reply
        }
    }

    let part = match request.index.and_then(|i| shared.parts.get(&i)) {
        Some(p) => p,
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    };

    let opts = &shared.opts;
    let total = part.body.len() as u64;
    let content_type = if opts.html {
        "text/html; charset=utf-8"
    } else {
        "application/zip"
    };
    let disposition = part
        .filename
        .as_ref()
        .map(|f| format!("Content-Disposition: attachment; filename=\"{}\"\r\n", f))
        .unwrap_or_default();

    if request.method.eq_ignore_ascii_case("HEAD") {
        if let Some(status) = request.index.and_then(|i| opts.head_status.get(&i)) {
            let response = format!(
                "HTTP/1.1 {} Injected\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = stream.write_all(response.as_bytes());
            return;
        }
        let length = if opts.hide_length {
            String::new()
        } else {
            format!("Content-Length: {}\r\n", total)
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\n{}{}Connection: close\r\n\r\n",
            content_type, length, disposition
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let index = request.index.unwrap_or_default();
    if take_one(&shared.errors_left, index) {
        let _ = stream.write_all(
            b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 5\r\nConnection: close\r\n\r\noops!",
        );
        return;
    }
    let cut = shared.truncations_left.lock().unwrap().remove(&index);

    let range_start = request
        .range
        .as_deref()
        .filter(|_| !opts.ignore_range)
        .and_then(range_start);
    let (status, extra, slice): (&str, String, &[u8]) = match range_start {
        Some(start) if start >= total => (
            "416 Range Not Satisfiable",
            format!("Content-Range: bytes */{}\r\n", total),
            &[],
        ),
        Some(start) => (
            "206 Partial Content",
            format!(
                "Content-Range: bytes {}-{}/{}\r\n",
                start,
                total.saturating_sub(1),
                total
            ),
            &part.body[start as usize..],
        ),
        None => ("200 OK", String::new(), &part.body[..]),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}{}Connection: close\r\n\r\n",
        status,
        content_type,
        slice.len(),
        extra,
        disposition
    );
    let _ = stream.write_all(response.as_bytes());
    let sent = cut.map(|n| n.min(slice.len())).unwrap_or(slice.len());
    let _ = stream.write_all(&slice[..sent]);
}

/// Decrements the countdown for `index`; true if it was still positive.
fn take_one(counts: &Mutex<HashMap<usize, usize>>, index: usize) -> bool {
    let mut counts = counts.lock().unwrap();
    match counts.get_mut(&index) {
        Some(left) if *left > 0 => {
            *left -= 1;
            true
        }
        _ => false,
    }
}

/// Start offset of `bytes=N-`.
fn range_start(value: &str) -> Option<u64> {
    let value = value.trim();
    let rest = value
        .strip_prefix("bytes=")
        .or_else(|| value.strip_prefix("Bytes="))?;
    let (start, _) = rest.split_once('-')?;
    start.trim().parse().ok()
}

fn parse_request(request: &str) -> RecordedRequest {
    let mut lines = request.lines();
    let first = lines.next().unwrap_or("");
    let mut words = first.split_whitespace();
    let method = words.next().unwrap_or("").to_string();
    let target = words.next().unwrap_or("");
    let query = target.split_once('?').map(|(_, q)| q).unwrap_or("").to_string();
    let index = query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == "i")
        .and_then(|(_, v)| v.parse().ok());

    let mut range = None;
    let mut cookie = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("range") {
                range = Some(value.trim().to_string());
            } else if name.eq_ignore_ascii_case("cookie") {
                cookie = Some(value.trim().to_string());
            }
        }
    }

    RecordedRequest {
        method,
        index,
        query,
        range,
        cookie,
    }
}
