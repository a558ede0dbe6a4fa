//! Streaming GET of one part into its local file.
//!
//! The file is opened lazily on the first body chunk, once the final status
//! is known: `206` appends to the resumed prefix, `200` starts over from
//! byte 0 (the server ignored `Range`). Error bodies are never written.

use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::str;
use std::time::Duration;

use url::Url;

use crate::error::FetchError;
use crate::fetch_head::status_code;
use crate::resume::range_header;
use crate::session::Session;
use crate::storage::{PartWriter, WriteMode};

/// Inputs for one GET.
pub(crate) struct TransferRequest<'a> {
    pub url: &'a Url,
    pub path: &'a Path,
    /// Bytes already on disk; 0 for a fresh fetch.
    pub offset: u64,
    /// Size reported by the probe, if any.
    pub expected: Option<u64>,
    pub chunk_size: usize,
    /// Connect timeout and the longest tolerated stall.
    pub stall_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransferOutcome {
    /// Body written; `len` is the final file length.
    Written { len: u64 },
    /// Server answered `416` to a resume of unknown size: nothing left to fetch.
    AlreadyComplete { len: u64 },
}

/// Response state shared by the header and write callbacks.
#[derive(Default)]
struct ResponseState {
    status: Option<u32>,
    content_length: Option<u64>,
    writer: Option<PartWriter>,
    /// Offset the open writer started at.
    base: u64,
    io_error: Option<io::Error>,
}

impl ResponseState {
    fn header_line(&mut self, line: &str) {
        if let Some(code) = status_code(line) {
            self.status = Some(code);
            self.content_length = None;
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = value.trim().parse().ok();
            }
        }
    }

    fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }

    fn open_writer(&mut self, req: &TransferRequest<'_>) -> io::Result<()> {
        let (mode, base) = if req.offset > 0 && self.status == Some(206) {
            (WriteMode::Append, req.offset)
        } else {
            if req.offset > 0 {
                tracing::warn!(path = %req.path.display(), "server ignored Range, restarting from 0");
            }
            (WriteMode::Truncate, 0)
        };
        self.writer = Some(PartWriter::open(req.path, mode, req.chunk_size)?);
        self.base = base;
        Ok(())
    }

    /// Handles one body chunk; returns false to abort the transfer.
    fn body_chunk(&mut self, req: &TransferRequest<'_>, data: &[u8]) -> bool {
        if !self.is_success() {
            return false;
        }
        if self.writer.is_none() {
            if let Err(e) = self.open_writer(req) {
                self.io_error = Some(e);
                return false;
            }
        }
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.write_chunk(data) {
                self.io_error = Some(e);
                return false;
            }
        }
        true
    }

    /// Body bytes taken from this response.
    fn received(&self) -> u64 {
        self.writer.as_ref().map_or(0, PartWriter::written)
    }

    fn total(&self) -> Option<u64> {
        self.content_length.map(|n| self.base + n)
    }
}

/// Runs the GET, calling `progress(downloaded, total)` after every chunk.
pub(crate) fn download<P>(
    session: &Session,
    req: &TransferRequest<'_>,
    mut progress: P,
) -> Result<TransferOutcome, FetchError>
where
    P: FnMut(u64, Option<u64>),
{
    let mut easy = session.easy(req.url.as_str())?;
    easy.connect_timeout(req.stall_timeout)?;
    easy.low_speed_limit(1)?;
    easy.low_speed_time(req.stall_timeout)?;
    easy.buffer_size(req.chunk_size)?;
    if req.offset > 0 {
        let mut list = curl::easy::List::new();
        list.append(&format!("Range: {}", range_header(req.offset)))?;
        easy.http_headers(list)?;
    }

    let state = RefCell::new(ResponseState::default());
    let performed = {
        let state = &state;
        let mut transfer = easy.transfer();
        transfer.header_function(move |data| {
            if let Ok(line) = str::from_utf8(data) {
                state.borrow_mut().header_line(line);
            }
            true
        })?;
        transfer.write_function(move |data| {
            let mut st = state.borrow_mut();
            if !st.body_chunk(req, data) {
                return Ok(0); // abort transfer
            }
            progress(st.base + st.received(), st.total());
            Ok(data.len())
        })?;
        transfer.perform()
    };

    let mut st = state.into_inner();
    if let Some(e) = st.io_error.take() {
        return Err(FetchError::Storage(e));
    }
    let status = match st.status {
        Some(code) => code,
        None => easy.response_code()?,
    };
    if status == 416 && req.offset > 0 && req.expected.is_none() {
        return Ok(TransferOutcome::AlreadyComplete { len: req.offset });
    }
    if !(200..=299).contains(&status) {
        return Err(FetchError::Http { status });
    }
    performed?;

    if st.writer.is_none() {
        // Empty body: still create (or truncate) the file.
        st.open_writer(req)?;
    }
    let base = st.base;
    let received = st.received();
    if let Some(writer) = st.writer.take() {
        writer.finish()?;
    }
    if let Some(declared) = st.content_length {
        if declared != received {
            return Err(FetchError::ShortTransfer {
                expected: declared,
                received,
            });
        }
    }
    Ok(TransferOutcome::Written {
        len: base + received,
    })
}
