//! Streaming frame extractor.
//!
//! The stream accumulates incoming bytes and yields complete, validated
//! frames.  This handles partial reads gracefully: a single
//! `Transport::read` call may return part of a header, part of a payload,
//! several frames concatenated, or garbage between frames.
//!
//! ```text
//!            ┌──────────── header found ───────────┐
//!            │                                     ▼
//!      ┌───────────┐  length byte read   ┌──────────────┐
//!  ──▶ │ Searching │ ──────────────────▶ │ LengthKnown  │ ── bytes missing ─▶ wait
//!      └───────────┘                     └──────────────┘
//!            ▲   trailer bad: +1 byte          │ all bytes present
//!            │   checksum bad: +frame len      ▼
//!            └───────────────────────── ┌──────────────┐
//!                                       │   Complete   │ ─▶ emit frame
//!                                       └──────────────┘
//! ```
//!
//! Known weakness: the header has no escaping, so a payload that contains
//! `AA 55` is indistinguishable from a real header.  After a trailer error
//! the scanner resyncs one byte at a time and may lock onto such a pair.

use log::{debug, warn};

use super::codec::{self, DecodeResult};
use super::frame::{FRAME_OVERHEAD, Frame, HEADER, LENGTH_OFFSET, MIN_FRAME_LEN};
use super::stats::Statistics;
use super::transport::Transport;

/// Default cap before the buffer is cleared.
pub const DEFAULT_MAX_BUFFER: usize = 256;

/// Largest accepted `max_buffer_size`.
pub const MAX_BUFFER_LIMIT: usize = 512;

/// Bytes requested from the transport per read call, and the largest piece
/// appended before a scan.
pub const READ_CHUNK: usize = 64;

/// Backing storage: a full cap of unconsumed bytes plus one appended chunk.
pub const STREAM_CAPACITY: usize = MAX_BUFFER_LIMIT + READ_CHUNK;

/// Upper bound on bytes pulled from the transport in one poll.
const READ_BUDGET: usize = STREAM_CAPACITY * 2;

type StreamBuffer = heapless::Vec<u8, STREAM_CAPACITY>;

/// Where the scanner stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Looking for a header.
    Searching,
    /// Header and length byte seen; waiting for `expected` bytes in total.
    LengthKnown { expected: usize },
    /// A full candidate was validated and emitted.
    Complete,
}

/// Owns the receive buffer and turns raw bytes into frames.
pub struct FrameStream {
    buffer: StreamBuffer,
    max_buffer_size: usize,
    state: ScanState,
    stats: Statistics,
}

impl FrameStream {
    pub fn new() -> Self {
        Self::with_max_buffer(DEFAULT_MAX_BUFFER)
    }

    /// Build a stream that clears its buffer once more than
    /// `max_buffer_size` bytes are left unconsumed.  The value is clamped to
    /// `MIN_FRAME_LEN..=MAX_BUFFER_LIMIT`.
    pub fn with_max_buffer(max_buffer_size: usize) -> Self {
        Self {
            buffer: StreamBuffer::new(),
            max_buffer_size: max_buffer_size.clamp(MIN_FRAME_LEN, MAX_BUFFER_LIMIT),
            state: ScanState::Searching,
            stats: Statistics::default(),
        }
    }

    /// Read everything the transport has pending and return the frames
    /// completed by it (possibly none, possibly several).
    ///
    /// Read failures are logged and end the poll; frames already
    /// extracted are still returned.
    pub fn poll<T: Transport>(&mut self, transport: &mut T) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let mut budget = READ_BUDGET;

        while budget > 0 {
            let want = budget.min(READ_CHUNK);
            match transport.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(n) => {
                    let n = n.min(want);
                    budget -= n;
                    self.ingest(&chunk[..n], &mut frames);
                }
                Err(e) => {
                    warn!("stream: transport read failed: {:?}", e);
                    break;
                }
            }
        }

        frames
    }

    /// Push bytes that were obtained some other way.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        for chunk in data.chunks(READ_CHUNK) {
            self.ingest(chunk, &mut frames);
        }
        frames
    }

    /// Drop any partial frame (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = ScanState::Searching;
    }

    pub fn reset_stats(&mut self) {
        self.stats = Statistics::default();
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Unconsumed bytes currently held.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    // ── Internal ──────────────────────────────────────────────

    fn ingest(&mut self, data: &[u8], frames: &mut Vec<Frame>) {
        for chunk in data.chunks(READ_CHUNK) {
            self.ingest_chunk(chunk, frames);
        }
    }

    fn ingest_chunk(&mut self, chunk: &[u8], frames: &mut Vec<Frame>) {
        self.stats.bytes_received = self.stats.bytes_received.saturating_add(chunk.len() as u64);

        // At most `max_buffer_size` bytes are held here, so one chunk fits.
        if self.buffer.extend_from_slice(chunk).is_err() {
            self.clear_overflow();
            return;
        }

        self.scan(frames);

        // Bytes the chunk completed have been consumed; only a backlog that
        // still exceeds the cap is dropped.
        if self.buffer.len() > self.max_buffer_size {
            self.clear_overflow();
        }
    }

    fn clear_overflow(&mut self) {
        debug!(
            "stream: {} unconsumed bytes exceed cap {}, clearing",
            self.buffer.len(),
            self.max_buffer_size
        );
        self.buffer.clear();
        self.state = ScanState::Searching;
        self.stats.buffer_overflows = self.stats.buffer_overflows.saturating_add(1);
    }

    fn scan(&mut self, frames: &mut Vec<Frame>) {
        let mut pos = 0;
        let mut state = ScanState::Searching;

        loop {
            state = match state {
                ScanState::Searching => {
                    let Some(offset) = find_header(&self.buffer[pos..]) else {
                        break;
                    };
                    pos += offset;
                    match self.buffer.get(pos + LENGTH_OFFSET) {
                        Some(&len) => ScanState::LengthKnown {
                            expected: len as usize + FRAME_OVERHEAD,
                        },
                        None => break,
                    }
                }

                ScanState::LengthKnown { expected } => {
                    if self.buffer.len() - pos < expected {
                        break;
                    }
                    match codec::decode(&self.buffer, pos) {
                        DecodeResult::Frame { frame, consumed } => {
                            self.stats.record_frame(frame.kind());
                            frames.push(frame);
                            pos += consumed;
                            ScanState::Complete
                        }
                        DecodeResult::TrailerMismatch => {
                            debug!("stream: trailer mismatch at {}, resync", pos);
                            self.stats.frame_errors = self.stats.frame_errors.saturating_add(1);
                            pos += 1;
                            ScanState::Searching
                        }
                        DecodeResult::ChecksumMismatch { consumed } => {
                            debug!("stream: checksum mismatch, skipping {} bytes", consumed);
                            self.stats.crc_errors = self.stats.crc_errors.saturating_add(1);
                            pos += consumed;
                            ScanState::Searching
                        }
                        DecodeResult::InvalidType { kind, consumed } => {
                            debug!("stream: invalid frame type 0x{:02X}", kind);
                            self.stats.invalid_frames =
                                self.stats.invalid_frames.saturating_add(1);
                            pos += consumed;
                            ScanState::Searching
                        }
                        DecodeResult::NoHeader => {
                            pos += 1;
                            ScanState::Searching
                        }
                        DecodeResult::Incomplete => break,
                    }
                }

                ScanState::Complete => ScanState::Searching,
            };
        }

        self.state = state;
        self.discard_prefix(pos);
    }

    fn discard_prefix(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let len = self.buffer.len();
        if n >= len {
            self.buffer.clear();
            return;
        }
        self.buffer.copy_within(n.., 0);
        self.buffer.truncate(len - n);
    }
}

impl Default for FrameStream {
    fn default() -> Self {
        Self::new()
    }
}

fn find_header(bytes: &[u8]) -> Option<usize> {
    bytes.windows(HEADER.len()).position(|w| w == HEADER)
}
