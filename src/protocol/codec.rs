//! Frame encoder and single-frame decoder.
//!
//! [`decode`] looks at exactly one candidate frame starting at a given
//! offset and tells the caller how far to advance.  Buffering and scanning
//! for the header live in [`FrameStream`](super::stream::FrameStream).

use heapless::Vec;

use super::frame::{
    FRAME_OVERHEAD, Frame, FrameType, HEADER, LENGTH_OFFSET, MAX_FRAME_LEN, MAX_PAYLOAD,
    MIN_FRAME_LEN, PAYLOAD_OFFSET, TRAILER, TYPE_OFFSET, checksum,
};
use crate::error::FrameError;

/// Outcome of a single [`decode`] attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A valid frame; `consumed` is its full wire length.
    Frame { frame: Frame, consumed: usize },
    /// Not enough bytes yet.  Consumes nothing; wait for more data.
    Incomplete,
    /// `start` does not point at a header.
    NoHeader,
    /// Trailer bytes are wrong.  Resync one byte past the header start.
    TrailerMismatch,
    /// Checksum is wrong.  The length field is trusted and the whole
    /// candidate is skipped.
    ChecksumMismatch { consumed: usize },
    /// Checksum is valid but the type byte is unknown.
    InvalidType { kind: u8, consumed: usize },
}

impl DecodeResult {
    /// How many bytes the caller should advance past `start`.
    pub fn consumed(&self) -> usize {
        match self {
            Self::Frame { consumed, .. }
            | Self::ChecksumMismatch { consumed }
            | Self::InvalidType { consumed, .. } => *consumed,
            Self::NoHeader | Self::TrailerMismatch => 1,
            Self::Incomplete => 0,
        }
    }
}

/// Encode a frame into a new fixed-capacity buffer.
///
/// Returns [`FrameError::PayloadTooLarge`] for payloads over 255 bytes.
pub fn encode(kind: FrameType, payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
    let mut buf = [0u8; MAX_FRAME_LEN];
    let len = encode_into(kind, payload, &mut buf)?;
    Vec::from_slice(&buf[..len]).map_err(|()| FrameError::BufferTooSmall { needed: len })
}

/// Encode a frame into `out`.  Returns the number of bytes written.
pub fn encode_into(kind: FrameType, payload: &[u8], out: &mut [u8]) -> Result<usize, FrameError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge { len: payload.len() });
    }
    let total = payload.len() + FRAME_OVERHEAD;
    if out.len() < total {
        return Err(FrameError::BufferTooSmall { needed: total });
    }

    let body_end = PAYLOAD_OFFSET + payload.len();
    out[..2].copy_from_slice(&HEADER);
    out[TYPE_OFFSET] = kind.as_byte();
    out[LENGTH_OFFSET] = payload.len() as u8;
    out[PAYLOAD_OFFSET..body_end].copy_from_slice(payload);
    out[body_end] = checksum(&out[..body_end]);
    out[body_end + 1..total].copy_from_slice(&TRAILER);

    Ok(total)
}

/// Try to decode one frame beginning at `buffer[start]`.
pub fn decode(buffer: &[u8], start: usize) -> DecodeResult {
    let candidate = buffer.get(start..).unwrap_or(&[]);

    if candidate.len() < HEADER.len() {
        return DecodeResult::Incomplete;
    }
    if candidate[..2] != HEADER {
        return DecodeResult::NoHeader;
    }
    if candidate.len() < MIN_FRAME_LEN {
        return DecodeResult::Incomplete;
    }

    let len = candidate[LENGTH_OFFSET] as usize;
    let total = len + FRAME_OVERHEAD;
    if candidate.len() < total {
        return DecodeResult::Incomplete;
    }

    let body_end = PAYLOAD_OFFSET + len;
    if candidate[body_end + 1..total] != TRAILER {
        return DecodeResult::TrailerMismatch;
    }
    if candidate[body_end] != checksum(&candidate[..body_end]) {
        return DecodeResult::ChecksumMismatch { consumed: total };
    }

    let raw_kind = candidate[TYPE_OFFSET];
    let Ok(kind) = FrameType::try_from(raw_kind) else {
        return DecodeResult::InvalidType {
            kind: raw_kind,
            consumed: total,
        };
    };

    match Frame::new(kind, &candidate[PAYLOAD_OFFSET..body_end]) {
        Ok(frame) => DecodeResult::Frame {
            frame,
            consumed: total,
        },
        // Unreachable: the length byte caps the payload at 255.
        Err(_) => DecodeResult::InvalidType {
            kind: raw_kind,
            consumed: total,
        },
    }
}
