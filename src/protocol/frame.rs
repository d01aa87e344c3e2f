//! Frame type and wire constants.
//!
//! ```text
//! ┌────────┬──────┬────────┬───────────────┬──────────┬─────────┐
//! │ AA 55  │ type │ length │ payload (N B) │ checksum │ 0D 0A   │
//! │ 2 B    │ 1 B  │ 1 B    │ 0..=255       │ 1 B      │ 2 B     │
//! └────────┴──────┴────────┴───────────────┴──────────┴─────────┘
//! ```
//!
//! Header, length, checksum and trailer are derived when the frame is
//! encoded; a [`Frame`] only carries its type and payload.

use heapless::Vec;

use crate::error::FrameError;

/// Start-of-frame signature.
pub const HEADER: [u8; 2] = [0xAA, 0x55];

/// End-of-frame signature.
pub const TRAILER: [u8; 2] = [0x0D, 0x0A];

/// Header + type + length + checksum + trailer.
pub const FRAME_OVERHEAD: usize = 7;

/// Smallest possible frame (empty payload).
pub const MIN_FRAME_LEN: usize = FRAME_OVERHEAD;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = 255;

/// Largest possible frame on the wire.
pub const MAX_FRAME_LEN: usize = MAX_PAYLOAD + FRAME_OVERHEAD;

/// Offset of the type byte.
pub(crate) const TYPE_OFFSET: usize = 2;

/// Offset of the length byte.
pub(crate) const LENGTH_OFFSET: usize = 3;

/// Offset of the first payload byte.
pub(crate) const PAYLOAD_OFFSET: usize = 4;

/// Frame type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    /// Request from the host.
    Command = 0x01,
    /// Reply or autonomous push from the device.
    Data = 0x02,
}

impl FrameType {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FrameType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            0x01 => Ok(Self::Command),
            0x02 => Ok(Self::Data),
            other => Err(other),
        }
    }
}

/// One decoded or to-be-encoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: FrameType,
    payload: Vec<u8, MAX_PAYLOAD>,
}

impl Frame {
    /// Build a frame, rejecting payloads longer than 255 bytes.
    pub fn new(kind: FrameType, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload)
            .map_err(|()| FrameError::PayloadTooLarge { len: payload.len() })?;
        Ok(Self { kind, payload })
    }

    /// Shorthand for a command-type frame.
    pub fn command(payload: &[u8]) -> Result<Self, FrameError> {
        Self::new(FrameType::Command, payload)
    }

    /// Shorthand for a data-type frame.
    pub fn data(payload: &[u8]) -> Result<Self, FrameError> {
        Self::new(FrameType::Data, payload)
    }

    pub fn kind(&self) -> FrameType {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of bytes this frame occupies on the wire.
    pub fn wire_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Encode into a fixed-capacity buffer.
    pub fn to_bytes(&self) -> Vec<u8, MAX_FRAME_LEN> {
        let mut out = [0u8; MAX_FRAME_LEN];
        // Payload length is bounded by construction, so this cannot fail.
        let len = super::codec::encode_into(self.kind, &self.payload, &mut out).unwrap_or(0);
        Vec::from_slice(&out[..len]).unwrap_or_default()
    }
}

/// Additive checksum: unsigned byte-wise sum modulo 256.
///
/// This is a weak check. It does not detect reordered bytes (a swap leaves
/// the sum unchanged), and two errors that offset each other cancel out.
/// It only catches single corrupted bytes reliably.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}
