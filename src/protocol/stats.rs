//! Receive-path counters.

use serde::Serialize;

use super::frame::FrameType;

/// Monotonic counters kept by [`FrameStream`](super::stream::FrameStream).
///
/// Protocol faults never surface as errors; callers that need visibility
/// read these.  Cleared only by an explicit reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub bytes_received: u64,
    pub frames_parsed: u32,
    /// Checksum mismatches.
    pub crc_errors: u32,
    /// Trailer mismatches.
    pub frame_errors: u32,
    /// Frames with a valid checksum but an unknown type byte.
    pub invalid_frames: u32,
    pub command_frames: u32,
    pub data_frames: u32,
    /// Full buffer clears caused by the size cap.
    pub buffer_overflows: u32,
}

impl Statistics {
    pub(crate) fn record_frame(&mut self, kind: FrameType) {
        self.frames_parsed = self.frames_parsed.saturating_add(1);
        let per_type = match kind {
            FrameType::Command => &mut self.command_frames,
            FrameType::Data => &mut self.data_frames,
        };
        *per_type = per_type.saturating_add(1);
    }

    /// Sum of every receive-side fault counter.
    pub fn total_errors(&self) -> u32 {
        self.crc_errors
            .saturating_add(self.frame_errors)
            .saturating_add(self.invalid_frames)
            .saturating_add(self.buffer_overflows)
    }
}
