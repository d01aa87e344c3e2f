//! Fuzz target: `FrameStream::feed`
//!
//! Drives arbitrary byte sequences into the stream scanner, split at a
//! fuzzer-chosen point, and asserts that it never panics, never holds more
//! than its cap, and only ever emits frames that re-encode to valid bytes.
//!
//! cargo fuzz run fuzz_frame_stream

#![no_main]

use ecglink::protocol::codec::{DecodeResult, decode};
use ecglink::protocol::stream::FrameStream;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&cap, rest)) = data.split_first() else {
        return;
    };
    let split = rest.first().map_or(0, |&b| b as usize % (rest.len() + 1));

    let mut stream = FrameStream::with_max_buffer(usize::from(cap) * 2);
    let mut frames = stream.feed(&rest[..split]);
    frames.extend(stream.feed(&rest[split..]));

    assert!(stream.buffered() <= stream.max_buffer_size());
    assert_eq!(stream.stats().frames_parsed as usize, frames.len());

    for frame in &frames {
        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), frame.wire_len());
        assert!(matches!(decode(&bytes, 0), DecodeResult::Frame { .. }));
    }

    // After a reset the stream must accept bytes cleanly again.
    stream.reset();
    let _ = stream.feed(rest);
});
