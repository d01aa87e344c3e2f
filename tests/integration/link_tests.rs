//! End-to-end tests for `SensorLink`: bytes in, state changes and frames out.

use ecglink::app::events::AppEvent;
use ecglink::app::state::OperatingMode;
use ecglink::config::{CommandProfile, LinkConfig, RateProfile};
use ecglink::link::SensorLink;
use ecglink::protocol::codec::encode;
use ecglink::protocol::frame::{Frame, FrameType};

use crate::mock_link::{MockSensor, MockTransport, RecordingSink, SensorCall};

type TestLink = SensorLink<MockTransport, MockSensor, RecordingSink>;

fn link_with(config: &LinkConfig) -> TestLink {
    SensorLink::new(
        config,
        MockTransport::new(),
        MockSensor::new(),
        RecordingSink::new(),
    )
    .unwrap()
}

fn default_link() -> TestLink {
    link_with(&LinkConfig::default())
}

/// Advance the session one millisecond at a time.
fn run_ms(link: &mut TestLink, ms: u32) {
    for _ in 0..ms {
        link.tick(1);
    }
}

fn payloads(frames: &[Frame]) -> Vec<Vec<u8>> {
    frames.iter().map(|f| f.payload().to_vec()).collect()
}

// ── Request / response ────────────────────────────────────────

#[test]
fn raw_value_query_returns_sampled_value() {
    let mut link = default_link();
    run_ms(&mut link, 1000); // first report tick samples the sensor

    link.transport_mut().push_command(&[0x01]);
    run_ms(&mut link, 10);

    let frames = link.transport_mut().take_frames();
    assert_eq!(payloads(&frames), vec![vec![0x01, 0x0A, 0xBC]]);
    assert_eq!(frames[0].kind(), FrameType::Data);
}

#[test]
fn heart_rate_reply_bytes_on_the_wire() {
    let mut link = default_link();
    run_ms(&mut link, 1000);

    link.transport_mut().push_command(&[0x08]);
    run_ms(&mut link, 10);

    assert_eq!(
        link.transport().outbound,
        vec![0xAA, 0x55, 0x02, 0x02, 0x08, 0x4B, 0x56, 0x0D, 0x0A]
    );
}

#[test]
fn frame_split_across_parse_ticks_is_reassembled() {
    let mut link = default_link();
    let bytes = encode(FrameType::Command, &[0x07]).unwrap();

    link.transport_mut().push_bytes(&bytes[..4]);
    run_ms(&mut link, 10);
    assert!(link.transport().outbound.is_empty());

    link.transport_mut().push_bytes(&bytes[4..]);
    run_ms(&mut link, 10);
    assert_eq!(payloads(&link.transport_mut().take_frames()), vec![vec![0x07, 0x00]]);
}

#[test]
fn corrupted_frame_is_dropped_and_next_is_answered() {
    let mut link = default_link();
    let mut bad = encode(FrameType::Command, &[0x06, 1]).unwrap().to_vec();
    bad[6] = bad[6].wrapping_add(1);
    link.transport_mut().push_bytes(&bad);
    link.transport_mut().push_command(&[0x07]);

    run_ms(&mut link, 10);

    assert_eq!(link.stats().receive.crc_errors, 1);
    assert_eq!(payloads(&link.transport_mut().take_frames()), vec![vec![0x07, 0x00]]);
    assert!(link.sensor().calls.is_empty());
}

#[test]
fn data_frames_and_unknown_codes_get_no_reply() {
    let mut link = default_link();
    let data = encode(FrameType::Data, &[0x06, 1]).unwrap();
    link.transport_mut().push_bytes(&data);
    link.transport_mut().push_command(&[0x42]);
    link.transport_mut().push_command(&[]);

    run_ms(&mut link, 10);

    assert!(link.transport().outbound.is_empty());
    assert!(link.sensor().calls.is_empty());
    let stats = link.stats().receive;
    assert_eq!(stats.data_frames, 1);
    assert_eq!(stats.command_frames, 2);
}

// ── Run / stop and autonomous push ────────────────────────────

#[test]
fn run_stop_and_autonomous_push() {
    let mut link = default_link();
    link.transport_mut().push_command(&[0x06, 1]);
    link.transport_mut().push_command(&[0x05, 1]);
    run_ms(&mut link, 10);

    assert_eq!(
        payloads(&link.transport_mut().take_frames()),
        vec![vec![0x06, 1], vec![0x05, 1]]
    );
    assert_eq!(link.sensor().calls, vec![SensorCall::On]);

    // The report tick at t = 1000 ms pushes one frame per monitored field.
    run_ms(&mut link, 990);
    let pushed = link.transport_mut().take_frames();
    let codes: Vec<u8> = pushed.iter().map(|f| f.payload()[0]).collect();
    assert_eq!(codes, vec![0x01, 0x02, 0x03, 0x07, 0x08]);
    assert_eq!(pushed[3].payload(), &[0x07, 0x01]);
    assert_eq!(pushed[4].payload(), &[0x08, 75]);

    link.transport_mut().push_command(&[0x06, 0]);
    run_ms(&mut link, 10);
    assert_eq!(link.sensor().calls, vec![SensorCall::On, SensorCall::Off]);
    assert_eq!(link.state().mode, OperatingMode::Stopped);

    let events = &link.sink().events;
    assert!(events.contains(&AppEvent::ReportingChanged(true)));
    assert!(events.contains(&AppEvent::ModeChanged {
        from: OperatingMode::Running,
        to: OperatingMode::Stopped,
    }));
}

#[test]
fn fast_profile_pushes_at_full_rate() {
    let config = LinkConfig {
        rate_profile: RateProfile::Fast,
        report_rate_hz: 125,
        autonomous_reporting: true,
        ..LinkConfig::default()
    };
    let mut link = link_with(&config);

    run_ms(&mut link, 1000);

    assert_eq!(link.sensor().samples_taken, 125);
    assert_eq!(link.stats().frames_pushed, 125 * 5);
    assert_eq!(link.transport_mut().take_frames().len(), 125 * 5);
}

#[test]
fn push_failures_are_counted_not_fatal() {
    let config = LinkConfig {
        autonomous_reporting: true,
        ..LinkConfig::default()
    };
    let mut link = link_with(&config);
    link.transport_mut().fail_writes = true;
    link.transport_mut().push_command(&[0x07]);

    run_ms(&mut link, 1000);

    let stats = link.stats();
    assert_eq!(stats.write_failures, 1);
    assert_eq!(stats.replies_sent, 0);
    assert_eq!(stats.pushes_dropped, 5);
}

// ── Report rate ───────────────────────────────────────────────

#[test]
fn rate_change_reinitialises_only_the_report_timer() {
    let mut link = default_link();
    run_ms(&mut link, 7);

    assert!(link.dispatch(&Frame::command(&[0x04, 5]).unwrap()));

    let scheduler = link.scheduler();
    assert_eq!(scheduler.parse_timer().elapsed_ms(), 7);
    assert_eq!(scheduler.report_timer().elapsed_ms(), 0);
    assert_eq!(scheduler.report_timer().period_ms(), 200);

    run_ms(&mut link, 1000);
    assert_eq!(link.sensor().samples_taken, 5);
}

#[test]
fn invalid_rate_is_ignored() {
    let mut link = default_link();
    link.transport_mut().push_command(&[0x04, 3]);
    run_ms(&mut link, 1000);

    assert!(link.transport().outbound.is_empty());
    assert_eq!(link.scheduler().report_rate().hz(), 1);
    assert_eq!(link.state().report_rate.hz(), 1);
    assert_eq!(link.sensor().samples_taken, 1);
    assert_eq!(link.sink().events, vec![AppEvent::RateRejected(3)]);
}

// ── Profiles ──────────────────────────────────────────────────

#[test]
fn monitor_profile_never_switches_the_sensor() {
    let config = LinkConfig {
        command_profile: CommandProfile::Monitor,
        ..LinkConfig::default()
    };
    let mut link = link_with(&config);
    for payload in [&[0x06, 1][..], &[0x06][..], &[0x05, 1][..], &[0x04, 5][..]] {
        link.transport_mut().push_command(payload);
    }

    run_ms(&mut link, 1000);

    assert_eq!(
        payloads(&link.transport_mut().take_frames()),
        vec![vec![0x06, 0], vec![0x06, 0], vec![0x05, 0], vec![0x04, 1]]
    );
    assert!(link.sensor().calls.is_empty());
    assert!(!link.state().autonomous);
    assert!(link.sink().events.is_empty());
}

// ── Session lifecycle ─────────────────────────────────────────

#[test]
fn lead_off_is_sampled_and_queryable() {
    let mut link = default_link();
    link.sensor_mut().lead_off = true;
    run_ms(&mut link, 1000);

    link.transport_mut().push_command(&[0x03]);
    run_ms(&mut link, 10);

    assert_eq!(payloads(&link.transport_mut().take_frames()), vec![vec![0x03, 0x01]]);
    assert_eq!(link.sink().events, vec![AppEvent::LeadChanged(true)]);
}

#[test]
fn disconnected_transport_skips_parsing() {
    let mut link = default_link();
    link.transport_mut().connected = false;
    link.transport_mut().push_command(&[0x07]);

    run_ms(&mut link, 100);

    assert!(!link.is_connected());
    assert!(!link.scheduler().parse_enabled());
    assert_eq!(link.stats().receive.bytes_received, 0);
    assert!(link.transport().outbound.is_empty());
}

#[test]
fn close_switches_running_sensor_off() {
    let mut link = default_link();
    link.transport_mut().push_command(&[0x06]);
    run_ms(&mut link, 10);
    assert!(link.state().mode.is_running());

    link.close();
    assert_eq!(link.sensor().calls, vec![SensorCall::On, SensorCall::Off]);
    assert_eq!(link.state().mode, OperatingMode::Stopped);
}
