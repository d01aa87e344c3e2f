//! Async session runtime: reactor-driven timers around a [`SensorLink`].
//!
//! Runs the session on the calling thread using `edge-executor` for
//! cooperative multi-task scheduling and `async-io-mini` for reactor
//! timers (no busy-spinning).  Two concurrent futures:
//!
//! 1. **Tick**: advances the link by the measured elapsed time every
//!    1 ms (parse trigger + report trigger)
//! 2. **Dispatch**: truly async via `queue.receive().await`
//!    (wakes as soon as the parse trigger queues a frame)
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────┐
//!  │  Session thread                                          │
//!  │  ┌────────────────────────────────────────────────────┐  │
//!  │  │  futures_lite::block_on                            │  │
//!  │  │  ┌──────────────────────────────────────────────┐  │  │
//!  │  │  │  edge_executor::LocalExecutor                │  │  │
//!  │  │  │                                              │  │  │
//!  │  │  │  ┌──────────────┐      ┌────────────────┐    │  │  │
//!  │  │  │  │ Tick         │─────▶│ Dispatch       │    │  │  │
//!  │  │  │  │ 1ms ⏱        │queue │ wake-on-send   │    │  │  │
//!  │  │  │  └──────────────┘      └────────────────┘    │  │  │
//!  │  │  └──────────────────────────────────────────────┘  │  │
//!  │  └────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The link lives in an `Rc<RefCell<_>>` and is never borrowed across an
//! await point.

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::app::ports::{EventSink, SensorPort};
use crate::app::state::InstrumentState;
use crate::link::{LinkStats, SensorLink};
use crate::protocol::channels::FrameQueue;
use crate::protocol::transport::Transport;

/// Reactor timer period of the tick task.
const TICK: Duration = Duration::from_millis(1);

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The stop flag was raised.
    Stopped,
    /// The transport lost its peer.
    Disconnected,
}

/// Outcome of [`run`], printable as JSON.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunSummary {
    pub reason: EndReason,
    pub elapsed_ms: u64,
    pub stats: LinkStats,
    pub final_state: InstrumentState,
}

type SharedLink<T, S, K> = Rc<RefCell<SensorLink<T, S, K>>>;

/// Tick task: measures elapsed time and advances the timers.
async fn tick_loop<T, S, K>(link: SharedLink<T, S, K>, stop: Arc<AtomicBool>) -> EndReason
where
    T: Transport,
    S: SensorPort,
    K: EventSink,
{
    let mut last = Instant::now();
    loop {
        if stop.load(Ordering::Acquire) {
            return EndReason::Stopped;
        }
        {
            let mut link = link.borrow_mut();
            if !link.is_connected() {
                return EndReason::Disconnected;
            }
            let whole_ms = last.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
            if whole_ms > 0 {
                // Carry the sub-millisecond remainder into the next tick.
                last += Duration::from_millis(u64::from(whole_ms));
                link.advance(whole_ms);
            }
        }
        async_io_mini::Timer::after(TICK).await;
    }
}

/// Dispatch task: wakes when the tick task queues a frame.
async fn dispatch_loop<T, S, K>(link: SharedLink<T, S, K>, queue: Arc<FrameQueue>)
where
    T: Transport,
    S: SensorPort,
    K: EventSink,
{
    loop {
        let frame = queue.receive().await;
        link.borrow_mut().dispatch(&frame);
    }
}

/// Run `link` until `stop` is raised or the transport disconnects.
///
/// Blocks the calling thread.  The sensor is switched off and partial
/// input discarded before returning.
pub fn run<T, S, K>(link: SensorLink<T, S, K>, stop: Arc<AtomicBool>) -> RunSummary
where
    T: Transport + 'static,
    S: SensorPort + 'static,
    K: EventSink + 'static,
{
    let started = Instant::now();
    let queue = link.queue_handle();
    let link: SharedLink<T, S, K> = Rc::new(RefCell::new(link));

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor
        .spawn(dispatch_loop(Rc::clone(&link), queue))
        .detach();

    info!("runtime: session started");
    let reason = futures_lite::future::block_on(executor.run(tick_loop(Rc::clone(&link), stop)));

    let mut link = link.borrow_mut();
    // Frames decoded in the last tick still get their replies.
    link.dispatch_pending();
    link.close();

    let summary = RunSummary {
        reason,
        elapsed_ms: started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64,
        stats: link.stats(),
        final_state: link.state(),
    };
    info!(
        "runtime: session ended ({:?}) after {} ms",
        summary.reason, summary.elapsed_ms
    );
    summary
}
