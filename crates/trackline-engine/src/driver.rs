#![forbid(unsafe_code)]

//! Thread-backed driver for hosts with a real change feed.
//!
//! The monitor itself is clock-agnostic; this module supplies the wall
//! clock and the waiting. The host keeps a [`ChangeFeed`] handle and calls
//! [`ChangeFeed::notify`] whenever its geometry may have changed
//! (insertion, removal, resize — the engine does not distinguish causes).
//! A background thread drains the feed, arms the monitor's debounce, and
//! polls it when the deadline passes.
//!
//! The driver adds no semantics of its own: coalescing, debounce, and the
//! one-cycle-at-a-time guarantee all live in [`ChangeMonitor`]. Change
//! notifications emitted by the engine's own writes land in the feed
//! during a cycle and are observed on the next loop iteration, arming the
//! next debounce; the loop guard keeps that feedback finite.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use web_time::Instant;

use crate::host::HostAdapter;
use crate::monitor::ChangeMonitor;

enum FeedMsg {
    Change,
    Stop,
}

/// Cloneable notification handle given to the host.
///
/// Fulfills the subscribe-to-changes contract as a message-passing
/// channel; sending is non-blocking and never fails visibly (a stopped
/// driver simply discards notifications).
#[derive(Clone)]
pub struct ChangeFeed {
    sender: mpsc::Sender<FeedMsg>,
}

impl ChangeFeed {
    /// Notify the driver that host geometry may have changed.
    pub fn notify(&self) {
        let _ = self.sender.send(FeedMsg::Change);
    }
}

/// Handle to a running monitor driver.
///
/// Dropping the handle signals the thread to stop without joining;
/// [`DriverHandle::stop`] signals and joins, returning the monitor and
/// host for inspection.
pub struct DriverHandle<H> {
    sender: mpsc::Sender<FeedMsg>,
    thread: Option<thread::JoinHandle<(ChangeMonitor, H)>>,
}

impl<H> DriverHandle<H> {
    /// Stop the driver and reclaim the monitor and host.
    ///
    /// Returns `None` if the driver thread panicked.
    pub fn stop(mut self) -> Option<(ChangeMonitor, H)> {
        let _ = self.sender.send(FeedMsg::Stop);
        self.thread.take().and_then(|handle| handle.join().ok())
    }
}

impl<H> Drop for DriverHandle<H> {
    fn drop(&mut self) {
        // Signal only; stop() is the joining path.
        let _ = self.sender.send(FeedMsg::Stop);
    }
}

/// Spawn a driver thread owning `monitor` and `host`.
///
/// Returns the feed handle for the host's notification source and the
/// handle controlling the thread.
pub fn spawn<H>(monitor: ChangeMonitor, host: H) -> (ChangeFeed, DriverHandle<H>)
where
    H: HostAdapter + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let feed = ChangeFeed {
        sender: sender.clone(),
    };

    let thread = thread::spawn(move || run_loop(monitor, host, receiver));

    (feed, DriverHandle {
        sender,
        thread: Some(thread),
    })
}

fn run_loop<H: HostAdapter>(
    mut monitor: ChangeMonitor,
    mut host: H,
    receiver: mpsc::Receiver<FeedMsg>,
) -> (ChangeMonitor, H) {
    let epoch = Instant::now();
    let now_ms = |epoch: Instant| epoch.elapsed().as_millis() as u64;

    tracing::debug!("monitor driver started");

    loop {
        // Wait bounded by the armed deadline; block indefinitely when idle.
        let received = match monitor.next_deadline() {
            None => receiver.recv().ok(),
            Some(deadline) => {
                let now = now_ms(epoch);
                let timeout = Duration::from_millis(deadline.saturating_sub(now));
                match receiver.recv_timeout(timeout) {
                    Ok(msg) => Some(msg),
                    Err(mpsc::RecvTimeoutError::Timeout) => None,
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        };

        match received {
            Some(FeedMsg::Change) => monitor.notify_change(now_ms(epoch)),
            Some(FeedMsg::Stop) => break,
            None if monitor.next_deadline().is_some() => {}
            // recv() only returns None on disconnect.
            None => break,
        }

        // Drain the burst before polling so one wake handles it whole.
        let mut stop = false;
        while let Ok(msg) = receiver.try_recv() {
            match msg {
                FeedMsg::Change => monitor.notify_change(now_ms(epoch)),
                FeedMsg::Stop => {
                    stop = true;
                    break;
                }
            }
        }
        if stop {
            break;
        }

        if let Some(report) = monitor.poll(&mut host, now_ms(epoch)) {
            tracing::debug!(
                overlaps = report.overlaps_found,
                fixes = report.fixes_applied,
                moved = report.blocks_moved,
                "repair cycle completed"
            );
        }
    }

    tracing::debug!("monitor driver stopped");
    (monitor, host)
}
