use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{Accuracy, PlatformLocation};
use crate::geo::{distance_m, Coordinates};

/// Longest sleep between stop checks, so dropping a watch takes effect quickly.
const STOP_CHECK_SLICE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub accuracy: Accuracy,
    pub time_interval: Duration,
    /// Minimum movement in meters before a new position is delivered.
    pub distance_interval_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::High,
            time_interval: Duration::from_millis(5000),
            distance_interval_m: 10.0,
        }
    }
}

/// Live subscription to position changes. Dropping it stops the watcher.
pub struct PositionWatch {
    receiver: Receiver<Coordinates>,
    stop: Arc<AtomicBool>,
}

impl PositionWatch {
    pub(crate) fn spawn(platform: Arc<dyn PlatformLocation>, options: WatchOptions) -> Self {
        let (sender, receiver) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut last_sent: Option<Coordinates> = None;
            while !stop_flag.load(Ordering::Relaxed) {
                match platform.current_position(options.accuracy) {
                    Ok(position) => {
                        if should_emit(last_sent, position, options.distance_interval_m) {
                            if sender.send(position).is_err() {
                                break;
                            }
                            last_sent = Some(position);
                        }
                    }
                    Err(error) => debug!(%error, "position watch sample failed"),
                }
                sleep_unless_stopped(&stop_flag, options.time_interval);
            }
        });
        Self { receiver, stop }
    }

    /// Most recent position delivered since the last call, if any.
    pub fn latest(&self) -> Option<Coordinates> {
        self.receiver.try_iter().last()
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<Coordinates> {
        match self.receiver.recv_timeout(timeout) {
            Ok(position) => Some(position),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn unsubscribe(self) {}
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn sleep_unless_stopped(stop: &AtomicBool, total: Duration) {
    let deadline = Instant::now() + total;
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        std::thread::sleep(remaining.min(STOP_CHECK_SLICE));
    }
}

pub(crate) fn should_emit(
    last_sent: Option<Coordinates>,
    next: Coordinates,
    distance_interval_m: f64,
) -> bool {
    match last_sent {
        None => true,
        Some(last) => distance_m(last, next) >= distance_interval_m,
    }
}
