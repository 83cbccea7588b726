//! Background work whose result is picked up later by the UI loop.
//!
//! The closure runs on its own thread and hands its result back over a
//! channel; the owner polls once per frame instead of blocking.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

#[derive(Debug, PartialEq, Eq)]
pub enum PendingPoll<T> {
    Waiting,
    Ready(T),
    /// The worker went away without producing a result.
    Lost,
}

#[derive(Debug)]
pub struct Pending<T> {
    receiver: Receiver<T>,
}

impl<T: Send + 'static> Pending<T> {
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = sender.send(work());
        });
        Self { receiver }
    }

    /// Already resolved; useful for validation failures that never leave the caller.
    pub fn ready(value: T) -> Self {
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(value);
        Self { receiver }
    }
}

impl<T> Pending<T> {
    pub fn poll(&self) -> PendingPoll<T> {
        match self.receiver.try_recv() {
            Ok(value) => PendingPoll::Ready(value),
            Err(TryRecvError::Empty) => PendingPoll::Waiting,
            Err(TryRecvError::Disconnected) => PendingPoll::Lost,
        }
    }

    /// Blocks up to `timeout`; `None` on timeout or a lost worker.
    pub fn wait(&self, timeout: Duration) -> Option<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_work_is_delivered_once() {
        let pending = Pending::spawn(|| 21 * 2);
        assert_eq!(pending.wait(Duration::from_secs(5)), Some(42));
        assert_eq!(pending.poll(), PendingPoll::Lost);
    }

    #[test]
    fn ready_value_polls_immediately() {
        let pending = Pending::ready("done");
        assert_eq!(pending.poll(), PendingPoll::Ready("done"));
    }

    #[test]
    fn slow_work_reports_waiting() {
        let pending = Pending::spawn(|| {
            std::thread::sleep(Duration::from_millis(200));
            1
        });
        assert_eq!(pending.poll(), PendingPoll::Waiting);
        assert_eq!(pending.wait(Duration::from_secs(5)), Some(1));
    }
}
