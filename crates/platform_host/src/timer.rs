//! Timer host-service contracts and a manually driven clock for tests.

use std::{
    cell::RefCell,
    future::{poll_fn, Future},
    pin::Pin,
    rc::Rc,
    task::{Poll, Waker},
};

/// Object-safe boxed future used by [`TimerService`].
///
/// Timer futures own their state so callers can race them against a cancellation signal.
pub type TimerFuture<T> = Pin<Box<dyn Future<Output = T>>>;

/// Host service for delays and the current clock reading.
pub trait TimerService {
    /// Resolves after `ms` milliseconds of host time.
    fn sleep(&self, ms: u64) -> TimerFuture<()>;

    /// Returns the current host clock in milliseconds.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
/// Timer that resolves every sleep immediately and reads the wall clock.
pub struct NoopTimer;

impl TimerService for NoopTimer {
    fn sleep(&self, _ms: u64) -> TimerFuture<()> {
        Box::pin(async {})
    }

    fn now_ms(&self) -> u64 {
        crate::time::unix_time_ms_now()
    }
}

#[derive(Debug, Default)]
struct ManualClock {
    now: u64,
    waiters: Vec<(u64, Waker)>,
}

#[derive(Debug, Clone, Default)]
/// Deterministic timer whose clock only moves through [`ManualTimer::advance`].
pub struct ManualTimer {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualTimer {
    /// Moves the clock forward and wakes every sleep whose deadline has passed.
    pub fn advance(&self, ms: u64) {
        let due = {
            let mut clock = self.clock.borrow_mut();
            clock.now = clock.now.saturating_add(ms);
            let now = clock.now;
            let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut clock.waiters)
                .into_iter()
                .partition(|(deadline, _)| *deadline <= now);
            clock.waiters = pending;
            due
        };
        for (_, waker) in due {
            waker.wake();
        }
    }

    /// Returns the number of sleeps still waiting on the clock.
    pub fn pending_sleeps(&self) -> usize {
        self.clock.borrow().waiters.len()
    }
}

impl TimerService for ManualTimer {
    fn sleep(&self, ms: u64) -> TimerFuture<()> {
        let clock = self.clock.clone();
        let deadline = clock.borrow().now.saturating_add(ms);
        Box::pin(poll_fn(move |cx| {
            let mut clock = clock.borrow_mut();
            if clock.now >= deadline {
                return Poll::Ready(());
            }
            clock.waiters.retain(|(_, waker)| !waker.will_wake(cx.waker()));
            clock.waiters.push((deadline, cx.waker().clone()));
            Poll::Pending
        }))
    }

    fn now_ms(&self) -> u64 {
        self.clock.borrow().now
    }
}
