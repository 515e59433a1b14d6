//! Cooperative cancellation tokens threaded into every command invocation.

use std::{
    cell::{Cell, RefCell},
    future::{poll_fn, Future},
    rc::Rc,
    task::{Poll, Waker},
};

use futures::future::{self, Either};
use platform_host::TimerService;
use terminal_contract::{CommandError, CommandResult};

#[derive(Default)]
struct TokenState {
    cancelled: Cell<bool>,
    wakers: RefCell<Vec<Waker>>,
}

/// Advisory stop signal for one execution context.
///
/// Clones share state. Cancelling is idempotent and wakes every task currently awaiting
/// [`CancellationToken::cancelled`].
#[derive(Clone, Default)]
pub struct CancellationToken {
    state: Rc<TokenState>,
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    /// Creates an uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal.
    pub fn cancel(&self) {
        if self.state.cancelled.replace(true) {
            return;
        }
        let wakers = std::mem::take(&mut *self.state.wakers.borrow_mut());
        for waker in wakers {
            waker.wake();
        }
    }

    /// Returns whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Fails with [`CommandError::Aborted`] when the signal has fired.
    pub fn check(&self) -> CommandResult {
        if self.is_cancelled() {
            Err(CommandError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Resolves once the signal fires.
    pub fn cancelled(&self) -> impl Future<Output = ()> + 'static {
        let state = self.state.clone();
        poll_fn(move |cx| {
            if state.cancelled.get() {
                return Poll::Ready(());
            }
            let mut wakers = state.wakers.borrow_mut();
            if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                wakers.push(cx.waker().clone());
            }
            Poll::Pending
        })
    }

    /// Races `operation` against the signal.
    ///
    /// The operation is dropped as soon as the signal fires, and the call settles with
    /// [`CommandError::Aborted`].
    pub async fn guard<F, T>(&self, operation: F) -> CommandResult<T>
    where
        F: Future<Output = T>,
    {
        self.check()?;
        let operation = std::pin::pin!(operation);
        let cancelled = std::pin::pin!(self.cancelled());
        match future::select(operation, cancelled).await {
            Either::Left((value, _)) => Ok(value),
            Either::Right(((), _)) => Err(CommandError::Aborted),
        }
    }

    /// Waits `ms` milliseconds on `timer`, or fails with [`CommandError::Aborted`] if the
    /// signal fires first.
    pub async fn sleep(&self, timer: &dyn TimerService, ms: u64) -> CommandResult {
        self.guard(timer.sleep(ms)).await
    }

    /// Runs `operation` with a deadline.
    ///
    /// Cancellation wins over the deadline and yields [`CommandError::Aborted`]; the deadline
    /// elapsing yields a [`CommandError::Transport`] timeout, not an abort.
    pub async fn with_timeout<F, T>(
        &self,
        timer: &dyn TimerService,
        timeout_ms: u64,
        operation: F,
    ) -> CommandResult<T>
    where
        F: Future<Output = T>,
    {
        let operation = std::pin::pin!(operation);
        let deadline = timer.sleep(timeout_ms);
        match self.guard(future::select(operation, deadline)).await? {
            Either::Left((value, _)) => Ok(value),
            Either::Right(((), _)) => Err(CommandError::transport(format!(
                "timed out after {timeout_ms}ms"
            ))),
        }
    }
}
