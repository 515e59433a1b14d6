//! `setTimeout`-backed timer service.

use platform_host::{TimerFuture, TimerService};

#[derive(Debug, Clone, Copy, Default)]
/// Browser timer: `setTimeout` sleeps and `Date.now()` readings.
///
/// Dropping a pending sleep clears its timeout. Native builds resolve sleeps immediately and
/// read the system clock.
pub struct WebTimer;

#[cfg(target_arch = "wasm32")]
mod imp {
    use std::{
        future::Future,
        pin::Pin,
        task::{Context, Poll},
    };

    use js_sys::{Function, Promise};
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;

    pub struct Timeout {
        handle: Option<i32>,
        promise: JsFuture,
    }

    impl Timeout {
        pub fn new(ms: u64) -> Self {
            let delay = i32::try_from(ms).unwrap_or(i32::MAX);
            let mut handle = None;
            let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
                handle = web_sys::window().and_then(|window| {
                    window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay)
                        .ok()
                });
                if handle.is_none() {
                    let _ = resolve.call0(&JsValue::NULL);
                }
            });
            Self {
                handle,
                promise: JsFuture::from(promise),
            }
        }
    }

    impl Future for Timeout {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            match Pin::new(&mut self.promise).poll(cx) {
                Poll::Ready(_) => {
                    self.handle = None;
                    Poll::Ready(())
                }
                Poll::Pending => Poll::Pending,
            }
        }
    }

    impl Drop for Timeout {
        fn drop(&mut self) {
            if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
                window.clear_timeout_with_handle(handle);
            }
        }
    }

    pub fn now_ms() -> u64 {
        js_sys::Date::now().max(0.0) as u64
    }
}

impl TimerService for WebTimer {
    fn sleep(&self, ms: u64) -> TimerFuture<()> {
        #[cfg(target_arch = "wasm32")]
        {
            Box::pin(imp::Timeout::new(ms))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = ms;
            Box::pin(std::future::ready(()))
        }
    }

    fn now_ms(&self) -> u64 {
        #[cfg(target_arch = "wasm32")]
        {
            imp::now_ms()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            platform_host::unix_time_ms_now()
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_sleep_resolves_immediately() {
        let timer = WebTimer;
        let before = timer.now_ms();
        block_on(timer.sleep(60_000));
        assert!(timer.now_ms() >= before);
    }
}
