//! Futures of actor replies.
//!
//! A [`Promise`] is the single completer of an [`ActorFuture`]. The future
//! settles exactly once, to a value or an [`ActorError`], and any number of
//! clones can observe it: block on it with [`ActorFuture::get`], await it with
//! [`ActorFuture::wait`], or chain continuations onto it (see `compose`).

mod compose;
mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::actor_system::actor::ActorError;

use state::{Outcome, Shared};

/// Completing side of an [`ActorFuture`].
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Create a pending future and its completer. Continuations run on `executor`.
    pub fn pair(executor: &Handle) -> (Promise<T>, ActorFuture<T>) {
        let shared = Arc::new(Shared::new(executor.clone()));
        let future = ActorFuture {
            shared: Arc::clone(&shared),
        };
        (Promise { shared }, future)
    }

    /// Resolve the future with `value`.
    ///
    /// # Panics
    ///
    /// If the future has already settled.
    pub fn complete(&self, value: T) {
        assert!(self.try_complete(value), "future completed after it had settled");
    }

    /// Fail the future with `error`.
    ///
    /// # Panics
    ///
    /// If the future has already settled.
    pub fn fail(&self, error: ActorError) {
        assert!(self.try_fail(error), "future failed after it had settled");
    }

    /// Resolve unless already settled. Returns whether this call settled it.
    pub fn try_complete(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Fail unless already settled. Returns whether this call settled it.
    pub fn try_fail(&self, error: ActorError) -> bool {
        self.settle(Err(error))
    }

    /// Second handle on the same completer, for settling after a caught panic.
    pub(crate) fn share(&self) -> Promise<T> {
        Promise {
            shared: Arc::clone(&self.shared),
        }
    }

    pub(crate) fn settle(&self, outcome: Outcome<T>) -> bool {
        self.shared.settle(outcome)
    }
}

/// An eventually available actor reply: pending, resolved or failed.
pub struct ActorFuture<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for ActorFuture<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> ActorFuture<T> {
    /// A future that is already resolved with `value`.
    pub fn resolved(executor: &Handle, value: T) -> Self {
        let (promise, future) = Promise::pair(executor);
        promise.complete(value);
        future
    }

    /// A future that has already failed with `error`.
    pub fn failed(executor: &Handle, error: ActorError) -> Self {
        let (promise, future) = Promise::pair(executor);
        promise.fail(error);
        future
    }

    /// Block the calling thread until the future settles.
    ///
    /// Fails with [`ActorError::Timeout`] when `timeout` passes first. Must not
    /// be called from a runtime worker thread.
    pub fn get(&self, timeout: Duration) -> Result<T, ActorError> {
        self.shared
            .wait_timeout(timeout)
            .unwrap_or(Err(ActorError::Timeout(timeout)))
    }

    /// Await the outcome without blocking a thread.
    pub async fn wait(&self) -> Result<T, ActorError> {
        let (sender, receiver) = oneshot::channel();
        self.on_settled(move |outcome| {
            let _ = sender.send(outcome);
        });
        receiver
            .await
            .unwrap_or_else(|error| Err(ActorError::SendError(error.to_string())))
    }

    pub fn is_settled(&self) -> bool {
        self.shared.peek().is_some()
    }

    /// The outcome if already settled.
    pub fn peek(&self) -> Option<Result<T, ActorError>> {
        self.shared.peek()
    }

    /// Register `f` to run once with the outcome.
    ///
    /// Runs on the executor, never inline, and after every continuation
    /// registered earlier on this future.
    pub fn on_settled<F>(&self, f: F)
    where
        F: FnOnce(Result<T, ActorError>) + Send + 'static,
    {
        self.shared.subscribe(Box::new(f));
    }

    pub(crate) fn executor(&self) -> &Handle {
        self.shared.executor()
    }
}

impl<T> std::fmt::Debug for ActorFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorFuture").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    const WAIT: Duration = Duration::from_millis(1000);

    fn runtime() -> tokio::runtime::Runtime {
        let _ = env_logger::builder().is_test(true).try_init();
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("runtime")
    }

    #[test]
    fn test_get_returns_value() {
        let rt = runtime();
        let (promise, future) = Promise::<String>::pair(rt.handle());
        assert!(!future.is_settled());

        promise.complete("Pong".to_string());
        assert!(future.is_settled());
        assert_eq!(future.get(WAIT).unwrap(), "Pong");
    }

    #[test]
    fn test_get_waits_for_other_thread() {
        let rt = runtime();
        let (promise, future) = Promise::<u32>::pair(rt.handle());
        let completer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            promise.complete(7);
        });

        assert_eq!(future.get(WAIT).unwrap(), 7);
        completer.join().unwrap();
    }

    #[test]
    fn test_get_times_out_while_pending() {
        let rt = runtime();
        let (_promise, future) = Promise::<u32>::pair(rt.handle());

        let error = future.get(Duration::from_millis(20)).unwrap_err();
        assert!(error.is_timeout());
        assert!(!future.is_settled());
    }

    #[test]
    fn test_second_settlement_is_ignored() {
        let rt = runtime();
        let (promise, future) = Promise::<u32>::pair(rt.handle());

        assert!(promise.try_complete(1));
        assert!(!promise.try_complete(2));
        assert!(!promise.try_fail(ActorError::Unmatched("late".to_string())));
        assert_eq!(future.get(WAIT).unwrap(), 1);
    }

    #[test]
    fn test_failure_is_kept() {
        let rt = runtime();
        let (promise, future) = Promise::<u32>::pair(rt.handle());

        promise.fail(ActorError::Unmatched("unknown".to_string()));
        assert!(!promise.try_complete(3));
        assert!(matches!(future.peek(), Some(Err(ActorError::Unmatched(_)))));
        assert!(matches!(future.get(WAIT), Err(ActorError::Unmatched(msg)) if msg == "unknown"));
    }

    #[test]
    #[should_panic(expected = "settled")]
    fn test_double_complete_panics() {
        let rt = runtime();
        let (promise, _future) = Promise::<u32>::pair(rt.handle());
        promise.complete(1);
        promise.complete(2);
    }

    #[test]
    #[should_panic(expected = "settled")]
    fn test_fail_after_complete_panics() {
        let rt = runtime();
        let (promise, _future) = Promise::<u32>::pair(rt.handle());
        promise.complete(1);
        promise.fail(ActorError::Unmatched("late".to_string()));
    }

    #[test]
    fn test_continuations_fire_in_registration_order() {
        let rt = runtime();
        let (promise, future) = Promise::<u32>::pair(rt.handle());
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let seen = Arc::clone(&seen);
            future.on_settled(move |outcome| seen.lock().unwrap().push((i, outcome.unwrap())));
        }
        promise.complete(42);
        for i in 5..10 {
            let seen = Arc::clone(&seen);
            future.on_settled(move |outcome| seen.lock().unwrap().push((i, outcome.unwrap())));
        }

        let (done, finished) = Promise::<()>::pair(rt.handle());
        future.on_settled(move |_| done.complete(()));
        finished.get(WAIT).unwrap();

        let seen = seen.lock().unwrap();
        let expected: Vec<(i32, u32)> = (0..10).map(|i| (i, 42)).collect();
        assert_eq!(*seen, expected);
    }

    #[test]
    fn test_continuation_never_runs_inline() {
        let rt = runtime();
        let future = ActorFuture::resolved(rt.handle(), 1u32);
        let caller = thread::current().id();
        let (done, ran_on) = Promise::pair(rt.handle());

        future.on_settled(move |_| done.complete(thread::current().id()));
        assert_ne!(ran_on.get(WAIT).unwrap(), caller);
    }

    #[test]
    fn test_panicking_continuation_does_not_block_later_ones() {
        let rt = runtime();
        let future = ActorFuture::resolved(rt.handle(), 1u32);
        future.on_settled(|_| panic!("boom"));

        let (done, finished) = Promise::pair(rt.handle());
        future.on_settled(move |outcome| done.complete(outcome.unwrap()));
        assert_eq!(finished.get(WAIT).unwrap(), 1);
    }

    #[test]
    fn test_wait_inside_runtime() {
        let rt = runtime();
        let (promise, future) = Promise::<String>::pair(rt.handle());

        let waiter = rt.spawn(async move { future.wait().await });
        promise.complete("Pong".to_string());

        let reply = rt.block_on(waiter).unwrap();
        assert_eq!(reply.unwrap(), "Pong");
    }

    #[test]
    fn test_wait_stays_pending_without_completer() {
        let rt = runtime();
        let (promise, future) = Promise::<u32>::pair(rt.handle());
        drop(promise);

        let result = rt.block_on(async { tokio::time::timeout(Duration::from_millis(50), future.wait()).await });
        assert!(result.is_err(), "a future without a completer stays pending");
    }
}
