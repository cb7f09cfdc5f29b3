//! Settlement state shared between a promise and its futures.
//!
//! Continuations never run on the thread that settles or subscribes. They are
//! queued and drained by a single task on the executor, so they fire in the
//! order they were registered.

use std::collections::VecDeque;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::actor_system::actor::ActorError;

pub(crate) type Outcome<T> = Result<T, ActorError>;
pub(crate) type Continuation<T> = Box<dyn FnOnce(Outcome<T>) + Send + 'static>;

enum Settlement<T> {
    Pending,
    Resolved(T),
    Failed(ActorError),
}

struct Inner<T> {
    settlement: Settlement<T>,
    /// Registered before settlement.
    waiting: Vec<Continuation<T>>,
    /// Due to run, in registration order.
    ready: VecDeque<Continuation<T>>,
    draining: bool,
}

impl<T: Clone> Inner<T> {
    fn outcome(&self) -> Option<Outcome<T>> {
        match &self.settlement {
            Settlement::Pending => None,
            Settlement::Resolved(value) => Some(Ok(value.clone())),
            Settlement::Failed(error) => Some(Err(error.clone())),
        }
    }

    fn is_pending(&self) -> bool {
        matches!(self.settlement, Settlement::Pending)
    }

    /// Whether the caller must start a drain task.
    fn claim_drain(&mut self) -> bool {
        if self.draining || self.ready.is_empty() {
            false
        } else {
            self.draining = true;
            true
        }
    }
}

pub(crate) struct Shared<T> {
    inner: Mutex<Inner<T>>,
    settled: Condvar,
    executor: Handle,
}

impl<T: Clone + Send + 'static> Shared<T> {
    pub fn new(executor: Handle) -> Self {
        Shared {
            inner: Mutex::new(Inner {
                settlement: Settlement::Pending,
                waiting: Vec::new(),
                ready: VecDeque::new(),
                draining: false,
            }),
            settled: Condvar::new(),
            executor,
        }
    }

    pub fn executor(&self) -> &Handle {
        &self.executor
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pending to resolved or failed, once. Later attempts return `false`.
    pub fn settle(self: &Arc<Self>, outcome: Outcome<T>) -> bool {
        let mut inner = self.lock();
        if !inner.is_pending() {
            return false;
        }
        inner.settlement = match outcome {
            Ok(value) => Settlement::Resolved(value),
            Err(error) => Settlement::Failed(error),
        };
        let waiting = mem::take(&mut inner.waiting);
        inner.ready.extend(waiting);
        let drain = inner.claim_drain();
        drop(inner);

        self.settled.notify_all();
        if drain {
            self.spawn_drain();
        }
        true
    }

    pub fn subscribe(self: &Arc<Self>, continuation: Continuation<T>) {
        let mut inner = self.lock();
        if inner.is_pending() {
            inner.waiting.push(continuation);
            return;
        }
        inner.ready.push_back(continuation);
        let drain = inner.claim_drain();
        drop(inner);

        if drain {
            self.spawn_drain();
        }
    }

    pub fn peek(&self) -> Option<Outcome<T>> {
        self.lock().outcome()
    }

    /// Block the calling thread until settled or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome<T>> {
        let inner = self.lock();
        let (inner, _) = self
            .settled
            .wait_timeout_while(inner, timeout, |inner| inner.is_pending())
            .unwrap_or_else(PoisonError::into_inner);
        inner.outcome()
    }

    fn spawn_drain(self: &Arc<Self>) {
        let shared = Arc::clone(self);
        self.executor.spawn(async move {
            shared.drain();
        });
    }

    fn drain(&self) {
        loop {
            let (continuation, outcome) = {
                let mut inner = self.lock();
                match (inner.ready.pop_front(), inner.outcome()) {
                    (Some(continuation), Some(outcome)) => (continuation, outcome),
                    _ => {
                        inner.draining = false;
                        return;
                    }
                }
            };
            if panic::catch_unwind(AssertUnwindSafe(|| continuation(outcome))).is_err() {
                log::error!("Future continuation panicked");
            }
        }
    }
}
