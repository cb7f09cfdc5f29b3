//! Composition operators. Each builds a new future and leaves its source untouched.

use std::panic::{self, AssertUnwindSafe};

use crate::actor_system::actor::ActorError;

use super::{ActorFuture, Promise};
use super::state::Outcome;

impl<T: Clone + Send + 'static> ActorFuture<T> {
    /// Resolve with `f(value)`; a failure passes through without calling `f`.
    pub fn map<U, F>(&self, f: F) -> ActorFuture<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.try_map(move |value| Ok(f(value)))
    }

    /// Like [`map`](Self::map), but `f` may itself fail the new future.
    pub fn try_map<U, F>(&self, f: F) -> ActorFuture<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Result<U, ActorError> + Send + 'static,
    {
        self.chain(move |outcome, promise| {
            promise.settle(outcome.and_then(f));
        })
    }

    /// Chain an asynchronous step: settle with the outcome of the future `f` returns.
    pub fn flat_map<U, F>(&self, f: F) -> ActorFuture<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> ActorFuture<U> + Send + 'static,
    {
        self.chain(move |outcome, promise| match outcome {
            Ok(value) => f(value).on_settled(move |inner| {
                promise.settle(inner);
            }),
            Err(error) => {
                promise.settle(Err(error));
            }
        })
    }

    /// Always runs `f` with the outcome and resolves with whatever it returns.
    pub fn handle<U, F>(&self, f: F) -> ActorFuture<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(Result<T, ActorError>) -> U + Send + 'static,
    {
        self.chain(move |outcome, promise| {
            promise.settle(Ok(f(outcome)));
        })
    }

    /// Substitute `f(error)` for a failure; a value passes through without calling `f`.
    pub fn recover<F>(&self, f: F) -> ActorFuture<T>
    where
        F: FnOnce(ActorError) -> T + Send + 'static,
    {
        self.chain(move |outcome, promise| {
            promise.settle(outcome.or_else(|error| Ok(f(error))));
        })
    }

    /// Recover asynchronously: on failure, settle with the future `f(error)` returns.
    pub fn recover_with<F>(&self, f: F) -> ActorFuture<T>
    where
        F: FnOnce(ActorError) -> ActorFuture<T> + Send + 'static,
    {
        self.chain(move |outcome, promise| match outcome {
            Ok(value) => {
                promise.settle(Ok(value));
            }
            Err(error) => f(error).on_settled(move |inner| {
                promise.settle(inner);
            }),
        })
    }

    fn chain<U, F>(&self, f: F) -> ActorFuture<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(Outcome<T>, Promise<U>) + Send + 'static,
    {
        let (promise, future) = Promise::pair(self.executor());
        self.on_settled(move |outcome| {
            let fallback = promise.share();
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| f(outcome, promise))) {
                let error = ActorError::from_panic("Future composition", payload);
                log::error!("{}", error);
                fallback.settle(Err(error));
            }
        });
        future
    }
}
