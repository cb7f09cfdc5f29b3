//! Tiny Tokio Actor - lightweight actor framework with ask-pattern futures.
//!
//! Each actor drains its own mailbox on an injected tokio runtime, one message at
//! a time. `tell` is fire-and-forget; `ask` returns an [`ActorFuture`] that
//! resolves with the reply, fails with the handler's error, or fails with
//! [`ActorError::Timeout`].

mod actor;
mod future;
mod system;

pub use actor::{Actor, ActorContext, ActorError, ActorPath, ActorRef, Handler, Message};

pub use future::{ActorFuture, Promise};
pub use system::ActorSystem;

pub use async_trait::async_trait;
