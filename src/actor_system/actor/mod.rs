//! Actor module - core actor types and traits.

pub(crate) mod handler;
pub(crate) mod runner;

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

mod path;
pub use path::ActorPath;

use crate::actor_system::future::{ActorFuture, Promise};
use crate::actor_system::system::ActorSystem;

/// The actor context gives a running actor access to its path and the system.
#[derive(Debug)]
pub struct ActorContext {
    pub path: ActorPath,
    pub system: ActorSystem,
}

/// Defines what an actor will receive as its message, and with what it should reply.
pub trait Message: Clone + Send + Sync + 'static {
    /// Reply an actor gives when it handles this message successfully.
    type Reply: Clone + Send + Sync + 'static;
}

/// Basic trait for actors.
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// Override this function to perform initialization of the actor.
    async fn pre_start(&mut self, _ctx: &mut ActorContext) -> Result<(), ActorError> {
        Ok(())
    }

    /// Override this function to perform work when the actor is stopped.
    async fn post_stop(&mut self, _ctx: &mut ActorContext) {}
}

/// Defines what the actor does with a message.
///
/// Returning an error fails the asking caller's future. The actor itself keeps
/// running and handles the next message in its mailbox.
///
/// A panicking handler fails the asking caller's future with
/// [`ActorError::RuntimeError`] and stops the actor: it is removed from its
/// system and later messages are refused.
#[async_trait]
pub trait Handler<M: Message>: Actor {
    async fn handle(&mut self, msg: M, ctx: &mut ActorContext) -> Result<M::Reply, ActorError>;
}

/// A clonable actor reference.
pub struct ActorRef<A: Actor> {
    path: ActorPath,
    sender: handler::MailboxSender<A>,
    executor: Handle,
}

impl<A: Actor> Clone for ActorRef<A> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            sender: self.sender.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<A: Actor> ActorRef<A> {
    /// Get the path of this actor.
    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    /// Fire and forget sending of messages to this actor.
    pub fn tell<M>(&self, msg: M) -> Result<(), ActorError>
    where
        M: Message,
        A: Handler<M>,
    {
        let message = handler::ActorMessage::<M, A>::new(msg, None);
        if let Err(error) = self.sender.send(Box::new(message)) {
            log::error!("Failed to tell message! {}", error.to_string());
            Err(ActorError::SendError(error.to_string()))
        } else {
            Ok(())
        }
    }

    /// Send a message to this actor and get back a future of its reply.
    ///
    /// The future fails with [`ActorError::Timeout`] when no reply arrives
    /// within `timeout`. A reply that shows up later is discarded.
    pub fn ask<M>(&self, msg: M, timeout: Duration) -> ActorFuture<M::Reply>
    where
        M: Message,
        A: Handler<M>,
    {
        let (promise, future) = Promise::pair(&self.executor);
        let deadline = Instant::now() + timeout;
        let ask_id = Uuid::new_v4();
        let (response_sender, response_receiver) = oneshot::channel();
        let rsvp = handler::Rsvp::new(ask_id, response_sender);
        let message = handler::ActorMessage::<M, A>::new(msg, Some(rsvp));

        if let Err(error) = self.sender.send(Box::new(message)) {
            log::error!("Failed to ask message! {}", error.to_string());
            promise.fail(ActorError::SendError(error.to_string()));
            return future;
        }

        let path = self.path.clone();
        self.executor.spawn(async move {
            let outcome = match tokio::time::timeout_at(deadline, response_receiver).await {
                Ok(Ok(reply)) => reply,
                Ok(Err(error)) => Err(ActorError::SendError(error.to_string())),
                Err(_elapsed) => {
                    log::debug!("Ask {} to '{}' timed out after {:?}", ask_id, path, timeout);
                    Err(ActorError::Timeout(timeout))
                }
            };
            promise.settle(outcome);
        });

        future
    }

    /// Checks if the actor mailbox is still open.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub(crate) fn new(path: ActorPath, sender: handler::MailboxSender<A>, executor: Handle) -> Self {
        ActorRef {
            path,
            sender,
            executor,
        }
    }
}

impl<A: Actor> std::fmt::Debug for ActorRef<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

#[derive(Error, Debug, Clone)]
pub enum ActorError {
    #[error("Actor exists: {0}")]
    Exists(ActorPath),

    #[error("Actor creation failed: {0}")]
    CreateError(String),

    #[error("Sending message failed: {0}")]
    SendError(String),

    #[error("Unmatched message: {0}")]
    Unmatched(String),

    #[error("No reply within {0:?}")]
    Timeout(Duration),

    #[error("Actor runtime error: {0}")]
    RuntimeError(Arc<anyhow::Error>),
}

impl ActorError {
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RuntimeError(Arc::new(anyhow::Error::new(error)))
    }

    /// Turn a caught panic into a runtime error naming what panicked.
    pub(crate) fn from_panic(what: &str, payload: Box<dyn Any + Send>) -> Self {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|reason| reason.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown cause".to_string());
        Self::RuntimeError(Arc::new(anyhow::anyhow!("{what} panicked: {reason}")))
    }

    /// True when the error means "no answer" rather than "the answer was an error".
    pub fn is_timeout(&self) -> bool {
        matches!(self, ActorError::Timeout(_))
    }
}
