//! Mailbox envelopes: a message plus the reply channel of whoever asked.

use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::actor_system::actor::{ActorContext, ActorError, Handler, Message};

use super::Actor;

#[async_trait]
pub trait MessageHandler<A: Actor>: Send + Sync {
    /// An error means the actor panicked and must not take further messages.
    async fn handle(&mut self, actor: &mut A, ctx: &mut ActorContext) -> Result<(), ActorError>;
}

/// Single-use reply channel of one ask.
pub(crate) struct Rsvp<R> {
    ask_id: Uuid,
    sender: oneshot::Sender<Result<R, ActorError>>,
}

impl<R> Rsvp<R> {
    pub fn new(ask_id: Uuid, sender: oneshot::Sender<Result<R, ActorError>>) -> Self {
        Rsvp { ask_id, sender }
    }

    fn reply(self, result: Result<R, ActorError>) {
        if self.sender.send(result).is_err() {
            log::debug!("Discarding late reply to ask {}", self.ask_id);
        }
    }
}

pub(crate) struct ActorMessage<M, A>
where
    M: Message,
    A: Handler<M>,
{
    payload: M,
    rsvp: Option<Rsvp<M::Reply>>,
    _phantom_actor: PhantomData<A>,
}

#[async_trait]
impl<M, A> MessageHandler<A> for ActorMessage<M, A>
where
    M: Message,
    A: Handler<M>,
{
    async fn handle(&mut self, actor: &mut A, ctx: &mut ActorContext) -> Result<(), ActorError> {
        let handled = AssertUnwindSafe(actor.handle(self.payload.clone(), ctx))
            .catch_unwind()
            .await;
        let (result, health) = match handled {
            Ok(result) => (result, Ok(())),
            Err(payload) => {
                let error = ActorError::from_panic("Message handler", payload);
                (Err(error.clone()), Err(error))
            }
        };

        match self.rsvp.take() {
            Some(rsvp) => rsvp.reply(result),
            None => {
                if let Err(error) = result {
                    log::warn!("Actor '{}' failed to handle told message: {}", ctx.path, error);
                }
            }
        }

        health
    }
}

impl<M, A> ActorMessage<M, A>
where
    M: Message,
    A: Handler<M>,
{
    pub fn new(msg: M, rsvp: Option<Rsvp<M::Reply>>) -> Self {
        ActorMessage {
            payload: msg,
            rsvp,
            _phantom_actor: PhantomData,
        }
    }
}

pub type BoxedMessageHandler<A> = Box<dyn MessageHandler<A>>;
pub type MailboxReceiver<A> = mpsc::UnboundedReceiver<BoxedMessageHandler<A>>;
pub type MailboxSender<A> = mpsc::UnboundedSender<BoxedMessageHandler<A>>;

pub struct ActorMailbox<A: Actor> {
    _phantom_actor: PhantomData<A>,
}

impl<A: Actor> ActorMailbox<A> {
    pub fn create() -> (MailboxSender<A>, MailboxReceiver<A>) {
        mpsc::unbounded_channel()
    }
}
