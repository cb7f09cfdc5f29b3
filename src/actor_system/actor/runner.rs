//! Actor runner - drains one actor's mailbox, one message at a time.

use tokio::runtime::Handle;

use crate::actor_system::system::ActorSystem;

use super::{
    Actor, ActorContext, ActorPath, ActorRef,
    handler::{ActorMailbox, MailboxReceiver},
};

pub(crate) struct ActorRunner<A: Actor> {
    path: ActorPath,
    actor: A,
    receiver: MailboxReceiver<A>,
}

impl<A: Actor> ActorRunner<A> {
    pub fn create(path: ActorPath, actor: A, executor: Handle) -> (Self, ActorRef<A>) {
        let (sender, receiver) = ActorMailbox::create();
        let actor_ref = ActorRef::new(path.clone(), sender, executor);
        let runner = ActorRunner {
            path,
            actor,
            receiver,
        };
        (runner, actor_ref)
    }

    pub async fn start(&mut self, system: ActorSystem) {
        log::debug!("Starting actor '{}'...", &self.path);

        let mut ctx = ActorContext {
            path: self.path.clone(),
            system,
        };

        if let Err(error) = self.actor.pre_start(&mut ctx).await {
            log::error!("Actor '{}' failed to start! {}", &self.path, error);
        } else {
            log::debug!("Actor '{}' has started successfully.", &self.path);

            // A handled message, reply included, completes before the next is taken.
            while let Some(mut msg) = self.receiver.recv().await {
                if let Err(error) = msg.handle(&mut self.actor, &mut ctx).await {
                    log::error!("Actor '{}' is stopping: {}", &self.path, error);
                    ctx.system.remove_actor(&self.path);
                    break;
                }
            }

            self.actor.post_stop(&mut ctx).await;
            log::debug!("Actor '{}' stopped.", &self.path);
        }

        self.receiver.close();
    }
}
