use crate::actor_system::{Actor, ActorContext, ActorError, Handler, async_trait};
use crate::pong::state::{GetStats, PongStats, Say};
use tokio::time::Duration;

pub const PING: &str = "Ping";
pub const PONG: &str = "Pong";

/// Answers "Ping" with "Pong" and fails every other [`Say`].
#[derive(Default)]
pub struct PongActor {
    stats: PongStats,
    reply_delay: Option<Duration>,
}

impl PongActor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` before answering each [`Say`].
    pub fn with_reply_delay(delay: Duration) -> Self {
        Self {
            stats: PongStats::default(),
            reply_delay: Some(delay).filter(|d| !d.is_zero()),
        }
    }
}

#[async_trait]
impl Actor for PongActor {
    async fn pre_start(&mut self, ctx: &mut ActorContext) -> Result<(), ActorError> {
        log::debug!("Pong actor {} ready", ctx.path);
        Ok(())
    }

    async fn post_stop(&mut self, ctx: &mut ActorContext) {
        log::debug!(
            "Pong actor {} stopped after {} pongs, {} rejected",
            ctx.path,
            self.stats.pongs,
            self.stats.rejected
        );
    }
}

#[async_trait]
impl Handler<Say> for PongActor {
    async fn handle(&mut self, msg: Say, _ctx: &mut ActorContext) -> Result<String, ActorError> {
        if let Some(delay) = self.reply_delay {
            tokio::time::sleep(delay).await;
        }

        match msg.0.as_str() {
            PING => {
                self.stats.pongs += 1;
                Ok(PONG.to_string())
            }
            _ => {
                self.stats.rejected += 1;
                log::debug!("Pong actor rejected '{}'", msg.0);
                Err(ActorError::Unmatched(msg.0))
            }
        }
    }
}

#[async_trait]
impl Handler<GetStats> for PongActor {
    async fn handle(&mut self, _msg: GetStats, _ctx: &mut ActorContext) -> Result<PongStats, ActorError> {
        Ok(self.stats)
    }
}
