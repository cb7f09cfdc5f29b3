mod actor;
mod state;

pub use actor::{PING, PONG, PongActor};
pub use state::{GetStats, PongStats, Say};
