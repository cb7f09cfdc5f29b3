use crate::actor_system::Message;

/// Free-form text for the Pong actor. Only `"Ping"` gets an answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Say(pub String);

impl Say {
    pub fn new(text: impl Into<String>) -> Self {
        Say(text.into())
    }
}

impl Message for Say {
    type Reply = String;
}

#[derive(Clone, Debug)]
pub struct GetStats;

impl Message for GetStats {
    type Reply = PongStats;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PongStats {
    pub pongs: u64,
    pub rejected: u64,
}
