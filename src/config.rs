use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PongConfig {
    pub system_name: String,
    pub ask_timeout_ms: u64,
    pub worker_threads: usize,
    pub reply_delay_ms: u64,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            system_name: "pong".to_string(),
            ask_timeout_ms: 1000,
            worker_threads: 2,
            reply_delay_ms: 0,
        }
    }
}

impl PongConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("PONG_SYSTEM_NAME") {
            if !name.trim().is_empty() {
                config.system_name = name;
            }
        }

        if let Some(timeout) = lookup("PONG_ASK_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse::<u64>() {
                config.ask_timeout_ms = t;
            }
        }

        if let Some(threads) = lookup("PONG_WORKER_THREADS") {
            if let Ok(n) = threads.parse::<usize>() {
                if n > 0 {
                    config.worker_threads = n;
                }
            }
        }

        if let Some(delay) = lookup("PONG_REPLY_DELAY_MS") {
            if let Ok(d) = delay.parse::<u64>() {
                config.reply_delay_ms = d;
            }
        }

        config
    }

    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}
