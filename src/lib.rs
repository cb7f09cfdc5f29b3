//! A single Ping/Pong actor behind an ask-pattern API.
//!
//! ```no_run
//! use pong_actor::actor_system::ActorSystem;
//! use pong_actor::pong::{PongActor, Say};
//! use std::time::Duration;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let system = ActorSystem::new("pong", runtime.handle().clone());
//! let pong = system.create_actor("ponger", PongActor::new()).unwrap();
//!
//! let timeout = Duration::from_millis(1000);
//! assert_eq!(pong.ask(Say::new("Ping"), timeout).get(timeout).unwrap(), "Pong");
//! ```

pub mod actor_system;
pub mod config;
pub mod pong;
