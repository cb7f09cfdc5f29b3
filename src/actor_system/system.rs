//! Actor system - the explicit executor handle plus a registry of running actors.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::runtime::Handle;

use crate::actor_system::actor::{Actor, ActorError, ActorPath, ActorRef, runner::ActorRunner};

type Registry = DashMap<ActorPath, Box<dyn Any + Send + Sync>>;

/// Runs actor mailbox loops and ask timers on an injected tokio runtime.
///
/// Cloning is cheap; clones share the registry and the runtime handle.
#[derive(Clone)]
pub struct ActorSystem {
    name: String,
    executor: Handle,
    actors: Arc<Registry>,
}

impl ActorSystem {
    /// Create a system that schedules its work on the given runtime.
    pub fn new(name: &str, executor: Handle) -> Self {
        ActorSystem {
            name: name.to_string(),
            executor,
            actors: Arc::new(DashMap::new()),
        }
    }

    /// Create a system on the runtime the caller is running on.
    pub fn current(name: &str) -> Result<Self, ActorError> {
        let executor =
            Handle::try_current().map_err(|error| ActorError::CreateError(error.to_string()))?;
        Ok(Self::new(name, executor))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executor(&self) -> &Handle {
        &self.executor
    }

    /// Register `actor` as `/<system>/user/<name>` and start its mailbox loop.
    pub fn create_actor<A: Actor>(&self, name: &str, actor: A) -> Result<ActorRef<A>, ActorError> {
        if name.trim().is_empty() || name.contains('/') {
            return Err(ActorError::CreateError(format!("Invalid actor name '{name}'")));
        }
        let path = ActorPath::from(self.name.as_str()) / "user" / name;

        let actor_ref = match self.actors.entry(path.clone()) {
            Entry::Occupied(_) => {
                log::error!("Actor '{}' already exists!", &path);
                return Err(ActorError::Exists(path));
            }
            Entry::Vacant(slot) => {
                let (mut runner, actor_ref) =
                    ActorRunner::create(path, actor, self.executor.clone());
                slot.insert(Box::new(actor_ref.clone()));
                let system = self.clone();
                self.executor.spawn(async move {
                    runner.start(system).await;
                });
                actor_ref
            }
        };

        Ok(actor_ref)
    }

    /// Look up a registered actor by path and type.
    pub fn get_actor<A: Actor>(&self, path: &ActorPath) -> Option<ActorRef<A>> {
        self.actors
            .get(path)
            .and_then(|entry| entry.value().downcast_ref::<ActorRef<A>>().cloned())
    }

    pub(crate) fn remove_actor(&self, path: &ActorPath) {
        if self.actors.remove(path).is_some() {
            log::debug!("Actor '{}' removed from system '{}'", path, &self.name);
        }
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Forget every registered actor.
    ///
    /// Each mailbox loop ends once the last outstanding [`ActorRef`] to it is dropped.
    pub fn shutdown(&self) {
        log::debug!("Shutting down actor system '{}'", &self.name);
        self.actors.clear();
    }
}

impl std::fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorSystem")
            .field("name", &self.name)
            .field("actors", &self.actors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_system::{ActorContext, Handler, Message, async_trait};
    use std::time::{Duration, Instant};
    use tokio::sync::oneshot;

    const WAIT: Duration = Duration::from_millis(1000);

    fn runtime() -> tokio::runtime::Runtime {
        let _ = env_logger::builder().is_test(true).try_init();
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("runtime")
    }

    #[derive(Clone)]
    struct Whoami;

    impl Message for Whoami {
        type Reply = String;
    }

    #[derive(Default)]
    struct Named {
        stopped: Option<oneshot::Sender<()>>,
    }

    #[async_trait]
    impl Actor for Named {
        async fn post_stop(&mut self, _ctx: &mut ActorContext) {
            if let Some(stopped) = self.stopped.take() {
                let _ = stopped.send(());
            }
        }
    }

    #[async_trait]
    impl Handler<Whoami> for Named {
        async fn handle(&mut self, _msg: Whoami, ctx: &mut ActorContext) -> Result<String, ActorError> {
            Ok(format!("{} in {}", ctx.path, ctx.system.name()))
        }
    }

    struct Broken;

    #[async_trait]
    impl Actor for Broken {
        async fn pre_start(&mut self, _ctx: &mut ActorContext) -> Result<(), ActorError> {
            Err(ActorError::CreateError("refusing to start".to_string()))
        }
    }

    #[async_trait]
    impl Handler<Whoami> for Broken {
        async fn handle(&mut self, _msg: Whoami, _ctx: &mut ActorContext) -> Result<String, ActorError> {
            Ok("unreachable".to_string())
        }
    }

    #[test]
    fn test_create_and_ask() {
        let rt = runtime();
        let system = ActorSystem::new("test", rt.handle().clone());
        let actor = system.create_actor("named", Named::default()).unwrap();
        assert_eq!(actor.path().to_string(), "/test/user/named");

        let reply = actor.ask(Whoami, WAIT).get(WAIT).unwrap();
        assert_eq!(reply, "/test/user/named in test");
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let rt = runtime();
        let system = ActorSystem::new("test", rt.handle().clone());
        system.create_actor("named", Named::default()).unwrap();

        let result = system.create_actor("named", Named::default());
        assert!(matches!(result, Err(ActorError::Exists(path)) if path.key() == "named"));
        assert_eq!(system.actor_count(), 1);
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let rt = runtime();
        let system = ActorSystem::new("test", rt.handle().clone());
        assert!(matches!(
            system.create_actor("a/b", Named::default()),
            Err(ActorError::CreateError(_))
        ));
        assert!(matches!(
            system.create_actor(" ", Named::default()),
            Err(ActorError::CreateError(_))
        ));
    }

    #[test]
    fn test_get_actor_is_typed() {
        let rt = runtime();
        let system = ActorSystem::new("test", rt.handle().clone());
        let actor = system.create_actor("named", Named::default()).unwrap();

        let found: Option<ActorRef<Named>> = system.get_actor(actor.path());
        assert!(found.is_some());
        let wrong: Option<ActorRef<Broken>> = system.get_actor(actor.path());
        assert!(wrong.is_none());
        let missing: Option<ActorRef<Named>> = system.get_actor(&ActorPath::from("/test/user/nobody"));
        assert!(missing.is_none());
    }

    #[test]
    fn test_current_requires_runtime() {
        assert!(matches!(ActorSystem::current("test"), Err(ActorError::CreateError(_))));

        let rt = runtime();
        let system = rt.block_on(async { ActorSystem::current("test") }).unwrap();
        assert_eq!(system.name(), "test");
    }

    #[test]
    fn test_shutdown_stops_actor_after_last_ref() {
        let rt = runtime();
        let system = ActorSystem::new("test", rt.handle().clone());
        let (stopped_tx, stopped_rx) = oneshot::channel();
        let actor = system
            .create_actor(
                "named",
                Named {
                    stopped: Some(stopped_tx),
                },
            )
            .unwrap();

        system.shutdown();
        assert_eq!(system.actor_count(), 0);
        assert!(!actor.is_closed());
        drop(actor);

        let stopped = rt.block_on(async { tokio::time::timeout(WAIT, stopped_rx).await });
        assert!(matches!(stopped, Ok(Ok(()))));
    }

    struct Fragile;

    impl Actor for Fragile {}

    #[async_trait]
    impl Handler<Whoami> for Fragile {
        async fn handle(&mut self, _msg: Whoami, _ctx: &mut ActorContext) -> Result<String, ActorError> {
            panic!("fragile actor broke")
        }
    }

    #[test]
    fn test_panicking_handler_fails_ask_and_removes_actor() {
        let rt = runtime();
        let system = ActorSystem::new("test", rt.handle().clone());
        let actor = system.create_actor("fragile", Fragile).unwrap();

        let error = actor.ask(Whoami, WAIT).get(WAIT).unwrap_err();
        assert!(!error.is_timeout());
        assert!(matches!(&error, ActorError::RuntimeError(_)));
        assert!(error.to_string().contains("fragile actor broke"));

        let deadline = Instant::now() + WAIT;
        while !actor.is_closed() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(actor.is_closed());
        assert!(system.get_actor::<Fragile>(actor.path()).is_none());
        assert_eq!(system.actor_count(), 0);

        let refused = actor.ask(Whoami, WAIT).get(WAIT);
        assert!(matches!(refused, Err(ActorError::SendError(_))));
    }

    #[test]
    fn test_failed_start_fails_asks() {
        let rt = runtime();
        let system = ActorSystem::new("test", rt.handle().clone());
        let actor = system.create_actor("broken", Broken).unwrap();

        let result = actor.ask(Whoami, WAIT).get(WAIT);
        assert!(matches!(result, Err(ActorError::SendError(_))));
    }
}
