use pong_actor::actor_system::{ActorError, ActorFuture, ActorRef, ActorSystem};
use pong_actor::config::PongConfig;
use pong_actor::pong::{GetStats, PING, PongActor, Say};
use std::sync::mpsc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = PongConfig::from_env();
    let timeout = config.ask_timeout();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(format!("{}-worker", config.system_name))
        .enable_all()
        .build()?;

    let system = ActorSystem::new(&config.system_name, runtime.handle().clone());
    let pong = system.create_actor("ponger", PongActor::with_reply_delay(config.reply_delay()))?;
    log::info!("Actor system '{}' running {}", system.name(), pong.path());

    // Wait for each scenario's printout so they appear in order.
    let (printed, lines) = mpsc::channel::<String>();

    match pong.ask(Say::new(PING), timeout).get(timeout) {
        Ok(reply) => println!("Ping -> {reply}"),
        Err(error) => println!("Ping failed: {error}"),
    }

    match pong.ask(Say::new("unknown"), timeout).get(timeout) {
        Ok(reply) => println!("unknown -> {reply}"),
        Err(error) => println!("unknown failed: {error}"),
    }

    let sender = printed.clone();
    pong.ask(Say::new(PING), timeout).on_settled(move |outcome| {
        if let Ok(reply) = outcome {
            let _ = sender.send(format!("replied with: {reply}"));
        }
    });
    println!("Sleeping...");
    print_next(&lines, timeout);

    let second = pong.clone();
    let sender = printed.clone();
    pong.ask(Say::new(PING), timeout)
        .flat_map(move |_| second.ask(Say::new(PING), timeout))
        .on_settled(move |outcome| {
            if let Ok(reply) = outcome {
                let _ = sender.send(format!("replied with2: {reply}"));
            }
        });
    print_next(&lines, timeout);

    let sender = printed.clone();
    ask_and_handle(&pong, "cause error", timeout).on_settled(move |outcome| {
        if let Ok(line) = outcome {
            let _ = sender.send(line);
        }
    });
    print_next(&lines, timeout);

    let sender = printed.clone();
    ask_and_handle(&pong, PING, timeout).on_settled(move |outcome| {
        if let Ok(line) = outcome {
            let _ = sender.send(line);
        }
    });
    print_next(&lines, timeout);

    let sender = printed;
    pong.ask(Say::new("cause error"), timeout)
        .recover(|_| "default".to_string())
        .on_settled(move |outcome| {
            if let Ok(reply) = outcome {
                let _ = sender.send(format!("Recovery: {reply}"));
            }
        });
    print_next(&lines, timeout);

    let stats = pong.ask(GetStats, timeout).get(timeout)?;
    log::info!("{} pongs, {} rejected", stats.pongs, stats.rejected);

    system.shutdown();
    drop(pong);
    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}

fn ask_and_handle(
    pong: &ActorRef<PongActor>,
    text: &str,
    timeout: Duration,
) -> ActorFuture<String> {
    pong.ask(Say::new(text), timeout)
        .handle(|outcome: Result<String, ActorError>| match outcome {
            Ok(reply) => format!("Success: {reply}"),
            Err(error) => format!("Error: {error}"),
        })
}

fn print_next(lines: &mpsc::Receiver<String>, timeout: Duration) {
    match lines.recv_timeout(timeout) {
        Ok(line) => println!("{line}"),
        Err(_) => log::warn!("No reply within {:?}", timeout),
    }
}
