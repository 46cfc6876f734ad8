//! Retrying Deploy
//!
//! A deploy step that fails twice before succeeding, driven by
//! `transit_with_retries` with an exponential backoff loaded from JSON.
//! Later deploys are stopped with `stop` while they wait: one after a
//! failed attempt (an error) and one before its first attempt (`Ok`).
//!
//! Run with: RUST_LOG=switchyard=debug cargo run --example retrying_deploy

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use switchyard::{state_enum, BoxError, MachineBuilder, RetryConfig, RetryPolicy, State};
use tracing_subscriber::EnvFilter;

state_enum! {
    enum Deploy {
        Idle,
        Live,
    }
    final: [Live]
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Retrying Deploy ===\n");

    let config = RetryConfig::from_json(
        r#"{ "max_retries": 5, "backoff": { "kind": "exponential", "initial_ms": 20, "factor": 2.0, "max_ms": 200 } }"#,
    )?;

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let machine = MachineBuilder::<Deploy, ()>::new()
        .initial(Deploy::Idle)
        .retry_config(&config)?
        .transition([Deploy::Idle], Deploy::Live, move |_| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
            println!("  deploy attempt {attempt}");
            if attempt < 3 {
                Err(format!("health check failed on attempt {attempt}").into())
            } else {
                Ok(())
            }
        })
        .build()?;

    machine.transit_with_retries(Deploy::Live, Vec::new()).await?;
    println!(
        "Deployed after {} attempts, now {}\n",
        attempts.load(Ordering::SeqCst),
        machine.current_state().name()
    );

    println!("Cancelling a deploy that waits a minute between attempts:");
    let stuck = MachineBuilder::<Deploy, ()>::new()
        .initial(Deploy::Idle)
        .retry_policy(RetryPolicy::new(10, |attempt| {
            if attempt == 1 {
                Duration::ZERO
            } else {
                Duration::from_secs(60)
            }
        }))
        .transition([Deploy::Idle], Deploy::Live, |_| Err("registry unreachable".into()))
        .build()?;

    let looping = stuck.clone();
    let task = tokio::spawn(async move { looping.transit_with_retries(Deploy::Live, Vec::new()).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    stuck.stop();

    match task.await? {
        Ok(()) => println!("  stopped before any attempt, still {}", stuck.current_state().name()),
        Err(err) => println!("  {err}"),
    }

    println!("\nStopping a deploy before its first attempt is not an error:");
    let waiting = MachineBuilder::<Deploy, ()>::new()
        .initial(Deploy::Idle)
        .retry_policy(RetryPolicy::constant(3, Duration::from_secs(60)))
        .allow([Deploy::Idle], Deploy::Live)
        .build()?;

    let looping = waiting.clone();
    let task = tokio::spawn(async move { looping.transit_with_retries(Deploy::Live, Vec::new()).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    waiting.stop();

    task.await??;
    println!("  returned Ok, still {}", waiting.current_state().name());

    println!("\n=== Example Complete ===");
    Ok(())
}
