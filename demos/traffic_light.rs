//! Traffic Light State Machine
//!
//! This example demonstrates a simple cyclic state machine.
//!
//! Key concepts:
//! - Cyclic state transitions (states repeat)
//! - Before/after handlers around each change
//! - Illegal transitions are rejected without side effects
//!
//! Run with: cargo run --example traffic_light

use switchyard::{state_enum, MachineBuilder, State};

state_enum! {
    enum TrafficLight {
        Red,
        Yellow,
        Green,
    }
}

fn main() {
    println!("=== Traffic Light State Machine ===\n");

    let machine = MachineBuilder::<TrafficLight, String>::new()
        .initial(TrafficLight::Red)
        .allow([TrafficLight::Red], TrafficLight::Green)
        .allow([TrafficLight::Green], TrafficLight::Yellow)
        .allow([TrafficLight::Yellow], TrafficLight::Red)
        .before_all(|event| {
            println!("  {} -> {}", event.from.name(), event.to.name());
            Ok(())
        })
        .after([TrafficLight::Red], TrafficLight::Green, |event| {
            let reason = event.arg(0).map(String::as_str).unwrap_or("timer");
            println!("    Go! ({reason})");
            Ok(())
        })
        .build()
        .unwrap();

    println!("Initial state: {}\n", machine.current_state().name());

    println!("Two full cycles:");
    for _ in 0..2 {
        machine
            .transit(TrafficLight::Green, vec!["pedestrian button".to_string()])
            .unwrap();
        machine.transit(TrafficLight::Yellow, Vec::new()).unwrap();
        machine.transit(TrafficLight::Red, Vec::new()).unwrap();
    }

    println!("\nSkipping yellow is not allowed:");
    machine.transit(TrafficLight::Green, Vec::new()).unwrap();
    match machine.transit(TrafficLight::Red, Vec::new()) {
        Ok(()) => println!("  unexpectedly allowed"),
        Err(err) => println!("  {err}"),
    }
    println!("  Still {}", machine.current_state().name());

    println!("\n=== Example Complete ===");
}
