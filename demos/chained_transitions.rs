//! Chained Transitions
//!
//! A single `transit` call that walks a document through several states.
//! Each after handler starts the next hop with `transition_to`, and the
//! global hooks show where every hop begins and ends.
//!
//! Run with: cargo run --example chained_transitions

use serde_json::json;
use switchyard::{state_enum, transition_to, MachineBuilder, State};

state_enum! {
    enum Document {
        Draft,
        Submitted,
        Reviewed,
        Published,
    }
    final: [Published]
}

fn main() {
    println!("=== Chained Transitions ===\n");

    let machine = MachineBuilder::<Document>::new()
        .initial(Document::Draft)
        .transition([Document::Draft], Document::Submitted, |event| {
            let author = event.arg(0).and_then(|v| v["author"].as_str()).unwrap_or("unknown");
            println!("  submitted by {author}");
            Ok(())
        })
        .allow([Document::Submitted], Document::Reviewed)
        .allow([Document::Reviewed], Document::Published)
        .after([Document::Draft], Document::Submitted, transition_to(Document::Reviewed))
        .after([Document::Submitted], Document::Reviewed, transition_to(Document::Published))
        .before_all(|event| {
            println!("begin {} -> {}", event.from.name(), event.to.name());
            Ok(())
        })
        .after_all(|event| {
            println!("end   {} -> {}", event.from.name(), event.to.name());
            Ok(())
        })
        .build()
        .unwrap();

    machine
        .transit(Document::Submitted, vec![json!({ "author": "kim" })])
        .unwrap();

    println!("\nFinal state: {}", machine.current_state().name());
    println!("Is final: {}", machine.is_final());

    println!("\n=== Example Complete ===");
}
