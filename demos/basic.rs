//! Basic example demonstrating quota gating and reserved classification.
//!
//! This example runs the full admission pipeline against the in-process
//! counter store: a caller gets 3 requests per minute, and queried
//! addresses in reserved blocks are skipped before any lookup.
//!
//! Run with:
//! ```bash
//! cargo run --example basic
//! ```

use geogate::{Admission, InMemoryCounterStore, QuotaGate, QuotaPolicy, ReservedRanges, SystemClock};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Allow 3 requests per caller per minute.
    let policy = QuotaPolicy::new(3, Duration::from_secs(60))?;
    let store = InMemoryCounterStore::new(Arc::new(SystemClock::new()));
    let gate = QuotaGate::new(store, policy);

    println!("=== Quota Gating ===\n");
    println!("Policy: {} requests per {:?}\n", gate.policy().max_requests(), gate.policy().window());

    let caller = "93.184.216.34";
    for i in 1..=5 {
        match gate.admit(caller).await? {
            Admission::Allowed => println!("request {} from {}: allowed", i, caller),
            Admission::Rejected(reason) => {
                println!("request {} from {}: rejected ({:?})", i, caller, reason)
            }
        }
    }

    // A malformed caller address is a client error, not a quota decision.
    println!();
    match gate.admit("not-an-ip").await {
        Err(e) => println!("malformed caller: {}", e),
        Ok(_) => unreachable!(),
    }

    println!("\n=== Reserved Classification ===\n");
    let reserved = ReservedRanges::iana();
    for query in ["8.8.8.8", "10.0.0.1", "127.0.0.1", "1.1.1.1", "224.0.0.1"] {
        let address = query.parse()?;
        if reserved.is_reserved(address) {
            println!("{}: reserved, skipping lookup", query);
        } else {
            println!("{}: routable, would look up", query);
        }
    }

    let snapshot = gate.metrics().snapshot();
    println!(
        "\nmetrics: {} allowed, {} rejected, {} malformed ({:.0}% rejection rate)",
        snapshot.requests_allowed,
        snapshot.requests_rejected,
        snapshot.malformed_addresses,
        snapshot.rejection_rate() * 100.0
    );
    Ok(())
}
