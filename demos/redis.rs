//! Example demonstrating Redis-backed quota enforcement.
//!
//! With a Redis counter store every service instance pointed at the same
//! Redis shares one quota ceiling per caller, so replicas enforce the
//! limit fleet-wide instead of each keeping its own count.
//!
//! # Quick Start
//!
//! 1. Start Redis:
//!    ```bash
//!    docker run -p 6379:6379 redis:7-alpine
//!    ```
//!
//! 2. Run the example (from project root):
//!    ```bash
//!    cargo run --example redis --features redis-store
//!    ```
//!
//! # Testing Distributed Enforcement
//!
//! Run the example twice in quick succession. The second run continues
//! counting where the first stopped, because the counter and its window
//! live in Redis, not in the process.

use geogate::{Admission, QuotaGate, QuotaPolicy, RedisCounterStore};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let store = RedisCounterStore::connect("redis://127.0.0.1/").await?;

    // 5 requests per caller per 30 seconds, shared across instances.
    let policy = QuotaPolicy::new(5, Duration::from_secs(30))?;
    let gate = QuotaGate::new(store, policy);

    let caller = "203.0.113.77";
    println!(
        "admitting 8 requests from {} (limit {} per {:?})\n",
        caller,
        gate.policy().max_requests(),
        gate.policy().window()
    );

    for i in 1..=8 {
        match gate.admit(caller).await? {
            Admission::Allowed => println!("request {}: allowed", i),
            Admission::Rejected(reason) => println!("request {}: rejected ({:?})", i, reason),
        }
    }

    println!("\nrun this again within 30s and the rejections continue where they left off");
    Ok(())
}
