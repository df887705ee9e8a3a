//! vispr talker example.
//!
//! This example demonstrates how to create a vispr talker that:
//! - Derives the pre-shared key from a passphrase
//! - Resumes its counter from the previous run
//! - Broadcasts a reading every few seconds

use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use vispr::{derive_key, CounterStore, FileCounterStore, Talker, TalkerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    let filter_layer = filter::LevelFilter::from_level(Level::DEBUG);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();

    // Resume the counter where the previous run left off
    let store = FileCounterStore::new("vispr-counter.bin");
    let start_counter = store.load()?.unwrap_or(0);

    let key = derive_key("correct horse battery staple");
    let config = TalkerConfig::new("demo-talker", 7, key, "sensors/temp", start_counter);

    tracing::info!("vispr talker starting");
    tracing::info!("   UID: 7, topic: sensors/temp");
    tracing::info!("   Starting counter: {}", start_counter);

    let mut talker = Talker::new();
    talker.initialize(config)?;
    talker.set_counter_store(store);

    tracing::info!("✅ Talker active, broadcasting to 255.255.255.255:55667");

    for reading in 0..5 {
        let message = format!("23.{}C", reading);
        tracing::info!("broadcasting '{}'", message);
        talker.broadcast(message.as_bytes()).await?;

        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    talker.destroy()?;
    tracing::info!("talker destroyed");

    Ok(())
}
