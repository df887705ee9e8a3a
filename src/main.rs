use std::error::Error;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use vispr::protocol::constants::BROADCAST_ADDR;
use vispr::{derive_key, CounterStore, FileCounterStore, Talker, TalkerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    let filter_layer = filter::LevelFilter::from_level(Level::DEBUG);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();

    let passphrase = "correct horse battery staple"; // shared with any listener
    let topic = "vispr/beacon";

    tracing::info!("vispr beacon starting...");
    tracing::info!("Broadcasting to: {}", BROADCAST_ADDR);
    tracing::info!("Topic: {}", topic);

    // Resume the counter from the previous run so listeners never see it go backwards
    let store = FileCounterStore::new("vispr-counter.bin");
    let start_counter = store.load()?.unwrap_or(0);
    tracing::info!("Starting counter: {}", start_counter);

    let key = derive_key(passphrase);
    let config = TalkerConfig::new("beacon", 1, key, topic, start_counter);

    let mut talker = Talker::new();
    talker.initialize(config)?;
    talker.set_counter_store(store);

    let started = Instant::now();
    loop {
        let message = format!("up {}s", started.elapsed().as_secs());
        tracing::info!("broadcasting '{}'", message);
        talker.broadcast(message.as_bytes()).await?;

        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}
