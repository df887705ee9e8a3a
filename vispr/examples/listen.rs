//! vispr listener example.
//!
//! The protocol itself is one-way, so the crate ships no receive path.
//! This example is the debugging counterpart to a talker: it binds the
//! broadcast port, decodes every frame it sees and checks the
//! authentication tag against the shared key.

use std::net::SocketAddr;
use tracing::Level;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use vispr::{bind_listener, derive_key, verify_tag, Frame};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    let filter_layer = filter::LevelFilter::from_level(Level::DEBUG);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();

    let key = derive_key("correct horse battery staple");

    let bind_addr: SocketAddr = "0.0.0.0:55667".parse()?;
    let socket = bind_listener(bind_addr, true)?;

    tracing::info!("✅ Listening for vispr broadcasts on {}", bind_addr);

    // Each broadcast arrives ten times with the same counter, so anything
    // at or below the last accepted counter is a duplicate or a replay.
    let mut last_counter: Option<u64> = None;
    let mut buf = vec![0u8; 2048];

    loop {
        let (len, addr) = socket.recv_from(&mut buf).await?;

        let frame = match Frame::unmarshal(&buf[..len]) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("ignoring malformed datagram from {}: {}", addr, e);
                continue;
            }
        };

        if !verify_tag(
            &key,
            frame.uid,
            frame.counter,
            &frame.topic,
            &frame.message,
            &frame.tag,
        ) {
            tracing::warn!("bad tag on frame from {} (uid {})", addr, frame.uid);
            continue;
        }

        if let Some(last) = last_counter {
            if frame.counter <= last {
                tracing::debug!("duplicate counter {} from uid {}", frame.counter, frame.uid);
                continue;
            }
        }
        last_counter = Some(frame.counter);

        tracing::info!(
            "[{}] uid {} counter {} topic '{}': {}",
            addr,
            frame.uid,
            frame.counter,
            frame.topic,
            String::from_utf8_lossy(&frame.message)
        );
    }
}
