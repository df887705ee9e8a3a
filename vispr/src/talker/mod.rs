//! The sending endpoint of the vispr protocol.
//!
//! A [`Talker`] owns the sender identity, the pre-shared key and the
//! anti-replay counter, and drives the tag computation, frame encoding and
//! redundant send loop for each broadcast. All mutating operations take
//! `&mut self`, so ownership alone serializes `initialize`, `broadcast`
//! and `destroy` on one instance.

use crate::error::{Result, VisprError};
use crate::protocol::constants::{
    BROADCAST_ADDR, KEY_LEN, MAX_MESSAGE_LEN, SEND_COUNT, SEND_INTERVAL, TOPIC_MAX_LEN,
    TOPIC_MIN_LEN,
};
use crate::protocol::frame::Frame;
use crate::protocol::mac;
use crate::store::CounterStore;
use crate::transport::{BroadcastSocket, Transmit};
use bytes::Bytes;
use rand::Rng;
use std::net::SocketAddr;
use std::time::Duration;

/// How the counter advances after each broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterStep {
    /// Advance by a constant amount. Deployed listeners expect a step of
    /// exactly 1, which is also the default.
    Fixed(u64),

    /// Advance by a fresh random amount in `1..=max` per broadcast.
    ///
    /// This changes the counter sequence listeners observe; select it only
    /// when every receiver is known to tolerate gaps.
    Randomized {
        /// Largest permitted step; treated as 1 if set to 0.
        max: u64,
    },
}

impl Default for CounterStep {
    fn default() -> Self {
        CounterStep::Fixed(1)
    }
}

impl CounterStep {
    fn step_size(&self) -> u64 {
        match *self {
            CounterStep::Fixed(step) => step,
            CounterStep::Randomized { max } => rand::thread_rng().gen_range(1..=max.max(1)),
        }
    }
}

/// Configuration for a [`Talker`].
#[derive(Debug, Clone)]
pub struct TalkerConfig {
    /// Human-readable role name, used in logs only.
    pub name: String,

    /// Two-byte sender identity embedded in every frame.
    pub uid: u16,

    /// Pre-shared 16-byte key listeners use to verify tags.
    pub key: [u8; KEY_LEN],

    /// Topic string; must be 5 to 100 bytes long.
    pub topic: String,

    /// Counter value the first broadcast goes out with.
    pub start_counter: u64,

    /// Destination endpoint for every frame.
    pub destination: SocketAddr,

    /// Number of times each frame is transmitted.
    pub send_count: u32,

    /// Pause after each transmission, including the last.
    pub send_interval: Duration,

    /// How the counter advances after a broadcast.
    pub counter_step: CounterStep,
}

impl TalkerConfig {
    /// Creates a configuration with protocol defaults for the destination,
    /// the retransmission schedule and the counter step.
    pub fn new(
        name: impl Into<String>,
        uid: u16,
        key: [u8; KEY_LEN],
        topic: impl Into<String>,
        start_counter: u64,
    ) -> Self {
        Self {
            name: name.into(),
            uid,
            key,
            topic: topic.into(),
            start_counter,
            destination: BROADCAST_ADDR,
            send_count: SEND_COUNT,
            send_interval: SEND_INTERVAL,
            counter_step: CounterStep::default(),
        }
    }

    /// Creates a builder for [`TalkerConfig`].
    pub fn builder() -> TalkerConfigBuilder {
        TalkerConfigBuilder::default()
    }

    fn validate(&self) -> Result<()> {
        let topic_len = self.topic.len();
        if !(TOPIC_MIN_LEN..=TOPIC_MAX_LEN).contains(&topic_len) {
            return Err(VisprError::InvalidTopic(topic_len));
        }
        Ok(())
    }
}

/// Configuration builder for [`Talker`].
#[derive(Debug, Clone)]
pub struct TalkerConfigBuilder {
    name: String,
    uid: Option<u16>,
    key: Option<[u8; KEY_LEN]>,
    topic: Option<String>,
    start_counter: u64,
    destination: SocketAddr,
    send_count: u32,
    send_interval: Duration,
    counter_step: CounterStep,
}

impl Default for TalkerConfigBuilder {
    /// Creates a builder populated with the protocol defaults.
    ///
    /// The sender identity fields `uid`, `key` and `topic` have no
    /// defaults and must be supplied before building.
    fn default() -> Self {
        Self {
            name: "vispr".to_string(),
            uid: None,
            key: None,
            topic: None,
            start_counter: 0,
            destination: BROADCAST_ADDR,
            send_count: SEND_COUNT,
            send_interval: SEND_INTERVAL,
            counter_step: CounterStep::default(),
        }
    }
}

impl From<TalkerConfigBuilder> for TalkerConfig {
    fn from(builder: TalkerConfigBuilder) -> Self {
        builder.build()
    }
}

impl TalkerConfigBuilder {
    /// Creates a new [`TalkerConfigBuilder`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the role name used in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the two-byte sender identity.
    #[must_use]
    pub fn uid(mut self, uid: u16) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Sets the pre-shared 16-byte key.
    #[must_use]
    pub fn key(mut self, key: [u8; KEY_LEN]) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the topic string.
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sets the counter value the first broadcast goes out with.
    pub fn start_counter(mut self, value: u64) -> Self {
        self.start_counter = value;
        self
    }

    /// Sets the destination endpoint.
    pub fn destination(mut self, addr: impl Into<SocketAddr>) -> Self {
        self.destination = addr.into();
        self
    }

    /// Sets the number of times each frame is transmitted.
    pub fn send_count(mut self, count: u32) -> Self {
        self.send_count = count;
        self
    }

    /// Sets the pause after each transmission.
    pub fn send_interval(mut self, interval: Duration) -> Self {
        self.send_interval = interval;
        self
    }

    /// Sets how the counter advances after a broadcast.
    pub fn counter_step(mut self, step: CounterStep) -> Self {
        self.counter_step = step;
        self
    }

    /// Builds a `TalkerConfig` from the builder.
    ///
    /// This consumes the builder and returns a concrete `TalkerConfig`.
    /// Panics if `uid`, `key` or `topic` was not supplied (missing config
    /// value).
    pub fn build(self) -> TalkerConfig {
        let uid = self
            .uid
            .ok_or_else(|| VisprError::MissingConfigValue("uid".to_string()))
            .unwrap();
        let key = self
            .key
            .ok_or_else(|| VisprError::MissingConfigValue("key".to_string()))
            .unwrap();
        let topic = self
            .topic
            .ok_or_else(|| VisprError::MissingConfigValue("topic".to_string()))
            .unwrap();
        TalkerConfig {
            name: self.name,
            uid,
            key,
            topic,
            start_counter: self.start_counter,
            destination: self.destination,
            send_count: self.send_count,
            send_interval: self.send_interval,
            counter_step: self.counter_step,
        }
    }
}

struct ActiveState<T> {
    config: TalkerConfig,
    transport: T,
    counter: u64,
}

/// Sending endpoint with an `Uninitialized -> Active -> Destroyed`
/// lifecycle.
///
/// `Destroyed` and `Uninitialized` are equivalent re-entry points: a
/// destroyed talker accepts a fresh `initialize`. The pre-shared key lives
/// in ordinary memory for the active lifetime and is not securely erased
/// on destroy.
pub struct Talker<T = BroadcastSocket> {
    active: Option<ActiveState<T>>,
    store: Option<Box<dyn CounterStore>>,
}

impl<T: Transmit> Default for Talker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Talker<BroadcastSocket> {
    /// Activates the talker, opening a broadcast-capable socket.
    ///
    /// Fails with [`VisprError::AlreadyActive`] if this talker is already
    /// active, and with [`VisprError::InvalidTopic`] if the topic violates
    /// the 5..=100 byte contract; neither failure opens a socket. Socket
    /// failures leave no partial state behind.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn initialize(&mut self, config: TalkerConfig) -> Result<()> {
        if self.active.is_some() {
            return Err(VisprError::AlreadyActive);
        }
        config.validate()?;

        let transport = BroadcastSocket::new()?;
        self.initialize_with(config, transport)
    }
}

impl<T: Transmit> Talker<T> {
    /// Creates an uninitialized talker.
    pub fn new() -> Self {
        Self {
            active: None,
            store: None,
        }
    }

    /// Activates the talker over a caller-supplied transport.
    ///
    /// Used by tests and by deployments that manage their own socket; the
    /// validation rules match [`Talker::initialize`].
    pub fn initialize_with(&mut self, config: TalkerConfig, transport: T) -> Result<()> {
        if self.active.is_some() {
            return Err(VisprError::AlreadyActive);
        }
        config.validate()?;

        tracing::debug!(
            "talker '{}' (uid {}) active on topic '{}', destination {}",
            config.name,
            config.uid,
            config.topic,
            config.destination
        );

        let counter = config.start_counter;
        self.active = Some(ActiveState {
            config,
            transport,
            counter,
        });
        Ok(())
    }

    /// Broadcasts one message under the configured topic.
    ///
    /// The authentication tag and the wire frame both carry the current
    /// counter value. The frame is then transmitted `send_count` times with
    /// `send_interval` after every send, including the last; a failed send
    /// is logged and does not abort the remaining attempts or fail the
    /// call, since redundancy is the protocol's only delivery mechanism.
    /// After the send loop the counter advances by the configured step and
    /// is persisted to the attached store, if any, on a best-effort basis.
    ///
    /// Fails before any transmission, with the counter untouched, if the
    /// talker is not active or the message exceeds 255 bytes.
    ///
    /// The returned future must be polled to completion. Dropping it part
    /// way through the send loop (via `select!` or `timeout`) abandons the
    /// remaining sends and leaves the counter un-advanced even though
    /// frames carrying it may already be on the wire; the next broadcast
    /// would then reuse that counter value and be discarded by listeners
    /// that filter replays.
    pub async fn broadcast(&mut self, message: &[u8]) -> Result<()> {
        let active = self.active.as_mut().ok_or(VisprError::NotInitialized)?;
        if message.len() > MAX_MESSAGE_LEN {
            return Err(VisprError::PayloadTooLarge(message.len()));
        }

        let config = &active.config;
        let tag = mac::compute_tag(
            &config.key,
            config.uid,
            active.counter,
            &config.topic,
            message,
        )?;
        let frame = Frame {
            uid: config.uid,
            tag,
            counter: active.counter,
            topic: config.topic.clone(),
            message: Bytes::copy_from_slice(message),
        };
        let datagram = frame.marshal()?;

        for attempt in 1..=config.send_count {
            if let Err(e) = active.transport.send(&datagram, config.destination).await {
                tracing::warn!("broadcast send attempt {} failed: {}", attempt, e);
            }
            tokio::time::sleep(config.send_interval).await;
        }

        active.counter = active.counter.wrapping_add(config.counter_step.step_size());
        let counter = active.counter;

        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.save(counter) {
                tracing::warn!("failed to persist broadcast counter: {}", e);
            }
        }

        Ok(())
    }

    /// Deactivates the talker, closing its socket and dropping the owned
    /// identity.
    ///
    /// Idempotent: destroying an inactive talker succeeds as a no-op. A
    /// destroyed talker accepts a fresh `initialize`.
    pub fn destroy(&mut self) -> Result<()> {
        if let Some(active) = self.active.take() {
            tracing::debug!("talker '{}' destroyed", active.config.name);
        }
        Ok(())
    }

    /// Attaches durable storage for the counter.
    ///
    /// The store is written after every successful broadcast with the
    /// counter value the next broadcast will use, so feeding a loaded
    /// value back in as `start_counter` resumes above everything already
    /// sent.
    pub fn set_counter_store(&mut self, store: impl CounterStore + 'static) {
        self.store = Some(Box::new(store));
    }

    /// Whether the talker currently owns a socket and identity.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Counter value the next broadcast will carry, or `None` when the
    /// talker is not active.
    pub fn counter(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.counter)
    }
}
