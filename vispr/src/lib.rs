//! Tokio-based implementation of the vispr broadcast protocol.
//!
//! vispr is a lightweight one-way authenticated broadcast protocol: a
//! sender announces topic-tagged payloads over UDP broadcast to anonymous
//! listeners using nothing but a pre-shared 16-byte key. There is no
//! handshake, no session state and no acknowledgement; every frame is
//! transmitted redundantly and carries a monotonic anti-replay counter.
//!
//! This crate provides the sending endpoint and the pieces listeners need
//! to decode and verify frames:
//! - [`Talker`] for the sending endpoint lifecycle and send loop
//! - [`TalkerConfig`] and [`TalkerConfigBuilder`] for configuration
//! - [`Frame`] for the wire codec
//! - [`Transmit`] trait with the [`BroadcastSocket`] implementation
//! - [`CounterStore`] trait for counter persistence across restarts
//!
//! ## Features
//!
//! - MD5-then-AES-ECB authentication tags, byte-compatible with deployed
//!   listeners
//! - Fixed-count redundant retransmission in place of acknowledgements
//! - Anti-replay counter with pluggable durable storage
//! - Passphrase-derived pre-shared keys via [`derive_key`]

pub mod error;
pub mod protocol;
pub mod store;
pub mod talker;
pub mod transport;

pub use error::{CryptoError, FrameError, Result, VisprError};
pub use protocol::crypto::derive_key;
pub use protocol::frame::Frame;
pub use protocol::mac::{compute_tag, verify_tag};
pub use store::{CounterStore, FileCounterStore, MemoryCounterStore};
pub use talker::{CounterStep, Talker, TalkerConfig, TalkerConfigBuilder};
pub use transport::{bind_listener, BroadcastSocket, Transmit};
