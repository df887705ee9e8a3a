//! Shared protocol-level constants for vispr.
//!
//! These values are part of the wire-level contract shared with deployed
//! talkers and listeners and must not change independently of them.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

// === Framing ===

/// First byte of every vispr datagram.
pub const PREAMBLE: u8 = 0xEF;

/// Last byte of every vispr datagram.
pub const END_OF_BROADCAST: u8 = 0xFE;

/// Value of the reserved flag byte.
pub const FLAG_RESERVED: u8 = 0x00;

/// Size of the authentication tag carried in each frame.
pub const MAC_LEN: usize = 16;

/// Fixed bytes before the variable-length topic: preamble, flag, uid,
/// tag, counter, topic length, message length.
pub const FRAME_HEADER_LEN: usize = 1 + 1 + 2 + MAC_LEN + 8 + 1 + 1;

/// Fixed framing overhead: header plus the trailing end marker.
pub const FRAME_OVERHEAD: usize = FRAME_HEADER_LEN + 1;

/// Longest message a single frame can carry; the wire format reserves one
/// byte for the message length.
pub const MAX_MESSAGE_LEN: usize = 255;

// === Topic contract ===

/// Minimum accepted topic length in bytes.
pub const TOPIC_MIN_LEN: usize = 5;

/// Maximum accepted topic length in bytes.
pub const TOPIC_MAX_LEN: usize = 100;

const _: () = {
    assert!(
        TOPIC_MAX_LEN <= MAX_MESSAGE_LEN,
        "topic length must fit in its one-byte wire field"
    );
};

// === Keys and ciphers ===

/// Size of the pre-shared key for the AES-128 path used by the talker.
pub const KEY_LEN: usize = 16;

/// AES block size; ciphertext lengths are always a multiple of this.
pub const BLOCK_SIZE: usize = 16;

// === Destination ===

/// UDP port listeners bind to.
pub const BROADCAST_PORT: u16 = 55667;

/// Default destination for outgoing frames: limited broadcast on the
/// well-known port.
pub const BROADCAST_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, BROADCAST_PORT));

// === Redundant transmission ===

/// Number of times each frame is transmitted. Broadcast UDP has no
/// acknowledgement, so redundancy substitutes for retries.
pub const SEND_COUNT: u32 = 10;

/// Pause after each transmission, including the last.
pub const SEND_INTERVAL: Duration = Duration::from_millis(10);
