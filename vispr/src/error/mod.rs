use std::io;
use thiserror::Error;

/// Errors related to the vispr protocol.
#[derive(Debug, Error)]
pub enum VisprError {
    /// The talker already owns a socket and cannot be initialized again
    #[error("talker is already active")]
    AlreadyActive,

    /// Operation requires an active talker
    #[error("talker is not active")]
    NotInitialized,

    /// Creating the datagram socket failed
    #[error("failed to create broadcast socket: {0}")]
    SocketCreation(io::Error),

    /// Enabling the broadcast capability failed; the socket is closed
    #[error("failed to enable broadcast on socket: {0}")]
    SocketOption(io::Error),

    /// Message does not fit the one-byte wire length field
    #[error("message length {0} exceeds the 255-byte frame limit")]
    PayloadTooLarge(usize),

    /// Topic violates the protocol's length contract
    #[error("topic length {0} outside the accepted range of 5 to 100 bytes")]
    InvalidTopic(usize),

    /// A required configuration value was not supplied
    #[error("missing config value: {0}")]
    MissingConfigValue(String),

    /// Crypto primitive error
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Frame encoding/decoding error
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Errors raised by the block-cipher and hash primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encrypting nothing is rejected rather than producing a padding-only block
    #[error("cannot encrypt an empty input")]
    EmptyPlaintext,

    /// Key material must select one of the AES variants
    #[error("unsupported key length {0}, expected 16, 24 or 32 bytes")]
    KeyLength(usize),

    /// Ciphertext must consist of whole cipher blocks
    #[error("ciphertext length {0} is not a multiple of the 16-byte block size")]
    CiphertextNotAligned(usize),
}

/// Errors that may occur while encoding or decoding vispr frames.
///
/// This type is kept small so it can be shared by the marshal and
/// unmarshal paths without dragging in socket or crypto concerns.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The first byte was not the vispr preamble.
    #[error("bad preamble byte 0x{0:02X}, expected 0xEF")]
    BadPreamble(u8),

    /// The last byte was not the end-of-broadcast marker.
    #[error("bad end marker byte 0x{0:02X}, expected 0xFE")]
    BadEndMarker(u8),

    /// The buffer did not contain enough bytes to decode the requested value.
    #[error("unexpected EOF, not enough bytes to read requested field")]
    UnexpectedEof,

    /// The datagram length disagrees with the lengths declared in its header.
    #[error("frame length mismatch: header declares {expected} bytes, datagram has {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A variable-length field does not fit its one-byte length prefix.
    #[error("field length {0} does not fit a one-byte length prefix")]
    FieldTooLong(usize),

    /// Topic bytes were not valid UTF-8.
    #[error("topic bytes are not valid UTF-8")]
    TopicNotUtf8,
}

impl From<io::Error> for FrameError {
    /// Reads during unmarshal run over an in-memory cursor, where the only
    /// possible failure is running out of bytes.
    fn from(_: io::Error) -> Self {
        FrameError::UnexpectedEof
    }
}

pub type Result<T> = std::result::Result<T, VisprError>;
