//! Authentication tag for broadcast frames.
//!
//! The tag is a hash-then-encrypt construction: MD5 over the concatenated
//! frame fields, then one AES block encryption of the digest under the
//! pre-shared key. It is not a standards-track MAC; the exact field order
//! and encoding are frozen because deployed listeners recompute it
//! byte-for-byte. The framing layer treats the tag as an opaque 16-byte
//! value, so a stronger construction can replace this one without touching
//! the codec.

use crate::error::CryptoError;
use crate::protocol::constants::{FLAG_RESERVED, KEY_LEN, MAC_LEN};
use crate::protocol::crypto;

/// Computes the 16-byte authentication tag for one broadcast.
///
/// The digest input is, in order: the reserved flag byte, the uid as two
/// little-endian bytes, the counter as eight little-endian bytes, the raw
/// topic bytes and the raw message bytes. Neither variable-length field
/// carries a length prefix at this stage. The digest is then encrypted as
/// exactly one cipher block, so no padding enters the tag.
pub fn compute_tag(
    key: &[u8; KEY_LEN],
    uid: u16,
    counter: u64,
    topic: &str,
    message: &[u8],
) -> Result<[u8; MAC_LEN], CryptoError> {
    let mut preimage = Vec::with_capacity(11 + topic.len() + message.len());
    preimage.push(FLAG_RESERVED);
    preimage.extend_from_slice(&uid.to_le_bytes());
    preimage.extend_from_slice(&counter.to_le_bytes());
    preimage.extend_from_slice(topic.as_bytes());
    preimage.extend_from_slice(message);

    let digest = crypto::digest(&preimage);
    let encrypted = crypto::encrypt(key, &digest)?;

    let mut tag = [0u8; MAC_LEN];
    tag.copy_from_slice(&encrypted);
    Ok(tag)
}

/// Recomputes the tag for the given fields and compares it to `expected`.
///
/// Listener-side helper; returns `false` on any mismatch or if the key
/// material is unusable.
pub fn verify_tag(
    key: &[u8; KEY_LEN],
    uid: u16,
    counter: u64,
    topic: &str,
    message: &[u8],
    expected: &[u8; MAC_LEN],
) -> bool {
    match compute_tag(key, uid, counter, topic, message) {
        Ok(tag) => &tag == expected,
        Err(_) => false,
    }
}
