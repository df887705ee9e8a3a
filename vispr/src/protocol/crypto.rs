//! Cipher and hash primitives backing the broadcast authentication tag.
//!
//! The cipher runs AES in ECB mode with zero padding and the hash is MD5.
//! Both choices, including the padding rule, are part of the wire contract
//! shared with deployed listeners and must not change silently.

use crate::error::CryptoError;
use crate::protocol::constants::{BLOCK_SIZE, KEY_LEN};
use aes::cipher::{Block, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use md5::{Digest, Md5};

/// AES variant selected by the byte length of the key material.
///
/// A 16-byte key yields AES-128, 24 bytes AES-192, 32 bytes AES-256. The
/// talker path always uses 16-byte keys; the longer variants exist because
/// the cipher itself is key-length driven.
enum EcbCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl EcbCipher {
    fn new(key: &[u8]) -> Result<Self, CryptoError> {
        match key.len() {
            16 => {
                let mut k = [0u8; 16];
                k.copy_from_slice(key);
                Ok(Self::Aes128(Aes128::new(&k.into())))
            }
            24 => {
                let mut k = [0u8; 24];
                k.copy_from_slice(key);
                Ok(Self::Aes192(Aes192::new(&k.into())))
            }
            32 => {
                let mut k = [0u8; 32];
                k.copy_from_slice(key);
                Ok(Self::Aes256(Aes256::new(&k.into())))
            }
            n => Err(CryptoError::KeyLength(n)),
        }
    }

    fn encrypt_block(&self, chunk: &mut [u8]) {
        match self {
            Self::Aes128(cipher) => cipher.encrypt_block(Block::<Aes128>::from_mut_slice(chunk)),
            Self::Aes192(cipher) => cipher.encrypt_block(Block::<Aes192>::from_mut_slice(chunk)),
            Self::Aes256(cipher) => cipher.encrypt_block(Block::<Aes256>::from_mut_slice(chunk)),
        }
    }

    fn decrypt_block(&self, chunk: &mut [u8]) {
        match self {
            Self::Aes128(cipher) => cipher.decrypt_block(Block::<Aes128>::from_mut_slice(chunk)),
            Self::Aes192(cipher) => cipher.decrypt_block(Block::<Aes192>::from_mut_slice(chunk)),
            Self::Aes256(cipher) => cipher.decrypt_block(Block::<Aes256>::from_mut_slice(chunk)),
        }
    }
}

/// Encrypts the given bytes using AES in ECB mode with zero padding.
///
/// The input is zero-padded up to a 16-byte boundary and each block is
/// encrypted independently; the returned `Vec<u8>` is the ciphertext, whose
/// length is always a multiple of 16 bytes. Rejects empty input and key
/// lengths other than 16, 24 or 32 bytes.
///
/// ECB means identical plaintext blocks always produce identical ciphertext
/// blocks. This is an inherited structural weakness the wire format depends
/// on; listeners break if the mode changes.
pub fn encrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.is_empty() {
        return Err(CryptoError::EmptyPlaintext);
    }
    let cipher = EcbCipher::new(key)?;

    // Zero-pad the final partial block
    let mut padded = data.to_vec();
    let rem = padded.len() % BLOCK_SIZE;
    if rem != 0 {
        padded.resize(padded.len() + (BLOCK_SIZE - rem), 0);
    }

    // Encrypt each block
    for chunk in padded.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block(chunk);
    }

    Ok(padded)
}

/// Decrypts a byte slice that was encrypted with AES-ECB.
///
/// Requires the ciphertext length to be a multiple of 16 bytes. Padding is
/// not stripped: input that was zero-padded by [`encrypt`] comes back with
/// the padding zeros still in place, and the caller is expected to know the
/// original length.
pub fn decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::CiphertextNotAligned(data.len()));
    }
    let cipher = EcbCipher::new(key)?;

    // Decrypt each block
    let mut decrypted = data.to_vec();
    for chunk in decrypted.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(chunk);
    }

    Ok(decrypted)
}

/// Computes the MD5 digest of the provided bytes.
pub fn digest(data: &[u8]) -> [u8; KEY_LEN] {
    let mut hasher = Md5::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut out = [0u8; KEY_LEN];
    out.copy_from_slice(&result);
    out
}

/// Derives a 16-byte pre-shared key from a memorable passphrase.
///
/// This is plain MD5 of the passphrase bytes, matching what provisioning
/// tools on the listener side compute. It is a convenience, not a KDF.
pub fn derive_key(passphrase: &str) -> [u8; KEY_LEN] {
    digest(passphrase.as_bytes())
}
