//! Sealnote Cipher Codec
//!
//! Stateless AES-256-CBC encode/decode over a process-wide 32-byte secret.
//! Tokens are self-describing: `hex(iv):hex(ciphertext)`, with a fresh random
//! IV per encode, so decoding needs only the token and the shared key.

pub mod codec;
pub mod keys;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CipherError {
    /// The configured key is not exactly 32 bytes. Fatal at startup; a key
    /// that passed validation can never produce this at request time.
    #[error("encryption key must be exactly 32 bytes, got {0}")]
    Configuration(usize),

    /// The token cannot be decrypted: bad framing, bad hex, wrong key,
    /// or corrupted/truncated ciphertext.
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),
}
