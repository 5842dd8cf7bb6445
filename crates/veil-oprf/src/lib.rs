//! # veil-oprf
//!
//! Two-party Oblivious Pseudorandom Function over ristretto255.
//!
//! A client holding a private input `x` and a server holding a private key
//! `sk` jointly compute `F(sk, x) = SHA-512(sk · H(x))[..32]`. The server never
//! sees `x` and the client learns nothing about `sk` beyond the output.
//!
//! ## Protocol Flow
//!
//! 1. Client blinds input: `(blind, blinded) = blind(x, rng)`
//! 2. Server evaluates: `evaluated = evaluate(&key_pair.private, &blinded)`
//! 3. Client finalizes: `output = finalize(blind, &evaluated)`
//!
//! ## Modules
//!
//! - [`group`]: Prime-order group seam and the ristretto255 instantiation
//! - [`keys`]: Server key material
//! - [`hash_to_group`]: Domain-separated mapping from bytes to group elements
//! - [`oprf`]: Blind, evaluate, finalize and the constant-time blinding path
//! - [`random`]: Scalar sampling from an explicitly passed randomness source

pub mod group;
pub mod hash_to_group;
pub mod keys;
pub mod oprf;
pub mod random;

pub use group::{PrimeOrderGroup, Ristretto255};
pub use hash_to_group::{LengthPadding, DEFAULT_CONTEXT, MAX_MIN_BUCKET};
pub use keys::{KeyPair, PrivateKey, PublicKey};
pub use oprf::{
    evaluate, finalize, BlindedElement, BlindingFactor, EvaluatedElement, ProtocolOutput, Suite,
    OUTPUT_LEN,
};

use rand_core::{CryptoRng, RngCore};

/// Error types for OPRF operations.
#[derive(Debug, thiserror::Error)]
pub enum OprfError {
    /// The randomness source failed to produce usable bytes.
    #[error("randomness source failed: {0}")]
    Randomness(String),

    /// The uniform-bytes-to-element mapping rejected a digest.
    #[error("hash-to-group mapping rejected the digest")]
    Mapping,

    /// The blinding factor has no multiplicative inverse.
    #[error("blinding factor is not invertible")]
    Inversion,

    /// Untrusted bytes are not a valid encoding.
    #[error("invalid {what} encoding")]
    Decoding {
        /// What was being decoded.
        what: &'static str,
    },

    /// Byte input of the wrong width.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Domain-separation context is unusable.
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// Length padding for the constant-time path is out of range.
    #[error("invalid padding: {0}")]
    InvalidPadding(String),
}

pub type Result<T> = std::result::Result<T, OprfError>;

/// Blind `input` under the default ristretto255 suite.
///
/// See [`Suite::blind`].
pub fn blind<R: RngCore + CryptoRng>(
    input: &[u8],
    rng: &mut R,
) -> Result<(BlindingFactor<Ristretto255>, BlindedElement<Ristretto255>)> {
    Suite::<Ristretto255>::default().blind(input, rng)
}

/// Blind `input` under the default ristretto255 suite with length-padded hashing.
///
/// See [`Suite::blind_constant_time`].
pub fn blind_constant_time<R: RngCore + CryptoRng>(
    input: &[u8],
    rng: &mut R,
) -> Result<(BlindingFactor<Ristretto255>, BlindedElement<Ristretto255>)> {
    Suite::<Ristretto255>::default().blind_constant_time(input, LengthPadding::default(), rng)
}
