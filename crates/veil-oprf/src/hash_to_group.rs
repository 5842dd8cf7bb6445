//! Domain-separated hashing of arbitrary bytes to group elements.
//!
//! ```text
//! HashToGroup(context, x):
//!   1. digest = SHA-512(BE16(len(context)) || context || x)
//!   2. return MapToGroup(digest)
//! ```
//!
//! The context is length-prefixed so two contexts can never produce the same
//! hashed prefix. The padded variant computes the same digest but also hashes
//! filler up to a length bucket, so hashing time reveals at most the bucket.

use std::hint::black_box;

use sha2::{Digest, Sha512};

use crate::group::{PrimeOrderGroup, WIDE_LEN};
use crate::{OprfError, Result};

/// Default domain-separation context.
pub const DEFAULT_CONTEXT: &[u8] = b"VeilOPRF-v1-ristretto255-SHA512 HashToGroup";

/// Longest context that fits the 16-bit length prefix.
pub const MAX_CONTEXT_LEN: usize = u16::MAX as usize;

/// Largest accepted `min_bucket`. Longer inputs still get their own bucket.
pub const MAX_MIN_BUCKET: usize = 1 << 24;

/// Filler is hashed in chunks of this size.
const PAD_CHUNK: usize = 256;

/// Length bucketing for the constant-time hashing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPadding {
    /// Smallest bucket in bytes. Inputs up to this length take the same time.
    pub min_bucket: usize,
}

impl Default for LengthPadding {
    fn default() -> Self {
        Self { min_bucket: 1024 }
    }
}

impl LengthPadding {
    /// Padding with the given smallest bucket.
    ///
    /// # Errors
    ///
    /// - [`OprfError::InvalidPadding`] if `min_bucket` is zero or above
    ///   [`MAX_MIN_BUCKET`]
    pub fn new(min_bucket: usize) -> Result<Self> {
        let padding = Self { min_bucket };
        padding.validate()?;
        Ok(padding)
    }

    /// Check that `min_bucket` is within `1..=MAX_MIN_BUCKET`.
    pub fn validate(&self) -> Result<()> {
        if self.min_bucket == 0 || self.min_bucket > MAX_MIN_BUCKET {
            return Err(OprfError::InvalidPadding(format!(
                "min_bucket is {}, must be between 1 and {MAX_MIN_BUCKET}",
                self.min_bucket
            )));
        }
        Ok(())
    }

    /// Filler bytes needed to bring `hashed_len` up to its bucket.
    pub fn filler_len(&self, hashed_len: usize) -> usize {
        self.bucket_for(hashed_len).saturating_sub(hashed_len)
    }

    /// Number of bytes the hashing work covers for a message of `len` bytes.
    ///
    /// Buckets are powers of two at or above `min_bucket`.
    pub fn bucket_for(&self, len: usize) -> usize {
        let target = len.max(self.min_bucket);
        target.checked_next_power_of_two().unwrap_or(target)
    }
}

/// Check that `context` is non-empty and fits the length prefix.
pub fn validate_context(context: &[u8]) -> Result<()> {
    if context.is_empty() {
        return Err(OprfError::InvalidContext("context is empty".into()));
    }
    if context.len() > MAX_CONTEXT_LEN {
        return Err(OprfError::InvalidContext(format!(
            "context is {} bytes, at most {MAX_CONTEXT_LEN} allowed",
            context.len()
        )));
    }
    Ok(())
}

/// Map `input` to a group element under `context`.
///
/// # Errors
///
/// - [`OprfError::InvalidContext`] if the context is empty or too long
/// - [`OprfError::Mapping`] if the group rejects the digest; retrying the same
///   input cannot succeed, only a different context can
pub fn hash_to_group<G: PrimeOrderGroup>(context: &[u8], input: &[u8]) -> Result<G::Element> {
    let mut hasher = prefixed_hasher(context)?;
    hasher.update(input);
    map_digest::<G>(hasher)
}

/// Same result as [`hash_to_group`], with hashing time padded to a length bucket.
///
/// # Errors
///
/// As [`hash_to_group`], plus [`OprfError::InvalidPadding`] for an
/// out-of-range `padding`.
pub fn hash_to_group_padded<G: PrimeOrderGroup>(
    context: &[u8],
    input: &[u8],
    padding: LengthPadding,
) -> Result<G::Element> {
    padding.validate()?;
    let mut hasher = prefixed_hasher(context)?;
    for chunk in input.chunks(PAD_CHUNK) {
        hasher.update(chunk);
    }

    let hashed_len = 2 + context.len() + input.len();
    black_box(hash_filler(padding.filler_len(hashed_len)));

    map_digest::<G>(hasher)
}

/// Hash `len` zero bytes into a throwaway digest. Returns the bytes absorbed.
fn hash_filler(len: usize) -> usize {
    let filler = [0u8; PAD_CHUNK];
    let mut dummy = Sha512::new();
    let mut absorbed = 0;
    while absorbed < len {
        let n = (len - absorbed).min(PAD_CHUNK);
        dummy.update(black_box(&filler[..n]));
        absorbed += n;
    }
    black_box(dummy.finalize());
    absorbed
}

fn prefixed_hasher(context: &[u8]) -> Result<Sha512> {
    validate_context(context)?;
    let mut hasher = Sha512::new();
    hasher.update((context.len() as u16).to_be_bytes());
    hasher.update(context);
    Ok(hasher)
}

fn map_digest<G: PrimeOrderGroup>(hasher: Sha512) -> Result<G::Element> {
    let mut wide = [0u8; WIDE_LEN];
    wide.copy_from_slice(&hasher.finalize());
    G::element_from_uniform_bytes(&wide).ok_or_else(|| {
        tracing::warn!(group = G::NAME, "uniform mapping rejected digest");
        OprfError::Mapping
    })
}
