//! The OPRF protocol operations.
//!
//! ## Algorithm
//!
//! ```text
//! Blind(x; rng):
//!   1. r = wide_reduce(rng(64)), r != 0
//!   2. P = HashToGroup(context, x)
//!   3. return (r, r·P)
//!
//! Evaluate(sk, B):
//!   1. return sk·B
//!
//! Finalize(r, Z):
//!   1. N = r⁻¹·Z                        (= sk·P)
//!   2. return SHA-512(Encode(N))[..32]
//! ```
//!
//! `BlindedElement` and `EvaluatedElement` are the only values that cross the
//! client/server boundary; both encode as canonical 32-byte points and are
//! validated on decode before any scalar multiplication can touch them.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::group::{PrimeOrderGroup, Ristretto255, ELEMENT_LEN, SCALAR_LEN};
use crate::hash_to_group::{self, LengthPadding, DEFAULT_CONTEXT};
use crate::keys::PrivateKey;
use crate::{random, OprfError, Result};

/// Protocol output width. SHA-512 output truncated to its first half.
pub const OUTPUT_LEN: usize = 32;

/// Client-held blinding scalar. Single use: [`finalize`] consumes it.
pub struct BlindingFactor<G: PrimeOrderGroup = Ristretto255> {
    scalar: G::Scalar,
}

/// Blinded input sent from client to server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlindedElement<G: PrimeOrderGroup = Ristretto255> {
    element: G::Element,
}

/// Server response sent back to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluatedElement<G: PrimeOrderGroup = Ristretto255> {
    element: G::Element,
}

/// The 32-byte pseudorandom output. `Debug` does not print it; use
/// [`ProtocolOutput::as_bytes`] or [`ProtocolOutput::to_hex`].
#[derive(Clone, Copy)]
pub struct ProtocolOutput {
    bytes: [u8; OUTPUT_LEN],
}

/// A group together with its domain-separation context.
#[derive(Clone, Debug)]
pub struct Suite<G: PrimeOrderGroup = Ristretto255> {
    context: Cow<'static, [u8]>,
    _group: PhantomData<G>,
}

impl<G: PrimeOrderGroup> Default for Suite<G> {
    fn default() -> Self {
        Self {
            context: Cow::Borrowed(DEFAULT_CONTEXT),
            _group: PhantomData,
        }
    }
}

impl<G: PrimeOrderGroup> Suite<G> {
    /// Use an application-specific domain-separation context.
    ///
    /// # Errors
    ///
    /// - [`OprfError::InvalidContext`] if the context is empty or too long
    pub fn with_context(context: impl Into<Vec<u8>>) -> Result<Self> {
        let context = context.into();
        hash_to_group::validate_context(&context)?;
        tracing::debug!(group = G::NAME, context_len = context.len(), "configured OPRF suite");
        Ok(Self {
            context: Cow::Owned(context),
            _group: PhantomData,
        })
    }

    /// The domain-separation context.
    pub fn context(&self) -> &[u8] {
        &self.context
    }

    /// Map `input` to a group element under this suite's context.
    pub fn hash_to_group(&self, input: &[u8]) -> Result<G::Element> {
        hash_to_group::hash_to_group::<G>(&self.context, input)
    }

    /// Client-side: blind `input` for evaluation.
    ///
    /// Returns the blinding factor, which stays with the client, and the
    /// blinded element to send to the server. A fresh factor is drawn on
    /// every call.
    ///
    /// # Errors
    ///
    /// - [`OprfError::Randomness`] if the randomness source fails
    /// - [`OprfError::Mapping`] if hash-to-group rejects the input
    pub fn blind<R: RngCore + CryptoRng>(
        &self,
        input: &[u8],
        rng: &mut R,
    ) -> Result<(BlindingFactor<G>, BlindedElement<G>)> {
        let blind = BlindingFactor {
            scalar: random::nonzero_scalar::<G, R>(rng)?,
        };
        let point = self.hash_to_group(input)?;
        Ok(blind_point(blind, &point))
    }

    /// Client-side: [`Suite::blind`] without input-length timing leakage.
    ///
    /// Produces exactly the element [`Suite::blind`] would for the same factor,
    /// so outputs finalize identically. Hashing covers `padding`'s length
    /// bucket, so elapsed time reveals only the bucket. Sampling, mapping and
    /// multiplication are constant-time in both paths.
    ///
    /// # Errors
    ///
    /// As [`Suite::blind`], plus [`OprfError::InvalidPadding`] for an
    /// out-of-range `padding`.
    pub fn blind_constant_time<R: RngCore + CryptoRng>(
        &self,
        input: &[u8],
        padding: LengthPadding,
        rng: &mut R,
    ) -> Result<(BlindingFactor<G>, BlindedElement<G>)> {
        let blind = BlindingFactor {
            scalar: random::nonzero_scalar::<G, R>(rng)?,
        };
        let point = hash_to_group::hash_to_group_padded::<G>(&self.context, input, padding)?;
        Ok(blind_point(blind, &point))
    }

    /// Compute `F(sk, input)` directly, without blinding.
    ///
    /// Equivalent to a full blind/evaluate/finalize run but without the
    /// privacy guarantees; only a key holder can call it.
    pub fn evaluate_direct(&self, key: &PrivateKey<G>, input: &[u8]) -> Result<ProtocolOutput> {
        let point = self.hash_to_group(input)?;
        Ok(ProtocolOutput::derive::<G>(&G::scalar_mul(
            key.scalar(),
            &point,
        )))
    }
}

fn blind_point<G: PrimeOrderGroup>(
    blind: BlindingFactor<G>,
    point: &G::Element,
) -> (BlindingFactor<G>, BlindedElement<G>) {
    let blinded = BlindedElement {
        element: G::scalar_mul(&blind.scalar, point),
    };
    (blind, blinded)
}

/// Server-side: evaluate a blinded element, `sk · blinded`.
///
/// Pure and infallible; `blinded` was validated when it was decoded.
pub fn evaluate<G: PrimeOrderGroup>(
    key: &PrivateKey<G>,
    blinded: &BlindedElement<G>,
) -> EvaluatedElement<G> {
    EvaluatedElement {
        element: G::scalar_mul(key.scalar(), &blinded.element),
    }
}

/// Client-side: remove the blinding and derive the output.
///
/// # Errors
///
/// - [`OprfError::Inversion`] if the blinding factor is zero
pub fn finalize<G: PrimeOrderGroup>(
    blind: BlindingFactor<G>,
    evaluated: &EvaluatedElement<G>,
) -> Result<ProtocolOutput> {
    let inverse = G::invert_scalar(&blind.scalar).ok_or_else(|| {
        tracing::error!("finalize called with a zero blinding factor");
        OprfError::Inversion
    })?;
    let inverse = Zeroizing::new(inverse);
    let unblinded = G::scalar_mul(&inverse, &evaluated.element);
    Ok(ProtocolOutput::derive::<G>(&unblinded))
}

/// Decode untrusted bytes into a validated element.
pub(crate) fn decode_element<G: PrimeOrderGroup>(
    bytes: &[u8],
    what: &'static str,
) -> Result<G::Element> {
    let array: [u8; ELEMENT_LEN] = bytes.try_into().map_err(|_| OprfError::InvalidLength {
        expected: ELEMENT_LEN,
        actual: bytes.len(),
    })?;
    G::element_from_bytes(&array).ok_or_else(|| {
        tracing::warn!(group = G::NAME, what, "rejected invalid element encoding");
        OprfError::Decoding { what }
    })
}

impl<G: PrimeOrderGroup> BlindingFactor<G> {
    /// Restore a blinding factor from its canonical encoding.
    ///
    /// Zero is accepted here and rejected by [`finalize`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SCALAR_LEN] = bytes.try_into().map_err(|_| OprfError::InvalidLength {
            expected: SCALAR_LEN,
            actual: bytes.len(),
        })?;
        let scalar = G::scalar_from_bytes(&array).ok_or(OprfError::Decoding {
            what: "blinding factor",
        })?;
        Ok(Self { scalar })
    }

    /// Canonical encoding. The client must keep it private.
    pub fn to_bytes(&self) -> [u8; SCALAR_LEN] {
        G::scalar_to_bytes(&self.scalar)
    }
}

impl<G: PrimeOrderGroup> Drop for BlindingFactor<G> {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl<G: PrimeOrderGroup> fmt::Debug for BlindingFactor<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlindingFactor(<redacted>)")
    }
}

impl<G: PrimeOrderGroup> BlindedElement<G> {
    /// Decode and validate a blinded element received from a client.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let element = decode_element::<G>(bytes, "blinded element")?;
        Ok(Self { element })
    }

    /// Canonical encoding.
    pub fn to_bytes(&self) -> [u8; ELEMENT_LEN] {
        G::element_to_bytes(&self.element)
    }
}

impl<G: PrimeOrderGroup> EvaluatedElement<G> {
    /// Decode and validate an evaluated element received from a server.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let element = decode_element::<G>(bytes, "evaluated element")?;
        Ok(Self { element })
    }

    /// Canonical encoding.
    pub fn to_bytes(&self) -> [u8; ELEMENT_LEN] {
        G::element_to_bytes(&self.element)
    }
}

impl ProtocolOutput {
    fn derive<G: PrimeOrderGroup>(element: &G::Element) -> Self {
        let digest = Sha512::digest(G::element_to_bytes(element));
        let mut bytes = [0u8; OUTPUT_LEN];
        bytes.copy_from_slice(&digest[..OUTPUT_LEN]);
        Self { bytes }
    }

    /// Raw output bytes.
    pub fn as_bytes(&self) -> &[u8; OUTPUT_LEN] {
        &self.bytes
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl PartialEq for ProtocolOutput {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for ProtocolOutput {}

impl fmt::Debug for ProtocolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProtocolOutput(<redacted>)")
    }
}
