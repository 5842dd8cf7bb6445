//! Server key material.
//!
//! The server's private scalar is sampled once and kept for the server's
//! lifetime. It is never transmitted and is zeroized on drop. The public point
//! `public = private · G` is not needed by the base OPRF but is kept alongside
//! so a server can publish a stable key identity.

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::group::{PrimeOrderGroup, Ristretto255, ELEMENT_LEN, SCALAR_LEN};
use crate::oprf::{self, BlindedElement, EvaluatedElement};
use crate::{random, OprfError, Result};

/// A server private key: a nonzero scalar.
pub struct PrivateKey<G: PrimeOrderGroup = Ristretto255> {
    scalar: G::Scalar,
}

/// The public point matching a [`PrivateKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey<G: PrimeOrderGroup = Ristretto255> {
    element: G::Element,
}

/// A server key pair.
pub struct KeyPair<G: PrimeOrderGroup = Ristretto255> {
    pub private: PrivateKey<G>,
    pub public: PublicKey<G>,
}

impl<G: PrimeOrderGroup> PrivateKey<G> {
    /// Sample a new private key.
    ///
    /// # Errors
    ///
    /// - [`OprfError::Randomness`] if the randomness source fails
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let scalar = random::nonzero_scalar::<G, R>(rng)?;
        Ok(Self { scalar })
    }

    /// Import a private key from its canonical encoding.
    ///
    /// # Errors
    ///
    /// - [`OprfError::InvalidLength`] if `bytes` is not 32 bytes
    /// - [`OprfError::Decoding`] if the scalar is unreduced or zero
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SCALAR_LEN] =
            bytes.try_into().map_err(|_| OprfError::InvalidLength {
                expected: SCALAR_LEN,
                actual: bytes.len(),
            })?;
        let scalar = G::scalar_from_bytes(&array)
            .filter(|s| !bool::from(G::scalar_is_zero(s)))
            .ok_or(OprfError::Decoding {
                what: "private key",
            })?;
        Ok(Self { scalar })
    }

    /// Export the canonical encoding.
    pub fn to_bytes(&self) -> [u8; SCALAR_LEN] {
        G::scalar_to_bytes(&self.scalar)
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey<G> {
        PublicKey {
            element: G::base_mul(&self.scalar),
        }
    }

    pub(crate) fn scalar(&self) -> &G::Scalar {
        &self.scalar
    }
}

impl<G: PrimeOrderGroup> Drop for PrivateKey<G> {
    fn drop(&mut self) {
        self.scalar.zeroize();
    }
}

impl<G: PrimeOrderGroup> fmt::Debug for PrivateKey<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl<G: PrimeOrderGroup> PublicKey<G> {
    /// Decode and validate a public key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let element = oprf::decode_element::<G>(bytes, "public key")?;
        Ok(Self { element })
    }

    /// Canonical encoding.
    pub fn to_bytes(&self) -> [u8; ELEMENT_LEN] {
        G::element_to_bytes(&self.element)
    }

    /// The underlying group element.
    pub fn element(&self) -> &G::Element {
        &self.element
    }
}

impl<G: PrimeOrderGroup> KeyPair<G> {
    /// Generate a new random key pair.
    ///
    /// # Errors
    ///
    /// - [`OprfError::Randomness`] if the randomness source fails
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let key_pair = Self::from_private_key(PrivateKey::generate(rng)?);
        tracing::debug!(
            group = G::NAME,
            public = %hex::encode(key_pair.public.to_bytes()),
            "generated OPRF key pair"
        );
        Ok(key_pair)
    }

    /// Build a key pair around an existing private key.
    pub fn from_private_key(private: PrivateKey<G>) -> Self {
        let public = private.public_key();
        Self { private, public }
    }

    /// Evaluate a blinded element with this key pair's private key.
    pub fn evaluate(&self, blinded: &BlindedElement<G>) -> EvaluatedElement<G> {
        oprf::evaluate(&self.private, blinded)
    }
}

impl<G: PrimeOrderGroup> fmt::Debug for KeyPair<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private", &self.private)
            .field("public", &self.public)
            .finish()
    }
}
