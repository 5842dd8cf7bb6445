//! Prime-order group seam.
//!
//! The protocol only needs a handful of group operations, collected in
//! [`PrimeOrderGroup`]. Curve arithmetic itself comes from `curve25519-dalek`;
//! [`Ristretto255`] adapts it to the trait. Every operation here is
//! constant-time with respect to scalars, as provided by the backing library.

use std::fmt;

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Canonical element encoding width.
pub const ELEMENT_LEN: usize = 32;

/// Canonical scalar encoding width.
pub const SCALAR_LEN: usize = 32;

/// Width of the uniform byte strings fed to wide reduction and element mapping.
pub const WIDE_LEN: usize = 64;

/// Operations the OPRF consumes from a prime-order group with 32-byte encodings.
pub trait PrimeOrderGroup: Copy + fmt::Debug + Send + Sync + 'static {
    /// Element of the scalar field.
    type Scalar: Copy + Zeroize + ConstantTimeEq + Send + Sync;

    /// Element of the prime-order group.
    type Element: Copy + Eq + ConstantTimeEq + fmt::Debug + Send + Sync;

    /// Human-readable group name.
    const NAME: &'static str;

    /// Reduce 64 uniform bytes to a scalar with negligible bias.
    fn scalar_from_wide_bytes(bytes: &[u8; WIDE_LEN]) -> Self::Scalar;

    /// Decode a canonical scalar. Returns `None` for unreduced encodings.
    fn scalar_from_bytes(bytes: &[u8; SCALAR_LEN]) -> Option<Self::Scalar>;

    /// Canonical scalar encoding.
    fn scalar_to_bytes(scalar: &Self::Scalar) -> [u8; SCALAR_LEN];

    /// Constant-time zero test.
    fn scalar_is_zero(scalar: &Self::Scalar) -> Choice;

    /// Multiplicative inverse, `None` for zero.
    fn invert_scalar(scalar: &Self::Scalar) -> Option<Self::Scalar>;

    /// `scalar · element`
    fn scalar_mul(scalar: &Self::Scalar, element: &Self::Element) -> Self::Element;

    /// `scalar · G` for the fixed generator `G`.
    fn base_mul(scalar: &Self::Scalar) -> Self::Element;

    /// Map 64 uniform bytes to an element indistinguishable from random.
    ///
    /// Groups whose mapping is partial return `None` for rejected inputs.
    fn element_from_uniform_bytes(bytes: &[u8; WIDE_LEN]) -> Option<Self::Element>;

    /// Canonical element encoding.
    fn element_to_bytes(element: &Self::Element) -> [u8; ELEMENT_LEN];

    /// Decode and validate an untrusted element.
    ///
    /// Rejects non-canonical encodings, points outside the prime-order group
    /// and the identity.
    fn element_from_bytes(bytes: &[u8; ELEMENT_LEN]) -> Option<Self::Element>;
}

/// The ristretto255 group (RFC 9496) over Curve25519.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ristretto255;

impl PrimeOrderGroup for Ristretto255 {
    type Scalar = Scalar;
    type Element = RistrettoPoint;

    const NAME: &'static str = "ristretto255";

    fn scalar_from_wide_bytes(bytes: &[u8; WIDE_LEN]) -> Scalar {
        Scalar::from_bytes_mod_order_wide(bytes)
    }

    fn scalar_from_bytes(bytes: &[u8; SCALAR_LEN]) -> Option<Scalar> {
        Option::from(Scalar::from_canonical_bytes(*bytes))
    }

    fn scalar_to_bytes(scalar: &Scalar) -> [u8; SCALAR_LEN] {
        scalar.to_bytes()
    }

    fn scalar_is_zero(scalar: &Scalar) -> Choice {
        scalar.ct_eq(&Scalar::ZERO)
    }

    fn invert_scalar(scalar: &Scalar) -> Option<Scalar> {
        if bool::from(Self::scalar_is_zero(scalar)) {
            return None;
        }
        Some(scalar.invert())
    }

    fn scalar_mul(scalar: &Scalar, element: &RistrettoPoint) -> RistrettoPoint {
        element * scalar
    }

    fn base_mul(scalar: &Scalar) -> RistrettoPoint {
        RistrettoPoint::mul_base(scalar)
    }

    fn element_from_uniform_bytes(bytes: &[u8; WIDE_LEN]) -> Option<RistrettoPoint> {
        Some(RistrettoPoint::from_uniform_bytes(bytes))
    }

    fn element_to_bytes(element: &RistrettoPoint) -> [u8; ELEMENT_LEN] {
        element.compress().to_bytes()
    }

    fn element_from_bytes(bytes: &[u8; ELEMENT_LEN]) -> Option<RistrettoPoint> {
        CompressedRistretto(*bytes)
            .decompress()
            .filter(|point| *point != RistrettoPoint::identity())
    }
}

#[cfg(test)]
pub(crate) mod test_group {
    use super::*;

    /// ristretto255 with a uniform mapping that rejects every digest.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RejectingGroup;

    impl PrimeOrderGroup for RejectingGroup {
        type Scalar = Scalar;
        type Element = RistrettoPoint;

        const NAME: &'static str = "rejecting-ristretto255";

        fn scalar_from_wide_bytes(bytes: &[u8; WIDE_LEN]) -> Scalar {
            Ristretto255::scalar_from_wide_bytes(bytes)
        }

        fn scalar_from_bytes(bytes: &[u8; SCALAR_LEN]) -> Option<Scalar> {
            Ristretto255::scalar_from_bytes(bytes)
        }

        fn scalar_to_bytes(scalar: &Scalar) -> [u8; SCALAR_LEN] {
            Ristretto255::scalar_to_bytes(scalar)
        }

        fn scalar_is_zero(scalar: &Scalar) -> Choice {
            Ristretto255::scalar_is_zero(scalar)
        }

        fn invert_scalar(scalar: &Scalar) -> Option<Scalar> {
            Ristretto255::invert_scalar(scalar)
        }

        fn scalar_mul(scalar: &Scalar, element: &RistrettoPoint) -> RistrettoPoint {
            Ristretto255::scalar_mul(scalar, element)
        }

        fn base_mul(scalar: &Scalar) -> RistrettoPoint {
            Ristretto255::base_mul(scalar)
        }

        fn element_from_uniform_bytes(_bytes: &[u8; WIDE_LEN]) -> Option<RistrettoPoint> {
            None
        }

        fn element_to_bytes(element: &RistrettoPoint) -> [u8; ELEMENT_LEN] {
            Ristretto255::element_to_bytes(element)
        }

        fn element_from_bytes(bytes: &[u8; ELEMENT_LEN]) -> Option<RistrettoPoint> {
            Ristretto255::element_from_bytes(bytes)
        }
    }
}
