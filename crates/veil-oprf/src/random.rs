//! Scalar sampling from a caller-supplied randomness source.
//!
//! Every operation that needs randomness takes an explicit `RngCore + CryptoRng`
//! so tests can pass a seeded generator and production code passes `OsRng`.
//! Sampling draws [`WIDE_LEN`] bytes and wide-reduces them, which keeps the
//! modulo bias negligible.

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::group::{PrimeOrderGroup, WIDE_LEN};
use crate::{OprfError, Result};

/// Fill `buf` from `rng`, reporting source failures instead of panicking.
pub fn fill<R: RngCore + CryptoRng>(rng: &mut R, buf: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(buf).map_err(|e| {
        tracing::error!(error = %e, "randomness source failed");
        OprfError::Randomness(e.to_string())
    })
}

/// Sample a uniformly distributed nonzero scalar.
///
/// A zero result from 64 uniform bytes has probability ~2^-252; seeing one
/// means the source is broken, so it is reported rather than resampled.
pub fn nonzero_scalar<G: PrimeOrderGroup, R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<G::Scalar> {
    let mut wide = Zeroizing::new([0u8; WIDE_LEN]);
    fill(rng, &mut wide[..])?;
    let scalar = G::scalar_from_wide_bytes(&wide);
    if bool::from(G::scalar_is_zero(&scalar)) {
        return Err(OprfError::Randomness(
            "randomness source produced a zero scalar".into(),
        ));
    }
    Ok(scalar)
}


#[cfg(test)]
mod tests {
    use super::test_rng::{FailingRng, ZeroRng};
    use super::*;
    use crate::group::Ristretto255;
    use rand::rngs::{OsRng, StdRng};
    use rand::SeedableRng;

    #[test]
    fn test_sampling_is_fresh() {
        let a = nonzero_scalar::<Ristretto255, _>(&mut OsRng).expect("sample");
        let b = nonzero_scalar::<Ristretto255, _>(&mut OsRng).expect("sample");
        assert_ne!(a, b);
    }

    #[test]
    fn test_seeded_sampling_reproducible() {
        let a = nonzero_scalar::<Ristretto255, _>(&mut StdRng::seed_from_u64(9)).expect("sample");
        let b = nonzero_scalar::<Ristretto255, _>(&mut StdRng::seed_from_u64(9)).expect("sample");
        assert_eq!(a, b);
    }

    #[test]
    fn test_failing_source_propagates() {
        let result = nonzero_scalar::<Ristretto255, _>(&mut FailingRng);
        assert!(matches!(result, Err(OprfError::Randomness(_))));
    }

    #[test]
    fn test_zero_scalar_rejected() {
        let result = nonzero_scalar::<Ristretto255, _>(&mut ZeroRng);
        assert!(matches!(result, Err(OprfError::Randomness(_))));
    }
}
