//! Embedding of small non-negative integers into the group,
//! so that numbers can be ElGamal-encrypted.
//!
//! Encoding is a single scalar multiplication of the generator.
//! Decoding is a brute-force discrete log search and costs `O(n)` group additions,
//! so it is bounded by an explicit limit.

use core::fmt;

use crate::curve::{CurvePoint, CurveScalar};
use crate::params::Parameters;

/// The decoding limit used by [`PointCodec::new`].
pub const DEFAULT_DECODE_LIMIT: u64 = 10_000;

/// Returned when a point is not `g * n` for any `n` within the decoding limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointNotEncodableError {
    /// The limit that was exhausted.
    pub limit: u64,
}

impl fmt::Display for PointNotEncodableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The point does not encode an integer in range [0, {}]",
            self.limit
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PointNotEncodableError {}

/// A bijection between integers in `[0, limit]` and points `g * n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointCodec {
    params: Parameters,
    limit: u64,
}

impl PointCodec {
    /// Creates a codec with [`DEFAULT_DECODE_LIMIT`].
    pub fn new(params: &Parameters) -> Self {
        Self::with_limit(params, DEFAULT_DECODE_LIMIT)
    }

    /// Creates a codec that gives up decoding after `limit`.
    pub fn with_limit(params: &Parameters, limit: u64) -> Self {
        Self {
            params: *params,
            limit,
        }
    }

    /// The parameters this codec maps into.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// The largest value [`decode()`](`Self::decode`) will find.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Maps `value` to `g * value` (the identity for `0`).
    pub fn encode(&self, value: u64) -> CurvePoint {
        if value == 0 {
            return CurvePoint::identity();
        }
        &self.params.g * &CurveScalar::from_u64(value)
    }

    /// Finds `n` such that `encode(n) == point`.
    pub fn decode(&self, point: &CurvePoint) -> Result<u64, PointNotEncodableError> {
        let g = self.params.g;
        let mut current = CurvePoint::identity();
        let mut value = 0u64;
        loop {
            if &current == point {
                return Ok(value);
            }
            if value >= self.limit {
                break;
            }
            current = &current + &g;
            value += 1;
        }

        tracing::warn!(limit = self.limit, "point decoding exhausted its limit");
        Err(PointNotEncodableError { limit: self.limit })
    }
}

#[cfg(test)]
mod tests {

    use rand_core::OsRng;
    use tracing_test::traced_test;

    use super::{PointCodec, PointNotEncodableError, DEFAULT_DECODE_LIMIT};
    use crate::curve::{CurvePoint, CurveScalar};
    use crate::params::Parameters;

    #[test]
    fn test_encode_zero() {
        let codec = PointCodec::new(&Parameters::new());
        assert!(codec.encode(0).is_identity());
        assert_eq!(codec.decode(&CurvePoint::identity()), Ok(0));
    }

    #[test]
    fn test_roundtrip() {
        let codec = PointCodec::new(&Parameters::new());
        for value in [1u64, 2, 3, 42, 255, 1000] {
            assert_eq!(codec.decode(&codec.encode(value)), Ok(value));
        }
        assert_eq!(codec.limit(), DEFAULT_DECODE_LIMIT);
    }

    #[test]
    fn test_encode_is_scalar_multiplication() {
        let params = Parameters::from_label(b"codec").unwrap();
        let codec = PointCodec::new(&params);
        let g = params.generator();
        assert_eq!(codec.encode(1), g);
        assert_eq!(codec.encode(3), &(&g + &g) + &g);
    }

    #[test]
    fn test_limit_boundary() {
        let codec = PointCodec::with_limit(&Parameters::new(), 10);
        assert_eq!(codec.decode(&codec.encode(10)), Ok(10));
        assert_eq!(
            codec.decode(&codec.encode(11)),
            Err(PointNotEncodableError { limit: 10 })
        );
    }

    #[traced_test]
    #[test]
    fn test_not_encodable() {
        let codec = PointCodec::with_limit(&Parameters::new(), 100);
        let point = &CurvePoint::generator() * &CurveScalar::random_nonzero(&mut OsRng);
        assert_eq!(
            codec.decode(&point),
            Err(PointNotEncodableError { limit: 100 })
        );
        assert!(logs_contain("point decoding exhausted its limit"));
    }
}
