//! This module is an adapter to the ECC backend.
//! `elliptic_curves` has a somewhat unstable API,
//! and we isolate all the related logic here.

use core::ops::{Add, Mul, Neg, Sub};

use generic_array::GenericArray;
use k256::elliptic_curve::hash2curve::{ExpandMsgXmd, GroupDigest};
use k256::elliptic_curve::sec1::{CompressedPointSize, FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{FieldBytesSize, Group, PrimeField};
use k256::{EncodedPoint, NonZeroScalar, ProjectivePoint, Scalar, Secp256k1};
use rand_core::CryptoRngCore;
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};
use zeroize::DefaultIsZeroes;

use crate::traits::{
    ConstructionError, DeserializableFromArray, RepresentableAsArray, SerializableToArray,
};

pub(crate) type CurveType = Secp256k1;

type BackendScalar = Scalar;
type BackendNonZeroScalar = NonZeroScalar;
type BackendPoint = ProjectivePoint;

/// An element of the scalar field of the curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CurveScalar(BackendScalar);

impl CurveScalar {
    #[cfg(test)]
    pub(crate) fn zero() -> Self {
        Self(BackendScalar::ZERO)
    }

    #[cfg(test)]
    pub(crate) fn one() -> Self {
        Self(BackendScalar::ONE)
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.0.is_zero().into()
    }

    /// Embeds an integer into the field.
    pub(crate) fn from_u64(value: u64) -> Self {
        Self(BackendScalar::from(value))
    }

    /// Generates a random non-zero scalar (in nearly constant-time).
    pub(crate) fn random_nonzero(rng: &mut impl CryptoRngCore) -> Self {
        Self(*BackendNonZeroScalar::random(rng))
    }
}

impl DefaultIsZeroes for CurveScalar {}

impl ConstantTimeEq for CurveScalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl RepresentableAsArray for CurveScalar {
    type Size = FieldBytesSize<CurveType>;
}

impl SerializableToArray for CurveScalar {
    fn to_array(&self) -> GenericArray<u8, Self::Size> {
        self.0.to_bytes()
    }
}

impl DeserializableFromArray for CurveScalar {
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        Option::<BackendScalar>::from(BackendScalar::from_repr(*arr))
            .map(Self)
            .ok_or_else(|| ConstructionError::new("CurveScalar", "Value is out of range"))
    }
}

/// A point on the curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurvePoint(BackendPoint);

impl CurvePoint {
    /// The standard generator of the curve.
    pub fn generator() -> Self {
        Self(BackendPoint::GENERATOR)
    }

    /// The point at infinity.
    pub fn identity() -> Self {
        Self(BackendPoint::IDENTITY)
    }

    /// Returns `true` if this is the point at infinity.
    pub fn is_identity(&self) -> bool {
        self.0.is_identity().into()
    }

    /// Hashes arbitrary data into a point with an unknown discrete log
    /// relative to the standard generator.
    pub(crate) fn from_data(dst: &[u8], data: &[u8]) -> Option<Self> {
        CurveType::hash_from_bytes::<ExpandMsgXmd<Sha256>>(&[data], &[dst])
            .ok()
            .map(Self)
    }
}

impl Default for CurvePoint {
    fn default() -> Self {
        Self::identity()
    }
}

impl Add<&CurveScalar> for &CurveScalar {
    type Output = CurveScalar;

    fn add(self, other: &CurveScalar) -> CurveScalar {
        CurveScalar(self.0.add(&(other.0)))
    }
}

impl Sub<&CurveScalar> for &CurveScalar {
    type Output = CurveScalar;

    fn sub(self, other: &CurveScalar) -> CurveScalar {
        CurveScalar(self.0.sub(&(other.0)))
    }
}

impl Mul<&CurveScalar> for &CurveScalar {
    type Output = CurveScalar;

    fn mul(self, other: &CurveScalar) -> CurveScalar {
        CurveScalar(self.0.mul(&(other.0)))
    }
}

impl Neg for &CurveScalar {
    type Output = CurveScalar;

    fn neg(self) -> CurveScalar {
        CurveScalar(self.0.neg())
    }
}

impl Add<&CurvePoint> for &CurvePoint {
    type Output = CurvePoint;

    fn add(self, other: &CurvePoint) -> CurvePoint {
        CurvePoint(self.0.add(&(other.0)))
    }
}

impl Sub<&CurvePoint> for &CurvePoint {
    type Output = CurvePoint;

    fn sub(self, other: &CurvePoint) -> CurvePoint {
        CurvePoint(self.0.sub(&(other.0)))
    }
}

impl Neg for &CurvePoint {
    type Output = CurvePoint;

    fn neg(self) -> CurvePoint {
        CurvePoint(self.0.neg())
    }
}

impl Mul<&CurveScalar> for &CurvePoint {
    type Output = CurvePoint;

    fn mul(self, other: &CurveScalar) -> CurvePoint {
        CurvePoint(self.0.mul(&(other.0)))
    }
}

impl RepresentableAsArray for CurvePoint {
    type Size = CompressedPointSize<CurveType>;
}

impl SerializableToArray for CurvePoint {
    // SEC1 encodes the identity as a single zero byte,
    // so we pad it with zeros to keep the size fixed.
    fn to_array(&self) -> GenericArray<u8, Self::Size> {
        let mut arr = GenericArray::<u8, Self::Size>::default();
        if !self.is_identity() {
            arr.copy_from_slice(self.0.to_affine().to_encoded_point(true).as_bytes());
        }
        arr
    }
}

impl DeserializableFromArray for CurvePoint {
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        if arr.iter().all(|byte| *byte == 0) {
            return Ok(Self::identity());
        }
        let ep = EncodedPoint::from_bytes(arr.as_slice())
            .map_err(|_| ConstructionError::new("CurvePoint", "Invalid SEC1 encoding"))?;
        Option::<BackendPoint>::from(BackendPoint::from_encoded_point(&ep))
            .map(Self)
            .ok_or_else(|| ConstructionError::new("CurvePoint", "Not a point on the curve"))
    }
}
