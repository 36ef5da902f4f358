use core::fmt;

use generic_array::GenericArray;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::curve::CurvePoint;
use crate::traits::{
    ConstructionError, DeserializableFromArray, RepresentableAsArray, SerializableToArray,
};

#[cfg(feature = "serde")]
use crate::serde_bytes::{deserialize_as_array, serialize_as_array, Encoding};

#[cfg(feature = "default-serialization")]
use crate::{DefaultDeserialize, DefaultSerialize};

/// Domain separation tag for generators derived from a label.
const GENERATOR_DST: &[u8] = b"COLLECTIVE_PRE_GENERATOR";

/// The group instance all keys, ciphertexts and chain states are bound to.
///
/// Every operation takes the parameters explicitly; objects created under one
/// instance are rejected by operations running under another one
/// (see [`CurveMismatchError`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameters {
    pub(crate) g: CurvePoint,
}

impl Parameters {
    /// Creates the parameters using the standard secp256k1 generator.
    pub fn new() -> Self {
        Self {
            g: CurvePoint::generator(),
        }
    }

    /// Creates an independent group instance whose generator is derived from `label`.
    ///
    /// The discrete log of the resulting generator relative to the standard one is unknown.
    /// Returns `None` in the (practically impossible) case of the hash landing on the identity.
    pub fn from_label(label: &[u8]) -> Option<Self> {
        let g = CurvePoint::from_data(GENERATOR_DST, label)?;
        if g.is_identity() {
            return None;
        }
        Some(Self { g })
    }

    /// Returns the generator of this group instance.
    pub fn generator(&self) -> CurvePoint {
        self.g
    }

    pub(crate) fn check(&self, other: &Parameters) -> Result<(), CurveMismatchError> {
        if self == other {
            Ok(())
        } else {
            Err(CurveMismatchError)
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}

impl RepresentableAsArray for Parameters {
    type Size = <CurvePoint as RepresentableAsArray>::Size;
}

impl SerializableToArray for Parameters {
    fn to_array(&self) -> GenericArray<u8, Self::Size> {
        self.g.to_array()
    }
}

impl DeserializableFromArray for Parameters {
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        let g = CurvePoint::from_array(arr)?;
        if g.is_identity() {
            return Err(ConstructionError::new(
                "Parameters",
                "The generator cannot be the identity",
            ));
        }
        Ok(Self { g })
    }
}

#[cfg(feature = "serde")]
impl Serialize for Parameters {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_as_array(self, serializer, Encoding::Hex)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_as_array(deserializer, Encoding::Hex)
    }
}

#[cfg(feature = "default-serialization")]
impl DefaultSerialize for Parameters {}

#[cfg(feature = "default-serialization")]
impl<'de> DefaultDeserialize<'de> for Parameters {}

/// Operands were created under different [`Parameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveMismatchError;

impl fmt::Display for CurveMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operands belong to different group instances")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CurveMismatchError {}
