use core::fmt;

use generic_array::sequence::Concat;
use generic_array::GenericArray;
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use typenum::op;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::curve::{CurvePoint, CurveScalar};
use crate::params::Parameters;
use crate::secret_box::SecretBox;
use crate::traits::{
    ConstructionError, DeserializableFromArray, RepresentableAsArray, SerializableToArray,
};

#[cfg(feature = "serde")]
use crate::serde_bytes::{deserialize_as_array, serialize_as_array, Encoding};

#[cfg(feature = "default-serialization")]
use crate::{DefaultDeserialize, DefaultSerialize};

type ScalarSize = <CurveScalar as RepresentableAsArray>::Size;

/// A secret key: a non-zero scalar.
///
/// Held by exactly one node and zeroized on drop.
#[derive(Clone)] // No Debug derivation, to avoid exposing the key accidentally.
pub struct SecretKey(SecretBox<CurveScalar>);

impl SecretKey {
    /// Generates a secret key using the given RNG and returns it.
    pub fn random_with_rng(rng: &mut impl CryptoRngCore) -> Self {
        Self(SecretBox::new(CurveScalar::random_nonzero(rng)))
    }

    /// Generates a secret key using the default RNG and returns it.
    #[cfg(feature = "default-rng")]
    pub fn random() -> Self {
        Self::random_with_rng(&mut OsRng)
    }

    /// Returns the public key `g * self` in the given group instance.
    pub fn public_key(&self, params: &Parameters) -> PublicKey {
        PublicKey {
            params: *params,
            point: &params.g * self.0.as_secret(),
        }
    }

    pub(crate) fn to_secret_scalar(&self) -> &SecretBox<CurveScalar> {
        &self.0
    }

    /// Serializes the key for node-local storage.
    ///
    /// The result must never leave the node owning the key.
    pub fn to_secret_array(&self) -> SecretBox<GenericArray<u8, ScalarSize>> {
        SecretBox::new(self.0.as_secret().to_array())
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_secret().ct_eq(other.0.as_secret()).into()
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey:...")
    }
}

impl RepresentableAsArray for SecretKey {
    type Size = ScalarSize;
}

impl DeserializableFromArray for SecretKey {
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        let scalar = CurveScalar::from_array(arr)?;
        if scalar.is_zero() {
            return Err(ConstructionError::new("SecretKey", "The key cannot be zero"));
        }
        Ok(Self(SecretBox::new(scalar)))
    }
}

/// A public key `g * secret`, tagged with the group instance it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) params: Parameters,
    pub(crate) point: CurvePoint,
}

impl PublicKey {
    /// The group instance this key belongs to.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// The underlying curve point.
    pub fn to_point(&self) -> CurvePoint {
        self.point
    }
}

type ParametersSize = <Parameters as RepresentableAsArray>::Size;
type PointSize = <CurvePoint as RepresentableAsArray>::Size;

impl RepresentableAsArray for PublicKey {
    type Size = op!(ParametersSize + PointSize);
}

impl SerializableToArray for PublicKey {
    fn to_array(&self) -> GenericArray<u8, Self::Size> {
        self.params.to_array().concat(self.point.to_array())
    }
}

impl DeserializableFromArray for PublicKey {
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        let (params, rest) = Parameters::take(*arr)?;
        let point = CurvePoint::take_last(rest)?;
        if point.is_identity() {
            return Err(ConstructionError::new("PublicKey", "The key cannot be the identity"));
        }
        Ok(Self { params, point })
    }
}

#[cfg(feature = "serde")]
impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_as_array(self, serializer, Encoding::Hex)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_as_array(deserializer, Encoding::Hex)
    }
}

#[cfg(feature = "default-serialization")]
impl DefaultSerialize for PublicKey {}

#[cfg(feature = "default-serialization")]
impl<'de> DefaultDeserialize<'de> for PublicKey {}

/// A node's key pair. Invariant: `public == g * secret`.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generates a fresh key pair in the given group instance using the given RNG.
    pub fn generate_with_rng(rng: &mut impl CryptoRngCore, params: &Parameters) -> Self {
        Self::from_secret_key(params, SecretKey::random_with_rng(rng))
    }

    /// Generates a fresh key pair in the given group instance using the default RNG.
    #[cfg(feature = "default-rng")]
    pub fn generate(params: &Parameters) -> Self {
        Self::generate_with_rng(&mut OsRng, params)
    }

    /// Wraps an existing secret key.
    pub fn from_secret_key(params: &Parameters, secret: SecretKey) -> Self {
        let public = secret.public_key(params);
        Self { secret, public }
    }

    /// The secret half. Must not leave the node that generated it.
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// The public half.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}
