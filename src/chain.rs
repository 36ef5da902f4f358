//! Proxy re-encryption of a ciphertext for the collective key
//! into a ciphertext for a delegate's key.
//!
//! Every node of the collective applies one [`ReencryptionState::step`] with its own secret key.
//! Each step strips that node's share of the blinding (always against the *original* `c1`)
//! and adds a fresh blinding for the delegate. After all the nodes have stepped,
//! [`ReencryptionState::finish`] yields an ordinary [`Ciphertext`] for the delegate.
//!
//! The chain cannot detect being run with the wrong set of nodes
//! (a missing, extra or duplicated node, or a collective key that does not match the nodes).
//! The delegate then silently decrypts an unrelated point.

use core::fmt;

use generic_array::sequence::Concat;
use generic_array::GenericArray;
use rand_core::CryptoRngCore;
use typenum::op;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::curve::{CurvePoint, CurveScalar};
use crate::elgamal::Ciphertext;
use crate::keys::{PublicKey, SecretKey};
use crate::params::{CurveMismatchError, Parameters};
use crate::secret_box::SecretBox;
use crate::traits::{
    ConstructionError, DeserializableFromArray, RepresentableAsArray, SerializableToArray,
};

#[cfg(feature = "serde")]
use crate::serde_bytes::{deserialize_as_array, serialize_as_array, Encoding};

#[cfg(feature = "default-serialization")]
use crate::{DefaultDeserialize, DefaultSerialize};

/// Errors that can happen during re-encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReencryptionError {
    /// The chain was finished without any node stepping.
    EmptyChain,
    /// The ciphertext or the delegate key belongs to a different group instance.
    CurveMismatch(CurveMismatchError),
}

impl fmt::Display for ReencryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyChain => write!(f, "The re-encryption chain has no nodes"),
            Self::CurveMismatch(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReencryptionError {}

impl From<CurveMismatchError> for ReencryptionError {
    fn from(err: CurveMismatchError) -> Self {
        Self::CurveMismatch(err)
    }
}

/// The message passed from one node of the chain to the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReencryptionState {
    params: Parameters,
    original_c1: CurvePoint,
    rerandomized_c1: CurvePoint,
    c2: CurvePoint,
    delegate: PublicKey,
    steps: u32,
}

impl ReencryptionState {
    /// Starts a chain re-encrypting `ciphertext` for `delegate`.
    pub fn new(
        params: &Parameters,
        ciphertext: &Ciphertext,
        delegate: &PublicKey,
    ) -> Result<Self, CurveMismatchError> {
        params.check(ciphertext.params())?;
        params.check(delegate.params())?;
        Ok(Self {
            params: *params,
            original_c1: ciphertext.c1,
            rerandomized_c1: CurvePoint::identity(),
            c2: ciphertext.c2,
            delegate: *delegate,
            steps: 0,
        })
    }

    /// Applies the step of the node owning `sk`, using the given RNG.
    ///
    /// `self` is left untouched, so a node can retry sending the result
    /// without recomputing it.
    pub fn step_with_rng(&self, rng: &mut impl CryptoRngCore, sk: &SecretKey) -> Self {
        let partial = &self.original_c1 * sk.to_secret_scalar().as_secret();
        let s = SecretBox::new(CurveScalar::random_nonzero(rng));

        let rerandomized_c1 = &self.rerandomized_c1 + &(&self.params.g * s.as_secret());
        let c2 = &(&self.c2 - &partial) + &(&self.delegate.point * s.as_secret());
        let steps = self.steps.saturating_add(1);

        tracing::trace!(step = steps, "applied a re-encryption step");

        Self {
            rerandomized_c1,
            c2,
            steps,
            ..*self
        }
    }

    /// Applies the step of the node owning `sk`, using the default RNG.
    #[cfg(feature = "default-rng")]
    pub fn step(&self, sk: &SecretKey) -> Self {
        self.step_with_rng(&mut OsRng, sk)
    }

    /// The number of nodes that have stepped so far.
    pub fn steps_completed(&self) -> u32 {
        self.steps
    }

    /// The key the chain re-encrypts for.
    pub fn delegate(&self) -> &PublicKey {
        &self.delegate
    }

    /// Ends the chain, returning a ciphertext for the delegate.
    pub fn finish(self) -> Result<Ciphertext, ReencryptionError> {
        if self.steps == 0 {
            return Err(ReencryptionError::EmptyChain);
        }
        Ok(Ciphertext {
            params: self.params,
            c1: self.rerandomized_c1,
            c2: self.c2,
        })
    }
}

type ParametersSize = <Parameters as RepresentableAsArray>::Size;
type PointSize = <CurvePoint as RepresentableAsArray>::Size;
type StepsSize = <u32 as RepresentableAsArray>::Size;

impl RepresentableAsArray for ReencryptionState {
    type Size = op!(ParametersSize + PointSize + PointSize + PointSize + PointSize + StepsSize);
}

impl SerializableToArray for ReencryptionState {
    fn to_array(&self) -> GenericArray<u8, Self::Size> {
        self.params
            .to_array()
            .concat(self.original_c1.to_array())
            .concat(self.rerandomized_c1.to_array())
            .concat(self.c2.to_array())
            .concat(self.delegate.point.to_array())
            .concat(self.steps.to_array())
    }
}

impl DeserializableFromArray for ReencryptionState {
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        let (params, rest) = Parameters::take(*arr)?;
        let (original_c1, rest) = CurvePoint::take(rest)?;
        let (rerandomized_c1, rest) = CurvePoint::take(rest)?;
        let (c2, rest) = CurvePoint::take(rest)?;
        let (delegate_point, rest) = CurvePoint::take(rest)?;
        let steps = u32::take_last(rest)?;
        if delegate_point.is_identity() {
            return Err(ConstructionError::new(
                "ReencryptionState",
                "The delegate key cannot be the identity",
            ));
        }
        Ok(Self {
            params,
            original_c1,
            rerandomized_c1,
            c2,
            delegate: PublicKey {
                params,
                point: delegate_point,
            },
            steps,
        })
    }
}

#[cfg(feature = "serde")]
impl Serialize for ReencryptionState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_as_array(self, serializer, Encoding::Hex)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ReencryptionState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_as_array(deserializer, Encoding::Hex)
    }
}

#[cfg(feature = "default-serialization")]
impl DefaultSerialize for ReencryptionState {}

#[cfg(feature = "default-serialization")]
impl<'de> DefaultDeserialize<'de> for ReencryptionState {}

/// Runs a whole chain in one place, using the given RNG.
///
/// `node_keys` must be the secret keys of exactly the nodes whose public keys
/// were aggregated into the key `ciphertext` was created for. Their order does not matter.
pub fn reencrypt_with_rng<'a>(
    rng: &mut impl CryptoRngCore,
    params: &Parameters,
    ciphertext: &Ciphertext,
    node_keys: impl IntoIterator<Item = &'a SecretKey>,
    delegate: &PublicKey,
) -> Result<Ciphertext, ReencryptionError> {
    let initial = ReencryptionState::new(params, ciphertext, delegate)?;
    tracing::debug!("starting a re-encryption chain");

    let state = node_keys
        .into_iter()
        .fold(initial, |state, sk| state.step_with_rng(rng, sk));

    tracing::debug!(
        steps = state.steps_completed(),
        "finished a re-encryption chain"
    );
    state.finish()
}

/// Runs a whole chain in one place, using the default RNG.
#[cfg(feature = "default-rng")]
pub fn reencrypt<'a>(
    params: &Parameters,
    ciphertext: &Ciphertext,
    node_keys: impl IntoIterator<Item = &'a SecretKey>,
    delegate: &PublicKey,
) -> Result<Ciphertext, ReencryptionError> {
    reencrypt_with_rng(&mut OsRng, params, ciphertext, node_keys, delegate)
}
