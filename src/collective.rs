//! Aggregation of independent node public keys into a collective public key.
//!
//! The collective key is `Σ pub_i`. Its secret counterpart `Σ secret_i` is never
//! computed by anyone: decrypting requires every node to take part in a
//! re-encryption chain (see [`ReencryptionState`](crate::ReencryptionState)).

use alloc::vec::Vec;
use core::fmt;

use rand_core::CryptoRngCore;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;

use crate::curve::CurvePoint;
use crate::keys::{KeyPair, PublicKey};
use crate::params::{CurveMismatchError, Parameters};

/// Errors that can happen when aggregating public keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationError {
    /// No public keys were given.
    EmptyKeySet,
    /// One of the keys belongs to a different group instance.
    CurveMismatch(CurveMismatchError),
    /// The keys sum to the identity, which would encrypt in the clear.
    IdentityKey,
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKeySet => write!(f, "Cannot aggregate an empty set of public keys"),
            Self::CurveMismatch(err) => write!(f, "{}", err),
            Self::IdentityKey => write!(f, "The public keys sum to the identity"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AggregationError {}

impl From<CurveMismatchError> for AggregationError {
    fn from(err: CurveMismatchError) -> Self {
        Self::CurveMismatch(err)
    }
}

/// The sum of the public keys of all nodes of a re-encryption chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectivePublicKey {
    key: PublicKey,
    members: usize,
}

impl CollectivePublicKey {
    /// The aggregated key, usable for encryption like any other public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    /// The number of node keys that were aggregated.
    ///
    /// A re-encryption chain for this key needs exactly this many steps.
    pub fn members(&self) -> usize {
        self.members
    }
}

impl AsRef<PublicKey> for CollectivePublicKey {
    fn as_ref(&self) -> &PublicKey {
        &self.key
    }
}

/// Sums the given public keys, left to right.
///
/// The order of the keys does not affect the result,
/// but a chain re-encrypting for this key must be run with the secret keys
/// of exactly the same set of nodes.
pub fn aggregate(
    params: &Parameters,
    public_keys: &[PublicKey],
) -> Result<CollectivePublicKey, AggregationError> {
    if public_keys.is_empty() {
        return Err(AggregationError::EmptyKeySet);
    }

    let mut point = CurvePoint::identity();
    for pk in public_keys {
        params.check(pk.params())?;
        point = &point + &pk.point;
    }
    if point.is_identity() {
        return Err(AggregationError::IdentityKey);
    }

    tracing::debug!(members = public_keys.len(), "aggregated a collective public key");

    Ok(CollectivePublicKey {
        key: PublicKey {
            params: *params,
            point,
        },
        members: public_keys.len(),
    })
}

/// Generates `num_nodes` key pairs and their collective public key, using the given RNG.
///
/// The key pairs are returned in aggregation order.
/// This is a simulation helper: in a real deployment every node generates its own key pair
/// and only publishes the public half.
pub fn generate_collective_with_rng(
    rng: &mut impl CryptoRngCore,
    params: &Parameters,
    num_nodes: usize,
) -> Result<(CollectivePublicKey, Vec<KeyPair>), AggregationError> {
    let nodes: Vec<KeyPair> = (0..num_nodes)
        .map(|_| KeyPair::generate_with_rng(rng, params))
        .collect();
    let public_keys: Vec<PublicKey> = nodes.iter().map(|node| *node.public()).collect();
    let collective = aggregate(params, &public_keys)?;
    Ok((collective, nodes))
}

/// Generates `num_nodes` key pairs and their collective public key, using the default RNG.
#[cfg(feature = "default-rng")]
pub fn generate_collective(
    params: &Parameters,
    num_nodes: usize,
) -> Result<(CollectivePublicKey, Vec<KeyPair>), AggregationError> {
    generate_collective_with_rng(&mut OsRng, params, num_nodes)
}

#[cfg(test)]
mod tests {

    use alloc::vec::Vec;

    use super::{aggregate, generate_collective, AggregationError};
    use crate::curve::CurvePoint;
    use crate::keys::{KeyPair, PublicKey, SecretKey};
    use crate::params::{CurveMismatchError, Parameters};
    use crate::traits::{DeserializableFromArray, SerializableToArray};

    #[test]
    fn test_aggregate_is_sum() {
        let params = Parameters::new();
        let nodes: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate(&params)).collect();
        let pks: Vec<PublicKey> = nodes.iter().map(|kp| *kp.public()).collect();

        let collective = aggregate(&params, &pks).unwrap();
        let expected = pks
            .iter()
            .fold(CurvePoint::identity(), |acc, pk| &acc + &pk.to_point());
        assert_eq!(collective.public_key().to_point(), expected);
        assert_eq!(collective.public_key().params(), &params);
        assert_eq!(collective.members(), 3);
    }

    #[test]
    fn test_aggregate_order_independent() {
        let params = Parameters::new();
        let pks: Vec<PublicKey> = (0..4)
            .map(|_| *KeyPair::generate(&params).public())
            .collect();
        let reversed: Vec<PublicKey> = pks.iter().rev().cloned().collect();
        assert_eq!(
            aggregate(&params, &pks).unwrap(),
            aggregate(&params, &reversed).unwrap()
        );
    }

    #[test]
    fn test_single_member() {
        let params = Parameters::new();
        let pk = *KeyPair::generate(&params).public();
        let collective = aggregate(&params, &[pk]).unwrap();
        assert_eq!(collective.public_key(), &pk);
    }

    #[test]
    fn test_empty_key_set() {
        let params = Parameters::new();
        assert_eq!(aggregate(&params, &[]), Err(AggregationError::EmptyKeySet));
        assert_eq!(
            generate_collective(&params, 0).map(|(collective, _)| collective),
            Err(AggregationError::EmptyKeySet)
        );
    }

    #[test]
    fn test_mismatched_params() {
        let params = Parameters::new();
        let other = Parameters::from_label(b"other").unwrap();
        let pks = [
            *KeyPair::generate(&params).public(),
            *KeyPair::generate(&other).public(),
        ];
        assert_eq!(
            aggregate(&params, &pks),
            Err(AggregationError::CurveMismatch(CurveMismatchError))
        );
    }

    #[test]
    fn test_keys_cancelling_out() {
        let params = Parameters::new();
        let kp = KeyPair::generate(&params);
        let negated = -kp.secret().to_secret_scalar().as_secret();
        let opposite = SecretKey::from_array(&negated.to_array())
            .unwrap()
            .public_key(&params);

        // Each key is valid on its own.
        assert!(PublicKey::from_array(&opposite.to_array()).is_ok());
        assert_eq!(
            aggregate(&params, &[*kp.public(), opposite]),
            Err(AggregationError::IdentityKey)
        );

        let third = *KeyPair::generate(&params).public();
        let collective = aggregate(&params, &[*kp.public(), opposite, third]).unwrap();
        let key = collective.public_key();
        assert_eq!(PublicKey::from_array(&key.to_array()).unwrap(), *key);
    }

    #[test]
    fn test_generate_collective() {
        let params = Parameters::new();
        let (collective, nodes) = generate_collective(&params, 5).unwrap();
        assert_eq!(nodes.len(), 5);
        let pks: Vec<PublicKey> = nodes.iter().map(|kp| *kp.public()).collect();
        assert_eq!(aggregate(&params, &pks).unwrap(), collective);
    }
}
