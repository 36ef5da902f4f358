//! ElGamal encryption of curve points.
//!
//! There is no integrity protection: decrypting with a wrong key, or a ciphertext
//! produced by an incomplete re-encryption chain, silently yields an unrelated point.
//! Use [`decrypt_payload`](crate::decrypt_payload) if tampering or key mismatches must be detected.

use generic_array::sequence::Concat;
use generic_array::GenericArray;
use rand_core::CryptoRngCore;
use typenum::op;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::curve::{CurvePoint, CurveScalar};
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

/// An ElGamal ciphertext `(g * r, m + pk * r)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) params: Parameters,
    pub(crate) c1: CurvePoint,
    pub(crate) c2: CurvePoint,
}

impl Ciphertext {
    /// The group instance this ciphertext belongs to.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// The two ciphertext components `(c1, c2)`.
    pub fn components(&self) -> (CurvePoint, CurvePoint) {
        (self.c1, self.c2)
    }
}

type ParametersSize = <Parameters as RepresentableAsArray>::Size;
type PointSize = <CurvePoint as RepresentableAsArray>::Size;

impl RepresentableAsArray for Ciphertext {
    type Size = op!(ParametersSize + PointSize + PointSize);
}

impl SerializableToArray for Ciphertext {
    fn to_array(&self) -> GenericArray<u8, Self::Size> {
        self.params
            .to_array()
            .concat(self.c1.to_array())
            .concat(self.c2.to_array())
    }
}

impl DeserializableFromArray for Ciphertext {
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        let (params, rest) = Parameters::take(*arr)?;
        let (c1, rest) = CurvePoint::take(rest)?;
        let c2 = CurvePoint::take_last(rest)?;
        Ok(Self { params, c1, c2 })
    }
}

#[cfg(feature = "serde")]
impl Serialize for Ciphertext {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_as_array(self, serializer, Encoding::Base64)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Ciphertext {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_as_array(deserializer, Encoding::Base64)
    }
}

#[cfg(feature = "default-serialization")]
impl DefaultSerialize for Ciphertext {}

#[cfg(feature = "default-serialization")]
impl<'de> DefaultDeserialize<'de> for Ciphertext {}

/// Encrypts `plaintext` for `pk` using the given RNG.
pub fn encrypt_with_rng(
    rng: &mut impl CryptoRngCore,
    params: &Parameters,
    plaintext: &CurvePoint,
    pk: &PublicKey,
) -> Result<Ciphertext, CurveMismatchError> {
    params.check(pk.params())?;

    let r = SecretBox::new(CurveScalar::random_nonzero(rng));
    let c1 = &params.g * r.as_secret();
    let c2 = plaintext + &(&pk.point * r.as_secret());

    Ok(Ciphertext {
        params: *params,
        c1,
        c2,
    })
}

/// Encrypts `plaintext` for `pk` using the default RNG.
#[cfg(feature = "default-rng")]
pub fn encrypt(
    params: &Parameters,
    plaintext: &CurvePoint,
    pk: &PublicKey,
) -> Result<Ciphertext, CurveMismatchError> {
    encrypt_with_rng(&mut OsRng, params, plaintext, pk)
}

/// Decrypts `ciphertext` with `sk`, returning `c2 - c1 * sk`.
///
/// The result is only meaningful if `ciphertext` was created for `g * sk`
/// (directly, or as the output of a complete re-encryption chain targeting that key).
pub fn decrypt(
    params: &Parameters,
    ciphertext: &Ciphertext,
    sk: &SecretKey,
) -> Result<CurvePoint, CurveMismatchError> {
    params.check(ciphertext.params())?;
    let shared = &ciphertext.c1 * sk.to_secret_scalar().as_secret();
    Ok(&ciphertext.c2 - &shared)
}

#[cfg(test)]
mod tests {

    use super::{decrypt, encrypt, Ciphertext};
    use crate::codec::PointCodec;
    use crate::curve::{CurvePoint, CurveScalar};
    use crate::keys::KeyPair;
    use crate::params::{CurveMismatchError, Parameters};
    use crate::traits::{DeserializableFromArray, RepresentableAsArray, SerializableToArray};
    use rand_core::OsRng;

    #[test]
    fn test_roundtrip() {
        let params = Parameters::new();
        let kp = KeyPair::generate(&params);
        let m = &CurvePoint::generator() * &CurveScalar::random_nonzero(&mut OsRng);

        let ct = encrypt(&params, &m, kp.public()).unwrap();
        assert_eq!(decrypt(&params, &ct, kp.secret()).unwrap(), m);
    }

    #[test]
    fn test_identity_plaintext() {
        let params = Parameters::new();
        let kp = KeyPair::generate(&params);
        let m = PointCodec::new(&params).encode(0);

        let ct = encrypt(&params, &m, kp.public()).unwrap();
        assert!(decrypt(&params, &ct, kp.secret()).unwrap().is_identity());
    }

    #[test]
    fn test_ciphertext_structure() {
        let params = Parameters::from_label(b"elgamal").unwrap();
        let kp = KeyPair::generate(&params);
        let m = PointCodec::new(&params).encode(7);

        let ct = encrypt(&params, &m, kp.public()).unwrap();
        let (c1, c2) = ct.components();
        // c2 - c1 * sk == m  <=>  c2 - m == pk * r, with c1 == g * r
        assert_eq!(&c2 - &m, &c1 * kp.secret().to_secret_scalar().as_secret());
        assert_ne!(c2, m);
    }

    #[test]
    fn test_randomized() {
        let params = Parameters::new();
        let kp = KeyPair::generate(&params);
        let m = PointCodec::new(&params).encode(1);

        let ct1 = encrypt(&params, &m, kp.public()).unwrap();
        let ct2 = encrypt(&params, &m, kp.public()).unwrap();
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_wrong_key_is_silent() {
        let params = Parameters::new();
        let kp = KeyPair::generate(&params);
        let other = KeyPair::generate(&params);
        let m = PointCodec::new(&params).encode(5);

        let ct = encrypt(&params, &m, kp.public()).unwrap();
        let result = decrypt(&params, &ct, other.secret()).unwrap();
        assert_ne!(result, m);
    }

    #[test]
    fn test_curve_mismatch() {
        let params = Parameters::new();
        let other = Parameters::from_label(b"other").unwrap();
        let kp = KeyPair::generate(&other);
        let m = PointCodec::new(&params).encode(5);

        assert_eq!(
            encrypt(&params, &m, kp.public()),
            Err(CurveMismatchError)
        );

        let ct = encrypt(&other, &m, kp.public()).unwrap();
        assert_eq!(decrypt(&params, &ct, kp.secret()), Err(CurveMismatchError));
        assert_eq!(decrypt(&other, &ct, kp.secret()), Ok(m));
    }

    #[test]
    fn test_serialize() {
        let params = Parameters::new();
        let kp = KeyPair::generate(&params);
        let m = PointCodec::new(&params).encode(12);
        let ct = encrypt(&params, &m, kp.public()).unwrap();

        let ct_back = Ciphertext::from_array(&ct.to_array()).unwrap();
        assert_eq!(ct, ct_back);
        assert_eq!(Ciphertext::serialized_size(), 99);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_serialization() {
        use crate::serde_bytes::tests::{check_deserialization, check_serialization};
        use crate::serde_bytes::Encoding;

        let params = Parameters::new();
        let kp = KeyPair::generate(&params);
        let ct = encrypt(&params, &CurvePoint::generator(), kp.public()).unwrap();
        check_serialization(&ct, Encoding::Base64);
        check_deserialization(&ct);
    }
}
