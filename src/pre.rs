//! The high-level encryption API: numbers and arbitrary payloads
//! encrypted for a (collective) public key.

use alloc::boxed::Box;
use core::fmt;

use rand_core::CryptoRngCore;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;

use crate::codec::{PointCodec, PointNotEncodableError};
use crate::dem::{self, DecryptionError, EncryptionError};
use crate::elgamal::{self, Ciphertext};
use crate::keys::{PublicKey, SecretKey};
use crate::params::{CurveMismatchError, Parameters};

/// Errors that can happen when decrypting a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberDecryptionError {
    /// The ciphertext belongs to a different group instance than the codec.
    CurveMismatch(CurveMismatchError),
    /// The decrypted point is not within the range of the codec.
    /// Usually means a wrong key or an incomplete re-encryption chain.
    NotEncodable(PointNotEncodableError),
}

impl fmt::Display for NumberDecryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurveMismatch(err) => write!(f, "{}", err),
            Self::NotEncodable(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NumberDecryptionError {}

/// Errors that can happen when encrypting a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncryptionError {
    /// The public key belongs to a different group instance.
    CurveMismatch(CurveMismatchError),
    /// An error when encrypting the payload. See [`EncryptionError`] for the options.
    OnEncryption(EncryptionError),
}

impl fmt::Display for PayloadEncryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurveMismatch(err) => write!(f, "{}", err),
            Self::OnEncryption(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PayloadEncryptionError {}

/// Errors that can happen when decrypting a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadDecryptionError {
    /// The key ciphertext belongs to a different group instance.
    CurveMismatch(CurveMismatchError),
    /// An error when decrypting the payload. See [`DecryptionError`] for the options.
    OnDecryption(DecryptionError),
}

impl fmt::Display for PayloadDecryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurveMismatch(err) => write!(f, "{}", err),
            Self::OnDecryption(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PayloadDecryptionError {}

/// Encrypts `value` for `pk` using the given RNG.
pub fn encrypt_number_with_rng(
    rng: &mut impl CryptoRngCore,
    codec: &PointCodec,
    value: u64,
    pk: &PublicKey,
) -> Result<Ciphertext, CurveMismatchError> {
    elgamal::encrypt_with_rng(rng, codec.params(), &codec.encode(value), pk)
}

/// Encrypts `value` for `pk` using the default RNG.
#[cfg(feature = "default-rng")]
pub fn encrypt_number(
    codec: &PointCodec,
    value: u64,
    pk: &PublicKey,
) -> Result<Ciphertext, CurveMismatchError> {
    encrypt_number_with_rng(&mut OsRng, codec, value, pk)
}

/// Decrypts a number encrypted with [`encrypt_number()`] (possibly re-encrypted since).
///
/// The cost is linear in the decrypted value, bounded by the codec's limit.
pub fn decrypt_number(
    codec: &PointCodec,
    ciphertext: &Ciphertext,
    sk: &SecretKey,
) -> Result<u64, NumberDecryptionError> {
    let point = elgamal::decrypt(codec.params(), ciphertext, sk)
        .map_err(NumberDecryptionError::CurveMismatch)?;
    codec
        .decode(&point)
        .map_err(NumberDecryptionError::NotEncodable)
}

/// Encrypts an arbitrary payload for `pk` using the given RNG.
///
/// The payload is sealed with a symmetric key derived from a random point,
/// and the point is ElGamal-encrypted for `pk`.
/// Returns the key ciphertext (which can be re-encrypted by a chain)
/// and the sealed payload (which is passed to the final recipient unchanged).
pub fn encrypt_payload_with_rng(
    rng: &mut impl CryptoRngCore,
    params: &Parameters,
    pk: &PublicKey,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Ciphertext, Box<[u8]>), PayloadEncryptionError> {
    params
        .check(pk.params())
        .map_err(PayloadEncryptionError::CurveMismatch)?;
    let (key_point, payload) =
        dem::seal_with_rng(rng, plaintext, aad).map_err(PayloadEncryptionError::OnEncryption)?;
    let key_ciphertext = elgamal::encrypt_with_rng(rng, params, &key_point, pk)
        .map_err(PayloadEncryptionError::CurveMismatch)?;
    Ok((key_ciphertext, payload))
}

/// Encrypts an arbitrary payload for `pk` using the default RNG.
#[cfg(feature = "default-rng")]
pub fn encrypt_payload(
    params: &Parameters,
    pk: &PublicKey,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Ciphertext, Box<[u8]>), PayloadEncryptionError> {
    encrypt_payload_with_rng(&mut OsRng, params, pk, plaintext, aad)
}

/// Decrypts a payload encrypted with [`encrypt_payload()`].
///
/// Unlike the bare ElGamal decryption, a wrong key or an incomplete re-encryption chain
/// is detected here and reported as [`DecryptionError::AuthenticationFailed`].
pub fn decrypt_payload(
    params: &Parameters,
    sk: &SecretKey,
    key_ciphertext: &Ciphertext,
    payload: impl AsRef<[u8]>,
    aad: &[u8],
) -> Result<Box<[u8]>, PayloadDecryptionError> {
    let key_point = elgamal::decrypt(params, key_ciphertext, sk)
        .map_err(PayloadDecryptionError::CurveMismatch)?;
    dem::open(payload, key_point, aad).map_err(PayloadDecryptionError::OnDecryption)
}

#[cfg(test)]
mod tests {

    use alloc::vec::Vec;

    use super::{
        decrypt_number, decrypt_payload, encrypt_number, encrypt_payload, NumberDecryptionError,
        PayloadDecryptionError, PayloadEncryptionError,
    };
    use crate::chain::reencrypt;
    use crate::codec::{PointCodec, PointNotEncodableError};
    use crate::collective::generate_collective;
    use crate::dem::DecryptionError;
    use crate::keys::{KeyPair, SecretKey};
    use crate::params::{CurveMismatchError, Parameters};

    #[test]
    fn test_number_direct() {
        let params = Parameters::new();
        let codec = PointCodec::new(&params);
        let kp = KeyPair::generate(&params);

        let ct = encrypt_number(&codec, 500, kp.public()).unwrap();
        assert_eq!(decrypt_number(&codec, &ct, kp.secret()), Ok(500));
    }

    #[test]
    fn test_number_through_chain() {
        let params = Parameters::new();
        let codec = PointCodec::new(&params);
        let (collective, nodes) = generate_collective(&params, 3).unwrap();
        let delegate = KeyPair::generate(&params);

        let ct = encrypt_number(&codec, 42, collective.public_key()).unwrap();
        let keys: Vec<&SecretKey> = nodes.iter().map(|kp| kp.secret()).collect();
        let ct_delegate = reencrypt(&params, &ct, keys, delegate.public()).unwrap();

        assert_eq!(decrypt_number(&codec, &ct_delegate, delegate.secret()), Ok(42));
    }

    #[test]
    fn test_number_wrong_key() {
        let params = Parameters::new();
        let codec = PointCodec::with_limit(&params, 50);
        let kp = KeyPair::generate(&params);
        let other = KeyPair::generate(&params);

        let ct = encrypt_number(&codec, 3, kp.public()).unwrap();
        assert_eq!(
            decrypt_number(&codec, &ct, other.secret()),
            Err(NumberDecryptionError::NotEncodable(PointNotEncodableError {
                limit: 50
            }))
        );
    }

    #[test]
    fn test_number_curve_mismatch() {
        let params = Parameters::new();
        let other = Parameters::from_label(b"other").unwrap();
        let kp = KeyPair::generate(&other);

        let ct = encrypt_number(&PointCodec::new(&other), 3, kp.public()).unwrap();
        assert_eq!(
            decrypt_number(&PointCodec::new(&params), &ct, kp.secret()),
            Err(NumberDecryptionError::CurveMismatch(CurveMismatchError))
        );
    }

    #[test]
    fn test_payload_through_chain() {
        let params = Parameters::new();
        let (collective, nodes) = generate_collective(&params, 3).unwrap();
        let delegate = KeyPair::generate(&params);
        let plaintext = b"peace at dawn";
        let aad = b"round 7";

        let (key_ct, payload) =
            encrypt_payload(&params, collective.public_key(), plaintext, aad).unwrap();
        let keys: Vec<&SecretKey> = nodes.iter().map(|kp| kp.secret()).collect();
        let key_ct_delegate = reencrypt(&params, &key_ct, keys, delegate.public()).unwrap();

        let decrypted =
            decrypt_payload(&params, delegate.secret(), &key_ct_delegate, &payload, aad).unwrap();
        assert_eq!(&decrypted as &[u8], plaintext);
    }

    #[test]
    fn test_payload_incomplete_chain() {
        let params = Parameters::new();
        let (collective, nodes) = generate_collective(&params, 3).unwrap();
        let delegate = KeyPair::generate(&params);

        let (key_ct, payload) =
            encrypt_payload(&params, collective.public_key(), b"peace at dawn", b"").unwrap();
        let keys: Vec<&SecretKey> = nodes[1..].iter().map(|kp| kp.secret()).collect();
        let key_ct_delegate = reencrypt(&params, &key_ct, keys, delegate.public()).unwrap();

        assert_eq!(
            decrypt_payload(&params, delegate.secret(), &key_ct_delegate, &payload, b""),
            Err(PayloadDecryptionError::OnDecryption(
                DecryptionError::AuthenticationFailed
            ))
        );
    }

    #[test]
    fn test_payload_curve_mismatch() {
        let params = Parameters::new();
        let other = Parameters::from_label(b"other").unwrap();
        let kp = KeyPair::generate(&other);

        assert_eq!(
            encrypt_payload(&params, kp.public(), b"data", b"").map(|_| ()),
            Err(PayloadEncryptionError::CurveMismatch(CurveMismatchError))
        );

        let (key_ct, payload) = encrypt_payload(&other, kp.public(), b"data", b"").unwrap();
        assert_eq!(
            decrypt_payload(&params, kp.secret(), &key_ct, &payload, b""),
            Err(PayloadDecryptionError::CurveMismatch(CurveMismatchError))
        );
    }
}
