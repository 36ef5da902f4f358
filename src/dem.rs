//! Symmetric encryption of arbitrary payloads under a key derived from a curve point.
//!
//! The point is what gets ElGamal-encrypted and re-encrypted by the chain;
//! the payload itself never passes through the nodes' arithmetic.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, KeySizeUser, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use generic_array::{typenum::Unsigned, GenericArray};
use hkdf::Hkdf;
use rand_core::CryptoRngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;

use crate::curve::{CurvePoint, CurveScalar};
use crate::secret_box::SecretBox;
use crate::traits::SerializableToArray;

type KeySize = <ChaCha20Poly1305 as KeySizeUser>::KeySize;
type NonceSize = <ChaCha20Poly1305 as AeadCore>::NonceSize;
type TagSize = <ChaCha20Poly1305 as AeadCore>::TagSize;

/// Info string for deriving payload keys from points.
const KDF_INFO: &[u8] = b"COLLECTIVE_PRE_PAYLOAD_KEY";

/// Errors that can happen during payload encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionError {
    /// Given plaintext is too large for the backend to handle.
    PlaintextTooLarge,
}

impl fmt::Display for EncryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaintextTooLarge => write!(f, "Plaintext is too large to encrypt"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncryptionError {}

/// Errors that can happen during payload decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionError {
    /// Ciphertext (which should be prepended by the nonce) is shorter than the nonce and the tag.
    CiphertextTooShort,
    /// The ciphertext and the attached authentication data are inconsistent.
    /// This can happen if:
    /// - the wrong key or key point was given;
    /// - the ciphertext or the authenticated data were modified.
    AuthenticationFailed,
}

impl fmt::Display for DecryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CiphertextTooShort => {
                write!(f, "The ciphertext must include the nonce and the tag")
            }
            Self::AuthenticationFailed => write!(
                f,
                "Decryption of ciphertext failed: \
                either someone tampered with the ciphertext or \
                you are using an incorrect decryption key."
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecryptionError {}

/// A symmetric key derived from a curve point.
#[derive(Clone)]
pub struct SymmetricKey(SecretBox<GenericArray<u8, KeySize>>);

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.0
            .as_secret()
            .as_slice()
            .ct_eq(other.0.as_secret().as_slice())
            .into()
    }
}

impl SymmetricKey {
    /// Derives the key for `point` with HKDF-SHA256.
    pub fn from_point(point: &CurvePoint) -> Self {
        let hk = Hkdf::<Sha256>::new(None, &point.to_array());
        let mut okm = SecretBox::new(GenericArray::<u8, KeySize>::default());
        hk.expand(KDF_INFO, okm.as_mut_secret())
            .unwrap_or_else(|_| unreachable!("key size is fixed and small"));
        Self(okm)
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(self.0.as_secret())
    }
}

/// What [`open()`] needs: either a derived key or the point to derive it from.
#[derive(Clone)]
pub enum KeyMaterial {
    /// An already derived key.
    Key(SymmetricKey),
    /// The key point returned by [`seal()`].
    Point(CurvePoint),
}

impl KeyMaterial {
    fn into_key(self) -> SymmetricKey {
        match self {
            Self::Key(key) => key,
            Self::Point(point) => SymmetricKey::from_point(&point),
        }
    }
}

impl From<SymmetricKey> for KeyMaterial {
    fn from(key: SymmetricKey) -> Self {
        Self::Key(key)
    }
}

impl From<&SymmetricKey> for KeyMaterial {
    fn from(key: &SymmetricKey) -> Self {
        Self::Key(key.clone())
    }
}

impl From<CurvePoint> for KeyMaterial {
    fn from(point: CurvePoint) -> Self {
        Self::Point(point)
    }
}

impl From<&CurvePoint> for KeyMaterial {
    fn from(point: &CurvePoint) -> Self {
        Self::Point(*point)
    }
}

pub(crate) fn seal_with_key(
    rng: &mut impl CryptoRngCore,
    key: &SymmetricKey,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Box<[u8]>, EncryptionError> {
    let mut nonce = GenericArray::<u8, NonceSize>::default();
    rng.fill_bytes(&mut nonce);
    let nonce = Nonce::from_slice(&nonce);
    let payload = Payload {
        msg: plaintext,
        aad,
    };

    let mut result: Vec<u8> = nonce.to_vec();
    let enc_data = key
        .cipher()
        .encrypt(nonce, payload)
        .map_err(|_err| EncryptionError::PlaintextTooLarge)?;
    result.extend(enc_data);
    Ok(result.into_boxed_slice())
}

/// Encrypts `plaintext` under a fresh random key point, using the given RNG.
///
/// Returns the key point and `nonce || ciphertext || tag`.
/// `aad` is authenticated but not encrypted, and must be given again to [`open()`].
pub fn seal_with_rng(
    rng: &mut impl CryptoRngCore,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(CurvePoint, Box<[u8]>), EncryptionError> {
    let k = SecretBox::new(CurveScalar::random_nonzero(rng));
    let key_point = &CurvePoint::generator() * k.as_secret();
    let key = SymmetricKey::from_point(&key_point);
    let ciphertext = seal_with_key(rng, &key, plaintext, aad)?;
    Ok((key_point, ciphertext))
}

/// Encrypts `plaintext` under a fresh random key point, using the default RNG.
#[cfg(feature = "default-rng")]
pub fn seal(plaintext: &[u8], aad: &[u8]) -> Result<(CurvePoint, Box<[u8]>), EncryptionError> {
    seal_with_rng(&mut OsRng, plaintext, aad)
}

/// Decrypts the output of [`seal()`].
pub fn open(
    ciphertext: impl AsRef<[u8]>,
    key: impl Into<KeyMaterial>,
    aad: &[u8],
) -> Result<Box<[u8]>, DecryptionError> {
    let ciphertext = ciphertext.as_ref();
    let nonce_size = <NonceSize as Unsigned>::to_usize();
    let tag_size = <TagSize as Unsigned>::to_usize();

    if ciphertext.len() < nonce_size + tag_size {
        return Err(DecryptionError::CiphertextTooShort);
    }

    let nonce = Nonce::from_slice(&ciphertext[..nonce_size]);
    let payload = Payload {
        msg: &ciphertext[nonce_size..],
        aad,
    };
    let key: KeyMaterial = key.into();
    key.into_key()
        .cipher()
        .decrypt(nonce, payload)
        .map(|pt| pt.into_boxed_slice())
        .map_err(|_err| DecryptionError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {

    use rand_core::OsRng;

    use super::{open, seal, seal_with_key, DecryptionError, KeyMaterial, SymmetricKey};
    use crate::curve::{CurvePoint, CurveScalar};

    #[test]
    fn test_key_derivation() {
        let p1 = CurvePoint::generator();
        let p2 = &p1 + &p1;
        assert!(SymmetricKey::from_point(&p1) == SymmetricKey::from_point(&p1));
        assert!(SymmetricKey::from_point(&p1) != SymmetricKey::from_point(&p2));
    }

    #[test]
    fn test_open_with_point() {
        let plaintext = b"peace at dawn";
        let aad = b"header";
        let (key_point, ciphertext) = seal(plaintext, aad).unwrap();
        assert_eq!(ciphertext.len(), 12 + plaintext.len() + 16);

        let decrypted = open(&ciphertext, key_point, aad).unwrap();
        assert_eq!(decrypted.as_ref(), plaintext);
    }

    #[test]
    fn test_open_with_key() {
        let (key_point, ciphertext) = seal(b"peace at dawn", b"").unwrap();
        let key = SymmetricKey::from_point(&key_point);
        let decrypted = open(&ciphertext, &key, b"").unwrap();
        assert_eq!(decrypted.as_ref(), b"peace at dawn");

        let material = KeyMaterial::from(key);
        assert_eq!(open(&ciphertext, material, b"").unwrap(), decrypted);
    }

    #[test]
    fn test_empty_plaintext() {
        let (key_point, ciphertext) = seal(b"", b"aad").unwrap();
        assert_eq!(ciphertext.len(), 12 + 16);
        assert!(open(&ciphertext, &key_point, b"aad").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_key() {
        let (_key_point, ciphertext) = seal(b"peace at dawn", b"").unwrap();
        let wrong_point = &CurvePoint::generator() * &CurveScalar::random_nonzero(&mut OsRng);
        assert_eq!(
            open(&ciphertext, wrong_point, b""),
            Err(DecryptionError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_tampering() {
        let (key_point, ciphertext) = seal(b"peace at dawn", b"header").unwrap();

        assert_eq!(
            open(&ciphertext, key_point, b"other header"),
            Err(DecryptionError::AuthenticationFailed)
        );

        let mut modified = ciphertext.to_vec();
        let last = modified.len() - 1;
        modified[last] ^= 1;
        assert_eq!(
            open(&modified, key_point, b"header"),
            Err(DecryptionError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_too_short() {
        let key = SymmetricKey::from_point(&CurvePoint::generator());
        assert_eq!(
            open([0u8; 27], &key, b""),
            Err(DecryptionError::CiphertextTooShort)
        );
        // Exactly nonce + tag passes the length check and fails authentication.
        assert_eq!(
            open([0u8; 28], &key, b""),
            Err(DecryptionError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_nonce_is_random() {
        let key = SymmetricKey::from_point(&CurvePoint::generator());
        let ct1 = seal_with_key(&mut OsRng, &key, b"same", b"").unwrap();
        let ct2 = seal_with_key(&mut OsRng, &key, b"same", b"").unwrap();
        assert_ne!(ct1, ct2);
    }
}
