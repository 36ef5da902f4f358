//! `collective-pre` is a proxy re-encryption scheme over elliptic-curve ElGamal,
//! where the decryption right belongs to a collective of nodes rather than to a single party.
//!
//! A message is encrypted for a *collective* public key, the sum of the public keys
//! of N independent nodes. The collective secret key never exists anywhere.
//! To hand the message over to a delegate, the nodes form a chain:
//! each one strips its share of the blinding and adds fresh blinding for the delegate.
//! After all N nodes have stepped, the delegate holds an ordinary ElGamal ciphertext
//! for its own key. No node learns the message, another node's key, or the delegate's key.
//!
//! Every node has to take part (there is no threshold),
//! and the chain cannot tell whether the right set of nodes took part:
//! a wrong chain silently produces an unrelated point.
//! Use [`encrypt_payload`]/[`decrypt_payload`] to have such failures detected.
//!
//! ## Available feature flags
//!
//! * `default-rng` - adds methods that use the system RNG (default).
//! * `default-serialization` - adds methods for default binary serialization.
//!    MessagePack, `serde`-based.
//! * `serde` - implements `serde`-based serialization and deserialization.
//! * `std` - implements `std::error::Error` for the error types.
//!
//! # Usage
//!
//! ```
//! use collective_pre::*;
//!
//! // All the objects live in an explicit group instance.
//! let params = Parameters::new();
//! let codec = PointCodec::new(&params);
//!
//! // Each node generates its own key pair and publishes the public half.
//! let nodes: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate(&params)).collect();
//! let public_keys: Vec<PublicKey> = nodes.iter().map(|node| *node.public()).collect();
//! let collective = aggregate(&params, &public_keys).unwrap();
//!
//! // Anyone can encrypt for the collective key.
//! let ciphertext = encrypt(&params, &codec.encode(42), collective.public_key()).unwrap();
//!
//! // The delegate only publishes its public key.
//! let delegate = KeyPair::generate(&params);
//!
//! // The chain: every node applies its step to the state received from the previous node.
//! let mut state = ReencryptionState::new(&params, &ciphertext, delegate.public()).unwrap();
//! for node in &nodes {
//!     state = state.step(node.secret());
//! }
//! let ciphertext_delegate = state.finish().unwrap();
//!
//! // The delegate decrypts with its own secret key.
//! let point = decrypt(&params, &ciphertext_delegate, delegate.secret()).unwrap();
//! assert_eq!(codec.decode(&point), Ok(42));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]
#![cfg_attr(not(test), no_std)]
// Allows us to mark items in the documentation as gated under specific features.
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

extern crate alloc;

mod chain;
mod codec;
mod collective;
mod curve;
mod dem;
mod elgamal;
mod keys;
mod params;
mod pre;
mod secret_box;
mod traits;

#[cfg(feature = "serde")]
mod serde_bytes;

pub use chain::{reencrypt_with_rng, ReencryptionError, ReencryptionState};
pub use codec::{PointCodec, PointNotEncodableError, DEFAULT_DECODE_LIMIT};
pub use collective::{
    aggregate, generate_collective_with_rng, AggregationError, CollectivePublicKey,
};
pub use curve::CurvePoint;
pub use dem::{open, seal_with_rng, DecryptionError, EncryptionError, KeyMaterial, SymmetricKey};
pub use elgamal::{decrypt, encrypt_with_rng, Ciphertext};
pub use keys::{KeyPair, PublicKey, SecretKey};
pub use params::{CurveMismatchError, Parameters};
pub use pre::{
    decrypt_number, decrypt_payload, encrypt_number_with_rng, encrypt_payload_with_rng,
    NumberDecryptionError, PayloadDecryptionError, PayloadEncryptionError,
};
pub use secret_box::SecretBox;
pub use traits::{
    ConstructionError, DeserializableFromArray, DeserializationError, RepresentableAsArray,
    SerializableToArray, SizeMismatchError,
};

#[cfg(feature = "default-rng")]
pub use chain::reencrypt;
#[cfg(feature = "default-rng")]
pub use collective::generate_collective;
#[cfg(feature = "default-rng")]
pub use dem::seal;
#[cfg(feature = "default-rng")]
pub use elgamal::encrypt;
#[cfg(feature = "default-rng")]
pub use pre::{encrypt_number, encrypt_payload};

#[cfg(feature = "default-serialization")]
pub use traits::{DefaultDeserialize, DefaultSerialize};
