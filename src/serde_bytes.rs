//! Helpers for serializing fixed-size byte representations with `serde`.
//!
//! Human-readable formats get a text encoding (hex or base64),
//! binary formats get the raw bytes.

use alloc::format;
use alloc::string::String;
use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use generic_array::{ArrayLength, GenericArray};
use serde::{de, Deserializer, Serializer};

use crate::traits::{DeserializableFromArray, SerializableToArray, SizeMismatchError};

/// Text encoding used for byte arrays in human-readable formats.
pub(crate) enum Encoding {
    /// Use base64 representation.
    Base64,
    /// Use `0x`-prefixed hex representation.
    Hex,
}

fn encode_text(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Base64 => BASE64.encode(bytes),
        Encoding::Hex => format!("0x{}", hex::encode(bytes)),
    }
}

struct ArrayVisitor<N: ArrayLength<u8>> {
    encoding: Encoding,
    phantom: PhantomData<N>,
}

impl<N: ArrayLength<u8>> ArrayVisitor<N> {
    fn from_slice<E: de::Error>(bytes: &[u8]) -> Result<GenericArray<u8, N>, E> {
        GenericArray::<u8, N>::from_exact_iter(bytes.iter().cloned()).ok_or_else(|| {
            de::Error::custom(SizeMismatchError::new(bytes.len(), N::to_usize()))
        })
    }
}

impl<'de, N: ArrayLength<u8>> de::Visitor<'de> for ArrayVisitor<N> {
    type Value = GenericArray<u8, N>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoding {
            Encoding::Base64 => write!(f, "b64-encoded {} bytes", N::to_usize()),
            Encoding::Hex => write!(f, "0x-prefixed hex-encoded {} bytes", N::to_usize()),
        }
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let bytes = match self.encoding {
            Encoding::Base64 => BASE64.decode(v).map_err(de::Error::custom)?,
            Encoding::Hex => {
                let stripped = v.strip_prefix("0x").ok_or_else(|| {
                    de::Error::invalid_value(de::Unexpected::Str(v), &"0x-prefixed hex")
                })?;
                hex::decode(stripped).map_err(de::Error::custom)?
            }
        };
        Self::from_slice(&bytes)
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Self::from_slice(v)
    }
}

/// Serializes an object through its array representation,
/// as text if the target format is human-readable and as bytes otherwise.
pub(crate) fn serialize_as_array<T, S>(
    obj: &T,
    serializer: S,
    encoding: Encoding,
) -> Result<S::Ok, S::Error>
where
    T: SerializableToArray,
    S: Serializer,
{
    let array = obj.to_array();
    if serializer.is_human_readable() {
        serializer.serialize_str(&encode_text(array.as_ref(), encoding))
    } else {
        serializer.serialize_bytes(array.as_ref())
    }
}

/// Deserializes an object serialized with [`serialize_as_array`].
pub(crate) fn deserialize_as_array<'de, T, D>(
    deserializer: D,
    encoding: Encoding,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializableFromArray,
{
    let visitor = ArrayVisitor::<T::Size> {
        encoding,
        phantom: PhantomData,
    };
    let array = if deserializer.is_human_readable() {
        deserializer.deserialize_str(visitor)?
    } else {
        deserializer.deserialize_bytes(visitor)?
    };
    T::from_array(&array)
        .map_err(|err| de::Error::custom(format!("{} ({})", err, type_name::<T>())))
}
