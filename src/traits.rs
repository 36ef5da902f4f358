#[cfg(feature = "default-serialization")]
use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::ops::Sub;

use generic_array::sequence::Split;
use generic_array::{ArrayLength, GenericArray};
use typenum::{Diff, Unsigned, U4};

#[cfg(feature = "default-serialization")]
use serde::{Deserialize, Serialize};

/// Errors that can happen during object construction from a fixed-size byte array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionError {
    /// The name of the type that was being deserialized
    type_name: String,
    /// An associated error message
    message: String,
}

impl ConstructionError {
    /// Creates a new `ConstructionError`.
    pub fn new(type_name: &str, message: &str) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to construct a {} object: {}", self.type_name, self.message)
    }
}

/// The provided bytestring is of an incorrect size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeMismatchError {
    pub(crate) received_size: usize,
    pub(crate) expected_size: usize,
}

impl SizeMismatchError {
    /// Creates a new `SizeMismatchError`.
    pub fn new(received_size: usize, expected_size: usize) -> Self {
        Self {
            received_size,
            expected_size,
        }
    }
}

impl fmt::Display for SizeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bytestring size mismatch: expected {} bytes, got {}",
            self.expected_size, self.received_size
        )
    }
}

/// Errors that can happen during object deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeserializationError {
    /// Failed to construct the object from a given bytestring (with the correct length).
    ConstructionFailure(ConstructionError),
    /// The given bytestring is too short or too long.
    SizeMismatch(SizeMismatchError),
}

impl fmt::Display for DeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstructionFailure(err) => write!(f, "{}", err),
            Self::SizeMismatch(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConstructionError {}

#[cfg(feature = "std")]
impl std::error::Error for SizeMismatchError {}

#[cfg(feature = "std")]
impl std::error::Error for DeserializationError {}

/// A trait denoting that the object can be represented as an array of bytes
/// with size known at compile time.
pub trait RepresentableAsArray: Sized {
    /// Resulting array length.
    type Size: ArrayLength<u8>;

    /// Resulting array length exposed as a runtime method.
    fn serialized_size() -> usize {
        Self::Size::to_usize()
    }
}

/// A trait denoting that the object can be serialized to an array of bytes
/// with size known at compile time.
pub trait SerializableToArray: RepresentableAsArray {
    /// Produces a byte array with the object's contents.
    fn to_array(&self) -> GenericArray<u8, Self::Size>;
}

/// A trait denoting that the object can be deserialized from an array of bytes
/// with size known at compile time.
pub trait DeserializableFromArray: RepresentableAsArray {
    /// Attempts to produce the object back from the serialized form.
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError>;

    /// Attempts to produce the object back from a dynamically sized byte array,
    /// checking that its length is correct.
    fn from_bytes(data: impl AsRef<[u8]>) -> Result<Self, DeserializationError> {
        let data_slice = data.as_ref();
        let received_size = data_slice.len();
        let expected_size = Self::serialized_size();
        if received_size != expected_size {
            return Err(DeserializationError::SizeMismatch(SizeMismatchError::new(
                received_size,
                expected_size,
            )));
        }
        Self::from_array(GenericArray::<u8, Self::Size>::from_slice(data_slice))
            .map_err(DeserializationError::ConstructionFailure)
    }

    /// Used to implement [`from_array()`](`Self::from_array()`) for structs whose fields
    /// implement [`SerializableToArray`].
    ///
    /// Attempts to split off enough bytes from `arr` to call
    /// [`from_array()`](`Self::from_array()`),
    /// and if it succeeds, returns the resulting object and the rest of the array.
    #[allow(clippy::type_complexity)]
    fn take<U>(
        arr: GenericArray<u8, U>,
    ) -> Result<(Self, GenericArray<u8, Diff<U, Self::Size>>), ConstructionError>
    where
        U: ArrayLength<u8> + Sub<Self::Size>,
        Diff<U, Self::Size>: ArrayLength<u8>,
    {
        let (res_bytes, rest): (GenericArray<u8, Self::Size>, GenericArray<u8, _>) = arr.split();
        let maybe_res = Self::from_array(&res_bytes);
        maybe_res.map(|res| (res, rest))
    }

    /// A variant of [`take()`](`Self::take()`) to be called for the last field of the struct,
    /// where no remainder of the array is expected.
    fn take_last(arr: GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        Self::from_array(&arr)
    }
}

impl RepresentableAsArray for u32 {
    type Size = U4;
}

impl SerializableToArray for u32 {
    fn to_array(&self) -> GenericArray<u8, Self::Size> {
        GenericArray::<u8, Self::Size>::clone_from_slice(&self.to_be_bytes())
    }
}

impl DeserializableFromArray for u32 {
    fn from_array(arr: &GenericArray<u8, Self::Size>) -> Result<Self, ConstructionError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(arr.as_slice());
        Ok(u32::from_be_bytes(bytes))
    }
}

/// A `serde`-based default serialization into MessagePack.
#[cfg(feature = "default-serialization")]
pub trait DefaultSerialize: Serialize {
    /// Serializes this object.
    fn to_bytes(&self) -> Result<Box<[u8]>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self).map(|v| v.into_boxed_slice())
    }
}

/// A `serde`-based default deserialization from MessagePack.
#[cfg(feature = "default-serialization")]
pub trait DefaultDeserialize<'de>: Deserialize<'de> {
    /// Deserializes a bytestring into this object.
    fn from_bytes(bytes: &'de [u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {

    use generic_array::GenericArray;
    use typenum::U4;

    use super::{
        DeserializableFromArray, DeserializationError, RepresentableAsArray, SerializableToArray,
        SizeMismatchError,
    };

    #[test]
    fn test_u32_array() {
        let x: u32 = 0x0102_0304;
        let arr = x.to_array();
        assert_eq!(arr, *GenericArray::<u8, U4>::from_slice(&[1u8, 2, 3, 4]));
        assert_eq!(u32::from_array(&arr).unwrap(), x);
        assert_eq!(u32::serialized_size(), 4);
    }

    #[test]
    fn test_size_mismatch() {
        let result = u32::from_bytes([1u8, 2, 3]);
        assert_eq!(
            result,
            Err(DeserializationError::SizeMismatch(SizeMismatchError::new(3, 4)))
        );
    }
}
