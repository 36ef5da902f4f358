use alloc::boxed::Box;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Heap-allocated storage for secret values (private scalars, blinding factors,
/// derived symmetric keys).
///
/// The value lives behind a `Box` so that moving the container does not leave
/// stray copies on the stack, and it is overwritten with zeros when the container
/// is dropped.
#[derive(Clone)] // No Debug derivation, so that secrets do not end up in logs.
pub struct SecretBox<T>(Box<T>)
where
    T: Zeroize + Clone;

impl<T> SecretBox<T>
where
    T: Zeroize + Clone,
{
    /// Moves `val` into a new container.
    pub fn new(val: T) -> Self {
        Self(Box::new(val))
    }

    /// Gives read access to the secret value.
    pub fn as_secret(&self) -> &T {
        self.0.as_ref()
    }

    /// Gives write access to the secret value.
    pub fn as_mut_secret(&mut self) -> &mut T {
        self.0.as_mut()
    }
}

impl<T: PartialEq + Zeroize + Clone> PartialEq for SecretBox<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_secret() == other.as_secret()
    }
}

impl<T> Drop for SecretBox<T>
where
    T: Zeroize + Clone,
{
    fn drop(&mut self) {
        self.0.as_mut().zeroize()
    }
}

// `#[derive(ZeroizeOnDrop)]` does not work with the `where` clause above,
// the manual `Drop` impl provides the guarantee instead.
impl<T> ZeroizeOnDrop for SecretBox<T> where T: Zeroize + Clone {}

#[cfg(test)]
mod tests {

    use super::SecretBox;

    #[test]
    fn test_access() {
        let mut secret = SecretBox::new([1u8; 32]);
        assert_eq!(secret.as_secret(), &[1u8; 32]);
        secret.as_mut_secret()[0] = 2;
        assert_eq!(secret.as_secret()[0], 2);
        assert!(secret.clone() == secret);
    }
}
