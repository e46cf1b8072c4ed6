//! Password hashing and verification using bcrypt.
//!
//! The rest of the service treats hashes as opaque strings: they are salted
//! internally and can only be checked, never reversed.

use bcrypt::{BcryptError, DEFAULT_COST};

/// Hash a plaintext password for storage.
pub fn hash(plaintext: &str) -> Result<String, BcryptError> {
    bcrypt::hash(plaintext, DEFAULT_COST)
}

/// Verify a plaintext password against a stored hash.
pub fn verify(hash: &str, plaintext: &str) -> Result<bool, BcryptError> {
    bcrypt::verify(plaintext, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(verify(&hashed, "correct horse battery staple").unwrap());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hashed = hash("correct horse battery staple").unwrap();
        assert!(!verify(&hashed, "incorrect horse").unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash("same input").unwrap();
        let b = hash("same input").unwrap();
        assert_ne!(a, b);
    }
}
