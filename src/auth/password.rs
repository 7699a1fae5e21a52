use crate::error::AppError;

/// Hash a password for storage (bcrypt, default cost).
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored bcrypt hash.
/// Malformed hashes count as a mismatch.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
