//! bcrypt helpers. Both calls are CPU-bound; run them on a blocking worker.

pub use bcrypt::BcryptError;

/// Hash `plain` with a fresh salt at the given cost
pub fn hash_password(plain: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(plain, cost)
}

/// Check `plain` against a stored bcrypt hash
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, BcryptError> {
    bcrypt::verify(plain, hashed)
}
