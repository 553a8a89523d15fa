use crate::error::AppError;
use bcrypt::{hash, verify};

/// Bcrypt password hashing with a cost fixed at construction.
///
/// Each `hash` call generates a fresh random salt, so hashing the same
/// password twice yields different strings. Salt and cost are embedded in
/// the output, which means `verify` needs no configuration at all: hashes
/// produced under an older cost keep verifying after the cost is raised.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> PasswordHasher {
        PasswordHasher { cost }
    }

    /// Hashes a plaintext password. CPU-bound; call through `web::block`
    /// from request handlers.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, self.cost)?)
    }

    /// Checks a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`, not an error. `Err` means the stored hash
    /// was malformed, which indicates store corruption rather than a bad
    /// login attempt. The comparison inside bcrypt is constant-time.
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        Ok(verify(password, password_hash)?)
    }
}
