//! Password hashing using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher as _, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with configurable parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (m=64MiB, t=3, p=4)
    pub fn new() -> Self {
        Self::with_params(65536, 3, 4)
    }

    /// Create hasher with explicit cost parameters; falls back to the crate
    /// defaults when the combination is rejected
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        let params = Params::new(m_cost, t_cost, p_cost, None).unwrap_or_default();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2 }
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Validate password against policy
    pub fn validate_password_policy(
        password: &str,
        policy: &SecurityConfig,
    ) -> Result<(), AppError> {
        if password.chars().count() < policy.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                policy.password_min_length
            )));
        }

        if policy.password_require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if policy.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        if policy.password_require_special && password.chars().all(|c| c.is_alphanumeric()) {
            return Err(AppError::validation(
                "Password must contain at least one special character",
            ));
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1)
    }

    #[test]
    fn test_hash_produces_argon2id_phc_string() {
        let hash = fast_hasher().hash("TestPassword123!").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = fast_hasher();
        let password = "TestPassword123!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Hashes should be different due to salt
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_password_policy_validation() {
        let policy = SecurityConfig::default();

        assert!(PasswordHasher::validate_password_policy("Test1234", &policy).is_ok());
        // Too short
        assert!(PasswordHasher::validate_password_policy("Test1", &policy).is_err());
        // No uppercase
        assert!(PasswordHasher::validate_password_policy("test1234", &policy).is_err());
        // No digit
        assert!(PasswordHasher::validate_password_policy("Testtest", &policy).is_err());

        let strict = SecurityConfig {
            password_require_special: true,
            ..SecurityConfig::default()
        };
        assert!(PasswordHasher::validate_password_policy("Test1234", &strict).is_err());
        assert!(PasswordHasher::validate_password_policy("Test123!", &strict).is_ok());
    }
}
