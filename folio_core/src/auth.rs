//! Password hashing and the identity attached to each request.
//!
//! Passwords are hashed with Argon2id using a random salt and stored as PHC
//! strings (`$argon2id$v=19$...`). [`Identity`] is the explicit two-state
//! value every request handler receives: either nobody is logged in, or the
//! session is bound to exactly one user id.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::FolioError;

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, FolioError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| FolioError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a PHC-format hash string. A malformed stored
/// hash is an error rather than a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, FolioError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| FolioError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Burns the same amount of work as a real verification. Called when the
/// username does not exist so that response time does not give that away.
pub fn verify_against_dummy(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let hash = DUMMY_HASH.get_or_init(|| hash_password("folio-dummy-password").ok());
    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
}

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(i32),
}

impl Identity {
    pub fn user_id(self) -> Option<i32> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(id) => Some(id),
        }
    }

    pub fn is_authenticated(self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }

    /// Gate for write operations: yields the user id or `Unauthorized`.
    pub fn require(self) -> Result<i32, FolioError> {
        self.user_id().ok_or(FolioError::Unauthorized)
    }
}
