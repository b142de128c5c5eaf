use crate::domain::errors::DomainError;

pub fn hash(password: &str, cost: u32) -> Result<String, DomainError> {
    bcrypt::hash(password, cost).map_err(|e| DomainError::Internal(format!("password hashing failed: {}", e)))
}

/// A stored hash that bcrypt cannot parse counts as a mismatch.
pub fn matches(password: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(password, stored_hash) {
        Ok(ok) => ok,
        Err(e) => {
            log::error!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}
