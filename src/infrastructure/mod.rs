pub mod catalog_repo;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod personnel_repo;
pub mod tokens;
pub mod user_repo;

use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;

pub use catalog_repo::DieselCatalogRepository;
pub use memory::MemoryStore;
pub use order_repo::DieselOrderRepository;
pub use personnel_repo::DieselPersonnelRepository;
pub use tokens::JwtCredentials;
pub use user_repo::DieselUserRepository;

/// Ids read back from storage were validated on the way in; a bad one
/// means the table was written by something else.
pub(crate) fn stored_id(raw: String) -> Result<RecordId, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::Internal(format!("stored id '{}' is malformed", raw)))
}
