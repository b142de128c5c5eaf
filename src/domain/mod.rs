pub mod catalog;
pub mod errors;
pub mod id;
pub mod order;
pub mod personnel;
pub mod ports;
pub mod status;
pub mod user;

pub use errors::DomainError;
pub use id::RecordId;
pub use status::{OrderStatus, TransitionPolicy};
