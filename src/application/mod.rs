pub mod order_service;
pub mod passwords;
pub mod personnel_service;
pub mod user_service;

pub use order_service::OrderService;
pub use personnel_service::PersonnelService;
pub use user_service::UserService;
