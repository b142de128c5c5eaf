use super::catalog::{MenuItem, Restaurant};
use super::errors::DomainError;
use super::id::RecordId;
use super::order::{NewOrder, Order};
use super::personnel::{Credential, DeliveryPersonnel, NewPersonnel, PersonnelRole, TokenScope};
use super::status::OrderStatus;
use super::user::{NewUser, User};

pub trait OrderRepository: Send + Sync + 'static {
    /// Writes the order and all of its line items atomically.
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: &RecordId) -> Result<Option<Order>, DomainError>;
    fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError>;
    /// Sets `next` (and `assignee`, when given) only if the order still has
    /// status `expected`. `None` means no row matched.
    fn compare_and_set_status(
        &self,
        id: &RecordId,
        expected: OrderStatus,
        next: OrderStatus,
        assignee: Option<&RecordId>,
    ) -> Result<Option<Order>, DomainError>;
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn customer_exists(&self, id: &RecordId) -> Result<bool, DomainError>;
    fn find_restaurant(&self, id: &RecordId) -> Result<Option<Restaurant>, DomainError>;
    fn find_menu_item(&self, id: &RecordId) -> Result<Option<MenuItem>, DomainError>;
    fn insert_restaurant(&self, restaurant: Restaurant) -> Result<Restaurant, DomainError>;
    fn insert_menu_item(&self, item: MenuItem) -> Result<MenuItem, DomainError>;
}

pub trait PersonnelRepository: Send + Sync + 'static {
    fn create(&self, personnel: NewPersonnel) -> Result<DeliveryPersonnel, DomainError>;
    fn find_by_id(&self, id: &RecordId) -> Result<Option<DeliveryPersonnel>, DomainError>;
    fn find_by_email(&self, email: &str) -> Result<Option<DeliveryPersonnel>, DomainError>;
    fn list_by_role(&self, role: PersonnelRole) -> Result<Vec<DeliveryPersonnel>, DomainError>;
    /// Increments the token epoch and returns the updated record.
    fn bump_token_version(&self, id: &RecordId) -> Result<Option<DeliveryPersonnel>, DomainError>;
    fn set_availability(
        &self,
        id: &RecordId,
        is_available: bool,
    ) -> Result<Option<DeliveryPersonnel>, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, user: NewUser) -> Result<User, DomainError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
}

pub trait CredentialIssuer: Send + Sync + 'static {
    fn issue(
        &self,
        scope: TokenScope,
        subject: &RecordId,
        token_version: i32,
    ) -> Result<String, DomainError>;
    fn verify(&self, token: &str) -> Result<Credential, DomainError>;
}
