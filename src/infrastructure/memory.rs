//! In-memory implementation of every repository port.
//!
//! Used by the test suites and for running the service without Postgres.
//! A single mutex guards all collections, so each port call is atomic in
//! the same way a single SQL statement is.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::domain::catalog::{MenuItem, Restaurant};
use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;
use crate::domain::order::{NewOrder, Order, OrderLineItem};
use crate::domain::personnel::{DeliveryPersonnel, NewPersonnel, PersonnelRole};
use crate::domain::ports::{CatalogRepository, OrderRepository, PersonnelRepository, UserRepository};
use crate::domain::status::OrderStatus;
use crate::domain::user::{AccountStatus, NewUser, User};

#[derive(Default)]
struct State {
    users: Vec<User>,
    restaurants: HashMap<RecordId, Restaurant>,
    menu_items: HashMap<RecordId, MenuItem>,
    orders: Vec<Order>,
    personnel: Vec<DeliveryPersonnel>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("memory store lock poisoned".to_string()))
    }
}

impl OrderRepository for MemoryStore {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut state = self.state()?;
        let now = Utc::now();
        let items = order
            .lines
            .into_iter()
            .map(|line| OrderLineItem {
                id: line.id,
                order_id: order.id.clone(),
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
            })
            .collect();

        let created = Order {
            id: order.id,
            customer_id: order.customer_id,
            restaurant_id: order.restaurant_id,
            order_date: now,
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            delivery_time: order.delivery_time,
            delivery_personnel_id: None,
            items,
            created_at: now,
            updated_at: now,
        };
        state.orders.push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<Order>, DomainError> {
        let state = self.state()?;
        Ok(state.orders.iter().find(|o| &o.id == id).cloned())
    }

    fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        let state = self.state()?;
        Ok(state
            .orders
            .iter()
            .filter(|o| o.status == status)
            .cloned()
            .collect())
    }

    fn compare_and_set_status(
        &self,
        id: &RecordId,
        expected: OrderStatus,
        next: OrderStatus,
        assignee: Option<&RecordId>,
    ) -> Result<Option<Order>, DomainError> {
        let mut state = self.state()?;
        let Some(order) = state
            .orders
            .iter_mut()
            .find(|o| &o.id == id && o.status == expected)
        else {
            return Ok(None);
        };

        order.status = next;
        if let Some(assignee) = assignee {
            order.delivery_personnel_id = Some(assignee.clone());
        }
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }
}

impl CatalogRepository for MemoryStore {
    fn customer_exists(&self, id: &RecordId) -> Result<bool, DomainError> {
        let state = self.state()?;
        Ok(state.users.iter().any(|u| &u.id == id))
    }

    fn find_restaurant(&self, id: &RecordId) -> Result<Option<Restaurant>, DomainError> {
        let state = self.state()?;
        Ok(state.restaurants.get(id).cloned())
    }

    fn find_menu_item(&self, id: &RecordId) -> Result<Option<MenuItem>, DomainError> {
        let state = self.state()?;
        Ok(state.menu_items.get(id).cloned())
    }

    fn insert_restaurant(&self, restaurant: Restaurant) -> Result<Restaurant, DomainError> {
        let mut state = self.state()?;
        state
            .restaurants
            .insert(restaurant.id.clone(), restaurant.clone());
        Ok(restaurant)
    }

    fn insert_menu_item(&self, item: MenuItem) -> Result<MenuItem, DomainError> {
        let mut state = self.state()?;
        if !state.restaurants.contains_key(&item.restaurant_id) {
            return Err(DomainError::not_found("Restaurant not found"));
        }
        state.menu_items.insert(item.id.clone(), item.clone());
        Ok(item)
    }
}

impl PersonnelRepository for MemoryStore {
    fn create(&self, personnel: NewPersonnel) -> Result<DeliveryPersonnel, DomainError> {
        let mut state = self.state()?;
        if state.personnel.iter().any(|p| p.email == personnel.email) {
            return Err(DomainError::invalid(format!(
                "Email {} is already registered",
                personnel.email
            )));
        }

        let now = Utc::now();
        let created = DeliveryPersonnel {
            id: personnel.id,
            name: personnel.name,
            email: personnel.email,
            password_hash: personnel.password_hash,
            contact_details: Some(personnel.contact_details),
            vehicle_type: Some(personnel.vehicle_type),
            is_available: true,
            token_version: 0,
            role: personnel.role,
            created_at: now,
            updated_at: now,
        };
        state.personnel.push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<DeliveryPersonnel>, DomainError> {
        let state = self.state()?;
        Ok(state.personnel.iter().find(|p| &p.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<DeliveryPersonnel>, DomainError> {
        let state = self.state()?;
        Ok(state.personnel.iter().find(|p| p.email == email).cloned())
    }

    fn list_by_role(&self, role: PersonnelRole) -> Result<Vec<DeliveryPersonnel>, DomainError> {
        let state = self.state()?;
        Ok(state
            .personnel
            .iter()
            .filter(|p| p.role == role)
            .cloned()
            .collect())
    }

    fn bump_token_version(&self, id: &RecordId) -> Result<Option<DeliveryPersonnel>, DomainError> {
        let mut state = self.state()?;
        Ok(state.personnel.iter_mut().find(|p| &p.id == id).map(|p| {
            p.token_version += 1;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    fn set_availability(
        &self,
        id: &RecordId,
        is_available: bool,
    ) -> Result<Option<DeliveryPersonnel>, DomainError> {
        let mut state = self.state()?;
        Ok(state.personnel.iter_mut().find(|p| &p.id == id).map(|p| {
            p.is_available = is_available;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }
}

impl UserRepository for MemoryStore {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut state = self.state()?;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::invalid(format!(
                "Email {} is already registered",
                user.email
            )));
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            gender: user.gender,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let state = self.state()?;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::order::NewOrderLine;

    fn new_order() -> NewOrder {
        NewOrder {
            id: RecordId::generate(),
            customer_id: RecordId::generate(),
            restaurant_id: RecordId::generate(),
            total_amount: BigDecimal::from_str("12.50").unwrap(),
            delivery_time: None,
            lines: vec![NewOrderLine {
                id: RecordId::generate(),
                menu_item_id: RecordId::generate(),
                quantity: 1,
            }],
        }
    }

    #[test]
    fn compare_and_set_only_matches_expected_status() {
        let store = MemoryStore::new();
        let order = OrderRepository::create(&store, new_order()).unwrap();
        let courier = RecordId::generate();

        let first = store
            .compare_and_set_status(&order.id, OrderStatus::Pending, OrderStatus::Accepted, Some(&courier))
            .unwrap();
        assert!(first.is_some());

        let second = store
            .compare_and_set_status(&order.id, OrderStatus::Pending, OrderStatus::Accepted, None)
            .unwrap();
        assert!(second.is_none());

        let stored = OrderRepository::find_by_id(&store, &order.id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Accepted);
        assert_eq!(stored.delivery_personnel_id, Some(courier));
    }

    #[test]
    fn created_line_items_point_back_at_their_order() {
        let store = MemoryStore::new();
        let order = OrderRepository::create(&store, new_order()).unwrap();
        assert!(order.items.iter().all(|i| i.order_id == order.id));
    }

    #[test]
    fn bump_token_version_increments_by_one() {
        let store = MemoryStore::new();
        let created = PersonnelRepository::create(
            &store,
            NewPersonnel {
                id: RecordId::generate(),
                name: "Asha".into(),
                email: "asha@example.com".into(),
                password_hash: "hash".into(),
                contact_details: "555".into(),
                vehicle_type: "Bike".into(),
                role: PersonnelRole::Delivery,
            },
        )
        .unwrap();

        let bumped = store.bump_token_version(&created.id).unwrap().unwrap();
        assert_eq!(bumped.token_version, created.token_version + 1);
        assert!(store
            .bump_token_version(&RecordId::generate())
            .unwrap()
            .is_none());
    }
}
