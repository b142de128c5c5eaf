use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;
use crate::domain::order::{CartLine, NewOrder, NewOrderLine, Order, PlaceOrder, StatusChange};
use crate::domain::personnel::DeliveryPersonnel;
use crate::domain::ports::{CatalogRepository, OrderRepository};
use crate::domain::status::{OrderStatus, TransitionPolicy};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// `orders.total_amount` is `NUMERIC(12, 2)`: totals must stay below 10^10.
const TOTAL_AMOUNT_LIMIT: i64 = 10_000_000_000;

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    transitions: TransitionPolicy,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        transitions: TransitionPolicy,
    ) -> Self {
        Self {
            orders,
            catalog,
            transitions,
        }
    }

    /// Validates and prices the cart, then writes the order together with
    /// its line items. Nothing is written unless every check passes.
    pub fn place_order(&self, request: PlaceOrder) -> Result<Order, DomainError> {
        let (Some(customer), Some(restaurant)) = (
            non_empty(request.customer_id.as_deref()),
            non_empty(request.restaurant_id.as_deref()),
        ) else {
            return Err(DomainError::invalid("Missing required fields"));
        };
        if request.items.is_empty() {
            return Err(DomainError::invalid("Missing required fields"));
        }

        let customer_id = RecordId::parse_named(customer, "customer")?;
        let restaurant_id = RecordId::parse_named(restaurant, "restaurant")?;

        if !self.catalog.customer_exists(&customer_id)? {
            return Err(DomainError::not_found("Customer not found"));
        }
        if self.catalog.find_restaurant(&restaurant_id)?.is_none() {
            return Err(DomainError::not_found("Restaurant not found"));
        }

        let mut total_amount = BigDecimal::from(0);
        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let (menu_item_id, quantity) = validate_line(item)?;
            let menu_item = self.catalog.find_menu_item(&menu_item_id)?.ok_or_else(|| {
                DomainError::not_found(format!("Menu item with ID {} not found", menu_item_id))
            })?;

            total_amount += &menu_item.price * &BigDecimal::from(quantity);
            lines.push(NewOrderLine {
                id: RecordId::generate(),
                menu_item_id: menu_item.id,
                quantity,
            });
        }

        if total_amount >= BigDecimal::from(TOTAL_AMOUNT_LIMIT) {
            return Err(DomainError::invalid("Order total exceeds the maximum allowed amount"));
        }

        let delivery_time = non_empty(request.delivery_time.as_deref())
            .map(parse_delivery_time)
            .transpose()?;

        let order = self.orders.create(NewOrder {
            id: RecordId::generate(),
            customer_id,
            restaurant_id,
            total_amount,
            delivery_time,
            lines,
        })?;

        log::info!(
            "Order {} placed by customer {} ({} items, total {})",
            order.id,
            order.customer_id,
            order.items.len(),
            order.total_amount
        );
        Ok(order)
    }

    pub fn get_order(&self, order_id: &str) -> Result<Order, DomainError> {
        let id = RecordId::parse_named(order_id, "order")?;
        self.orders
            .find_by_id(&id)?
            .ok_or_else(|| DomainError::not_found("Order not found"))
    }

    pub fn list_available(&self) -> Result<Vec<Order>, DomainError> {
        self.orders.find_by_status(OrderStatus::Pending)
    }

    /// Claims a pending order for `personnel`.
    ///
    /// The status check and the assignment are one conditional write, so of
    /// two concurrent calls on the same order at most one succeeds.
    pub fn accept(&self, order_id: &str, personnel: &DeliveryPersonnel) -> Result<Order, DomainError> {
        if !personnel.is_available {
            return Err(DomainError::Forbidden(
                "You are currently unavailable to accept deliveries".to_string(),
            ));
        }
        let id = RecordId::parse_named(order_id, "order")?;

        let claimed = self.orders.compare_and_set_status(
            &id,
            OrderStatus::Pending,
            OrderStatus::Accepted,
            Some(&personnel.id),
        )?;

        match claimed {
            Some(order) => {
                log::info!("Order {} accepted by personnel {}", order.id, personnel.id);
                Ok(order)
            }
            None => match self.orders.find_by_id(&id)? {
                None => Err(DomainError::not_found("Order not found")),
                Some(order) => {
                    log::info!(
                        "Personnel {} lost order {} (status {})",
                        personnel.id,
                        order.id,
                        order.status
                    );
                    Err(DomainError::conflict("Order is no longer available"))
                }
            },
        }
    }

    pub fn set_status(&self, order_id: &str, status: Option<&str>) -> Result<StatusChange, DomainError> {
        let next: OrderStatus = status
            .ok_or(())
            .and_then(|s| s.parse().map_err(|_| ()))
            .map_err(|_| DomainError::invalid("Invalid or missing status"))?;
        let id = RecordId::parse_named(order_id, "order")?;

        let current = self
            .orders
            .find_by_id(&id)?
            .ok_or_else(|| DomainError::not_found("Order not found"))?;

        if current.status == next {
            return Ok(StatusChange {
                order: current,
                changed: false,
            });
        }
        if !self.transitions.permits(current.status, next) {
            return Err(DomainError::conflict(format!(
                "Order cannot move from {} to {}",
                current.status, next
            )));
        }

        let updated = self
            .orders
            .compare_and_set_status(&id, current.status, next, None)?
            .ok_or_else(|| DomainError::conflict("Order status was changed by another request"))?;

        log::info!("Order {} moved from {} to {}", updated.id, current.status, next);
        Ok(StatusChange {
            order: updated,
            changed: true,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validate_line(item: &CartLine) -> Result<(RecordId, i32), DomainError> {
    let invalid = || DomainError::invalid("Invalid item details");

    let menu_item = non_empty(item.menu_item.as_deref()).ok_or_else(invalid)?;
    let quantity = item
        .quantity
        .filter(|q| *q > 0)
        .and_then(|q| i32::try_from(q).ok())
        .ok_or_else(invalid)?;

    Ok((RecordId::parse_named(menu_item, "menu item")?, quantity))
}

fn parse_delivery_time(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| DomainError::invalid("Invalid deliveryTime format"))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Barrier;

    use chrono::Utc;

    use super::*;
    use crate::domain::catalog::{MenuItem, Restaurant};
    use crate::domain::personnel::PersonnelRole;
    use crate::domain::ports::UserRepository;
    use crate::domain::user::{NewUser, UserRole};
    use crate::infrastructure::memory::MemoryStore;

    struct Fixture {
        store: MemoryStore,
        service: OrderService,
        customer: RecordId,
        restaurant: RecordId,
        burger: RecordId,
        fries: RecordId,
    }

    fn fixture_with(transitions: TransitionPolicy) -> Fixture {
        let store = MemoryStore::new();
        let customer = UserRepository::create(
            &store,
            NewUser {
                id: RecordId::generate(),
                first_name: "Dana".into(),
                last_name: None,
                email: "dana@example.com".into(),
                password_hash: "hash".into(),
                role: UserRole::Customer,
                gender: None,
            },
        )
        .unwrap()
        .id;
        let restaurant = store
            .insert_restaurant(Restaurant {
                id: RecordId::generate(),
                owner_id: customer.clone(),
                restaurant_name: "Awesome Pizza Place".into(),
                address: "123 Pizza St".into(),
                cuisine_type: Some("Italian".into()),
                opening_hours: None,
                delivery_zone: None,
            })
            .unwrap()
            .id;
        let menu_item = |name: &str, price: &str| {
            store
                .insert_menu_item(MenuItem {
                    id: RecordId::generate(),
                    restaurant_id: restaurant.clone(),
                    item_name: name.into(),
                    description: None,
                    price: BigDecimal::from_str(price).unwrap(),
                    availability: true,
                })
                .unwrap()
                .id
        };
        let burger = menu_item("Cheeseburger", "9.99");
        let fries = menu_item("Fries", "5.00");

        let service = OrderService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            transitions,
        );
        Fixture {
            store,
            service,
            customer,
            restaurant,
            burger,
            fries,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(TransitionPolicy::permissive())
    }

    fn line(menu_item: &RecordId, quantity: i64) -> CartLine {
        CartLine {
            menu_item: Some(menu_item.to_string()),
            quantity: Some(quantity),
        }
    }

    fn request(f: &Fixture, items: Vec<CartLine>) -> PlaceOrder {
        PlaceOrder {
            customer_id: Some(f.customer.to_string()),
            restaurant_id: Some(f.restaurant.to_string()),
            items,
            delivery_time: None,
        }
    }

    fn courier(available: bool) -> DeliveryPersonnel {
        DeliveryPersonnel {
            id: RecordId::generate(),
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            password_hash: "hash".into(),
            contact_details: None,
            vehicle_type: None,
            is_available: available,
            token_version: 1,
            role: PersonnelRole::Delivery,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stored_orders(store: &MemoryStore) -> usize {
        OrderStatus::ALL
            .iter()
            .map(|s| OrderRepository::find_by_status(store, *s).unwrap().len())
            .sum()
    }

    fn place(f: &Fixture) -> Order {
        f.service
            .place_order(request(f, vec![line(&f.burger, 1)]))
            .unwrap()
    }

    // ── Order composition ────────────────────────────────────────────────────

    #[test]
    fn total_is_sum_of_price_times_quantity() {
        let f = fixture();
        let order = f
            .service
            .place_order(request(&f, vec![line(&f.burger, 2), line(&f.fries, 1)]))
            .unwrap();

        assert_eq!(order.total_amount, BigDecimal::from_str("24.98").unwrap());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.delivery_personnel_id, None);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].menu_item_id, f.burger);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[1].menu_item_id, f.fries);
    }

    #[test]
    fn missing_customer_restaurant_or_items_is_invalid() {
        let f = fixture();

        let mut no_customer = request(&f, vec![line(&f.burger, 1)]);
        no_customer.customer_id = None;
        let mut blank_restaurant = request(&f, vec![line(&f.burger, 1)]);
        blank_restaurant.restaurant_id = Some("  ".into());
        let no_items = request(&f, vec![]);

        for req in [no_customer, blank_restaurant, no_items] {
            let err = f.service.place_order(req).unwrap_err();
            assert!(matches!(err, DomainError::InvalidRequest(ref m) if m == "Missing required fields"));
        }
    }

    #[test]
    fn unknown_customer_or_restaurant_is_not_found() {
        let f = fixture();

        let mut req = request(&f, vec![line(&f.burger, 1)]);
        req.customer_id = Some(RecordId::generate().to_string());
        let err = f.service.place_order(req).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == "Customer not found"));

        let mut req = request(&f, vec![line(&f.burger, 1)]);
        req.restaurant_id = Some(RecordId::generate().to_string());
        let err = f.service.place_order(req).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == "Restaurant not found"));
    }

    #[test]
    fn unknown_menu_item_is_not_found_and_nothing_is_persisted() {
        let f = fixture();
        let missing = RecordId::generate();

        let err = f
            .service
            .place_order(request(&f, vec![line(&f.burger, 1), line(&missing, 1)]))
            .unwrap_err();

        match err {
            DomainError::NotFound(msg) => assert!(msg.contains(missing.as_str())),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(stored_orders(&f.store), 0);
    }

    #[test]
    fn item_without_menu_item_or_positive_quantity_is_invalid() {
        let f = fixture();
        let bad_lines = [
            CartLine {
                menu_item: None,
                quantity: Some(1),
            },
            CartLine {
                menu_item: Some(f.burger.to_string()),
                quantity: None,
            },
            line(&f.burger, 0),
            line(&f.burger, -3),
            line(&f.burger, i64::from(i32::MAX) + 1),
        ];

        for bad in bad_lines {
            let err = f
                .service
                .place_order(request(&f, vec![line(&f.fries, 1), bad]))
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidRequest(ref m) if m == "Invalid item details"));
        }
        assert_eq!(stored_orders(&f.store), 0);
    }

    #[test]
    fn total_beyond_storable_amount_is_invalid_and_nothing_is_persisted() {
        let f = fixture();

        let err = f
            .service
            .place_order(request(&f, vec![line(&f.burger, i64::from(i32::MAX))]))
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidRequest(ref m) if m == "Order total exceeds the maximum allowed amount"
        ));
        assert_eq!(stored_orders(&f.store), 0);

        // 1_000_000_000 x 9.99 still fits below 10^10.
        let order = f
            .service
            .place_order(request(&f, vec![line(&f.burger, 1_000_000_000)]))
            .unwrap();
        assert_eq!(order.total_amount, BigDecimal::from_str("9990000000.00").unwrap());
    }

    #[test]
    fn malformed_ids_are_invalid_requests() {
        let f = fixture();
        let mut req = request(&f, vec![line(&f.burger, 1)]);
        req.customer_id = Some("not-an-id".into());
        assert!(matches!(
            f.service.place_order(req),
            Err(DomainError::InvalidRequest(_))
        ));

        let req = request(
            &f,
            vec![CartLine {
                menu_item: Some("123".into()),
                quantity: Some(1),
            }],
        );
        assert!(matches!(
            f.service.place_order(req),
            Err(DomainError::InvalidRequest(_))
        ));
    }

    #[test]
    fn delivery_time_accepts_common_formats() {
        let f = fixture();
        for raw in ["2024-11-17T11:00:00Z", "2024-11-17T11:00:00", "2024-11-17 11:00:00", "2024-11-17"] {
            let mut req = request(&f, vec![line(&f.burger, 1)]);
            req.delivery_time = Some(raw.into());
            let order = f.service.place_order(req).unwrap();
            let expected = if raw.len() == 10 { "2024-11-17T00:00:00Z" } else { "2024-11-17T11:00:00Z" };
            assert_eq!(
                order.delivery_time,
                Some(DateTime::parse_from_rfc3339(expected).unwrap().with_timezone(&Utc))
            );
        }
    }

    #[test]
    fn unparseable_delivery_time_is_invalid_and_nothing_is_persisted() {
        let f = fixture();
        let mut req = request(&f, vec![line(&f.burger, 1)]);
        req.delivery_time = Some("tomorrow-ish".into());

        let err = f.service.place_order(req).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(ref m) if m == "Invalid deliveryTime format"));
        assert_eq!(stored_orders(&f.store), 0);
    }

    #[test]
    fn absent_delivery_time_is_allowed() {
        let f = fixture();
        let order = place(&f);
        assert_eq!(order.delivery_time, None);
    }

    // ── Acceptance ───────────────────────────────────────────────────────────

    #[test]
    fn accept_assigns_personnel_and_moves_to_accepted() {
        let f = fixture();
        let order = place(&f);
        let rider = courier(true);

        let accepted = f.service.accept(order.id.as_str(), &rider).unwrap();

        assert_eq!(accepted.status, OrderStatus::Accepted);
        assert_eq!(accepted.delivery_personnel_id, Some(rider.id));
        assert!(f.service.list_available().unwrap().is_empty());
    }

    #[test]
    fn unavailable_personnel_is_forbidden() {
        let f = fixture();
        let order = place(&f);

        let err = f.service.accept(order.id.as_str(), &courier(false)).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(f.service.get_order(order.id.as_str()).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn accept_rejects_malformed_and_unknown_ids() {
        let f = fixture();
        let rider = courier(true);

        let err = f.service.accept("12345", &rider).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(ref m) if m == "Invalid order ID format"));

        let err = f
            .service
            .accept(RecordId::generate().as_str(), &rider)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref m) if m == "Order not found"));
    }

    #[test]
    fn accept_on_already_accepted_order_conflicts_and_keeps_first_claim() {
        let f = fixture();
        let order = place(&f);
        let first = courier(true);
        let second = courier(true);

        f.service.accept(order.id.as_str(), &first).unwrap();
        let err = f.service.accept(order.id.as_str(), &second).unwrap_err();

        assert!(matches!(err, DomainError::Conflict(ref m) if m == "Order is no longer available"));
        let stored = f.service.get_order(order.id.as_str()).unwrap();
        assert_eq!(stored.delivery_personnel_id, Some(first.id));
    }

    #[test]
    fn accept_on_any_non_pending_status_conflicts_without_change() {
        let f = fixture();
        for status in OrderStatus::ALL.into_iter().filter(|s| *s != OrderStatus::Pending) {
            let order = place(&f);
            f.service
                .set_status(order.id.as_str(), Some(status.as_str()))
                .unwrap();
            let before = f.service.get_order(order.id.as_str()).unwrap();

            let err = f.service.accept(order.id.as_str(), &courier(true)).unwrap_err();

            assert!(matches!(err, DomainError::Conflict(_)));
            assert_eq!(f.service.get_order(order.id.as_str()).unwrap(), before);
        }
    }

    #[test]
    fn concurrent_accepts_have_exactly_one_winner() {
        let f = fixture();
        let order = place(&f);
        let riders: Vec<DeliveryPersonnel> = (0..8).map(|_| courier(true)).collect();
        let barrier = Barrier::new(riders.len());

        let results: Vec<Result<Order, DomainError>> = std::thread::scope(|s| {
            let handles: Vec<_> = riders
                .iter()
                .map(|rider| {
                    let service = &f.service;
                    let barrier = &barrier;
                    let id = order.id.as_str();
                    s.spawn(move || {
                        barrier.wait();
                        service.accept(id, rider)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners: Vec<&Order> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(DomainError::Conflict(_)))));

        let stored = f.service.get_order(order.id.as_str()).unwrap();
        assert_eq!(stored.delivery_personnel_id, winners[0].delivery_personnel_id);
    }

    // ── Status updates ───────────────────────────────────────────────────────

    #[test]
    fn set_status_to_same_value_is_idempotent() {
        let f = fixture();
        let order = place(&f);

        let change = f
            .service
            .set_status(order.id.as_str(), Some("Pending"))
            .unwrap();

        assert!(!change.changed);
        assert_eq!(change.order, order);
    }

    #[test]
    fn set_status_with_unknown_value_is_invalid_from_every_status() {
        let f = fixture();
        for status in OrderStatus::ALL {
            let order = place(&f);
            f.service
                .set_status(order.id.as_str(), Some(status.as_str()))
                .unwrap();

            for bad in [Some("Shipped"), Some("pending"), Some(""), None] {
                let err = f.service.set_status(order.id.as_str(), bad).unwrap_err();
                assert!(matches!(err, DomainError::InvalidRequest(ref m) if m == "Invalid or missing status"));
            }
            assert_eq!(f.service.get_order(order.id.as_str()).unwrap().status, status);
        }
    }

    #[test]
    fn permissive_policy_reaches_any_status_from_any_other() {
        let f = fixture();
        let order = place(&f);
        for next in [
            OrderStatus::Delivered,
            OrderStatus::Pending,
            OrderStatus::Rescheduled,
            OrderStatus::Cancelled,
            OrderStatus::OutForDelivery,
        ] {
            let change = f
                .service
                .set_status(order.id.as_str(), Some(next.as_str()))
                .unwrap();
            assert!(change.changed);
            assert_eq!(change.order.status, next);
        }
    }

    #[test]
    fn restrictive_policy_rejects_disallowed_transition() {
        let f = fixture_with(
            TransitionPolicy::permissive().allow(OrderStatus::Delivered, &[]),
        );
        let order = place(&f);
        f.service
            .set_status(order.id.as_str(), Some("Delivered"))
            .unwrap();

        let err = f
            .service
            .set_status(order.id.as_str(), Some("Pending"))
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(
            f.service.get_order(order.id.as_str()).unwrap().status,
            OrderStatus::Delivered
        );
    }

    #[test]
    fn set_status_on_unknown_or_malformed_order() {
        let f = fixture();
        assert!(matches!(
            f.service.set_status(RecordId::generate().as_str(), Some("Delivered")),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            f.service.set_status("zzz", Some("Delivered")),
            Err(DomainError::InvalidRequest(_))
        ));
    }

    #[test]
    fn list_available_returns_only_pending_orders() {
        let f = fixture();
        let pending = place(&f);
        let cancelled = place(&f);
        f.service
            .set_status(cancelled.id.as_str(), Some("Cancelled"))
            .unwrap();

        let available = f.service.list_available().unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, pending.id);
    }
}
