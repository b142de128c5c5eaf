use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;
use crate::domain::order::{NewOrder, Order, OrderLineItem};
use crate::domain::ports::OrderRepository;
use crate::domain::status::OrderStatus;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};
use super::stored_id;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DomainError::NotFound(format!("Referenced record not found: {}", info.message()))
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

fn into_order(row: OrderRow, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
    let order_id = stored_id(row.id)?;
    let items = items
        .into_iter()
        .map(|item| {
            Ok(OrderLineItem {
                id: stored_id(item.id)?,
                order_id: order_id.clone(),
                menu_item_id: stored_id(item.menu_item_id)?,
                quantity: item.quantity,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;

    Ok(Order {
        id: order_id,
        customer_id: stored_id(row.customer_id)?,
        restaurant_id: stored_id(row.restaurant_id)?,
        order_date: row.order_date,
        status: row
            .order_status
            .parse()
            .map_err(|_| DomainError::Internal(format!("stored order status '{}'", row.order_status)))?,
        total_amount: row.total_amount,
        delivery_time: row.delivery_time,
        delivery_personnel_id: row.delivery_personnel_id.map(stored_id).transpose()?,
        items,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn load_items(conn: &mut PgConnection, order: &OrderRow) -> Result<Vec<OrderItemRow>, DomainError> {
    Ok(OrderItemRow::belonging_to(order)
        .select(OrderItemRow::as_select())
        .order(order_items::position.asc())
        .load(conn)?)
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let row: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order.id.as_str(),
                    customer_id: order.customer_id.as_str(),
                    restaurant_id: order.restaurant_id.as_str(),
                    order_status: OrderStatus::Pending.as_str(),
                    total_amount: &order.total_amount,
                    delivery_time: order.delivery_time,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Insert its line items, keeping cart order
            let new_items: Vec<NewOrderItemRow> = order
                .lines
                .iter()
                .enumerate()
                .map(|(position, line)| NewOrderItemRow {
                    id: line.id.as_str(),
                    order_id: order.id.as_str(),
                    menu_item_id: line.menu_item_id.as_str(),
                    quantity: line.quantity,
                    position: position as i32,
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            let items = load_items(conn, &row)?;
            into_order(row, items)
        })
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id.as_str()))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = load_items(&mut conn, &order)?;
        into_order(order, items).map(Some)
    }

    fn find_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<OrderRow> = orders::table
            .filter(orders::order_status.eq(status.as_str()))
            .select(OrderRow::as_select())
            .order(orders::order_date.asc())
            .load(&mut conn)?;

        let items = OrderItemRow::belonging_to(&rows)
            .select(OrderItemRow::as_select())
            .order(order_items::position.asc())
            .load::<OrderItemRow>(&mut conn)?
            .grouped_by(&rows);

        rows.into_iter()
            .zip(items)
            .map(|(row, items)| into_order(row, items))
            .collect()
    }

    fn compare_and_set_status(
        &self,
        id: &RecordId,
        expected: OrderStatus,
        next: OrderStatus,
        assignee: Option<&RecordId>,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let target = orders::table
                .filter(orders::id.eq(id.as_str()))
                .filter(orders::order_status.eq(expected.as_str()));

            // Single conditional UPDATE: the status check and the write
            // cannot be split by a concurrent request.
            let updated: Option<OrderRow> = match assignee {
                Some(assignee) => diesel::update(target)
                    .set((
                        orders::order_status.eq(next.as_str()),
                        orders::delivery_personnel_id.eq(Some(assignee.as_str())),
                        orders::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(OrderRow::as_returning())
                    .get_result(conn)
                    .optional()?,
                None => diesel::update(target)
                    .set((
                        orders::order_status.eq(next.as_str()),
                        orders::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(OrderRow::as_returning())
                    .get_result(conn)
                    .optional()?,
            };

            let Some(row) = updated else {
                return Ok(None);
            };
            let items = load_items(conn, &row)?;
            into_order(row, items).map(Some)
        })
    }
}
