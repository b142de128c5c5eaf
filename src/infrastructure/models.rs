use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::schema::{delivery_personnel, menu_items, order_items, orders, restaurants, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: String,
    pub customer_id: String,
    pub restaurant_id: String,
    pub order_date: DateTime<Utc>,
    pub order_status: String,
    pub total_amount: BigDecimal,
    pub delivery_time: Option<DateTime<Utc>>,
    pub delivery_personnel_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub id: &'a str,
    pub customer_id: &'a str,
    pub restaurant_id: &'a str,
    pub order_status: &'a str,
    pub total_amount: &'a BigDecimal,
    pub delivery_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i32,
    pub position: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow<'a> {
    pub id: &'a str,
    pub order_id: &'a str,
    pub menu_item_id: &'a str,
    pub quantity: i32,
    pub position: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RestaurantRow {
    pub id: String,
    pub owner_id: String,
    pub restaurant_name: String,
    pub address: String,
    pub cuisine_type: Option<String>,
    pub opening_hours: Option<String>,
    pub delivery_zone: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuItemRow {
    pub id: String,
    pub restaurant_id: String,
    pub item_name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub availability: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = delivery_personnel)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PersonnelRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub contact_details: Option<String>,
    pub vehicle_type: Option<String>,
    pub is_available: bool,
    pub token_version: i32,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = delivery_personnel)]
pub struct NewPersonnelRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub contact_details: Option<&'a str>,
    pub vehicle_type: Option<&'a str>,
    pub role: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub gender: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub id: &'a str,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub gender: Option<&'a str>,
}
