use bigdecimal::BigDecimal;

use super::id::RecordId;

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub id: RecordId,
    pub owner_id: RecordId,
    pub restaurant_name: String,
    pub address: String,
    pub cuisine_type: Option<String>,
    pub opening_hours: Option<String>,
    pub delivery_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: RecordId,
    pub restaurant_id: RecordId,
    pub item_name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub availability: bool,
}
