use diesel::dsl::exists;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::catalog::{MenuItem, Restaurant};
use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;
use crate::domain::ports::CatalogRepository;
use crate::schema::{menu_items, restaurants, users};

use super::models::{MenuItemRow, RestaurantRow};
use super::stored_id;

fn into_restaurant(row: RestaurantRow) -> Result<Restaurant, DomainError> {
    Ok(Restaurant {
        id: stored_id(row.id)?,
        owner_id: stored_id(row.owner_id)?,
        restaurant_name: row.restaurant_name,
        address: row.address,
        cuisine_type: row.cuisine_type,
        opening_hours: row.opening_hours,
        delivery_zone: row.delivery_zone,
    })
}

fn into_menu_item(row: MenuItemRow) -> Result<MenuItem, DomainError> {
    Ok(MenuItem {
        id: stored_id(row.id)?,
        restaurant_id: stored_id(row.restaurant_id)?,
        item_name: row.item_name,
        description: row.description,
        price: row.price,
        availability: row.availability,
    })
}

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn customer_exists(&self, id: &RecordId) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(
            diesel::select(exists(users::table.filter(users::id.eq(id.as_str()))))
                .get_result(&mut conn)?,
        )
    }

    fn find_restaurant(&self, id: &RecordId) -> Result<Option<Restaurant>, DomainError> {
        let mut conn = self.pool.get()?;
        restaurants::table
            .filter(restaurants::id.eq(id.as_str()))
            .select(RestaurantRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_restaurant)
            .transpose()
    }

    fn find_menu_item(&self, id: &RecordId) -> Result<Option<MenuItem>, DomainError> {
        let mut conn = self.pool.get()?;
        menu_items::table
            .filter(menu_items::id.eq(id.as_str()))
            .select(MenuItemRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_menu_item)
            .transpose()
    }

    fn insert_restaurant(&self, restaurant: Restaurant) -> Result<Restaurant, DomainError> {
        let mut conn = self.pool.get()?;
        let row: RestaurantRow = diesel::insert_into(restaurants::table)
            .values(&RestaurantRow {
                id: restaurant.id.to_string(),
                owner_id: restaurant.owner_id.to_string(),
                restaurant_name: restaurant.restaurant_name,
                address: restaurant.address,
                cuisine_type: restaurant.cuisine_type,
                opening_hours: restaurant.opening_hours,
                delivery_zone: restaurant.delivery_zone,
            })
            .returning(RestaurantRow::as_returning())
            .get_result(&mut conn)?;
        into_restaurant(row)
    }

    fn insert_menu_item(&self, item: MenuItem) -> Result<MenuItem, DomainError> {
        let mut conn = self.pool.get()?;
        let row: MenuItemRow = diesel::insert_into(menu_items::table)
            .values(&MenuItemRow {
                id: item.id.to_string(),
                restaurant_id: item.restaurant_id.to_string(),
                item_name: item.item_name,
                description: item.description,
                price: item.price,
                availability: item.availability,
            })
            .returning(MenuItemRow::as_returning())
            .get_result(&mut conn)?;
        into_menu_item(row)
    }
}
