//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; adapters convert them to
//! domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};

use super::schema::{geocoded_addresses, orders, products, restaurant_menu_items, restaurants};

/// Row struct for reading from the geocoded_addresses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = geocoded_addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GeocodedAddressRow {
    pub raw_address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for geocode upserts; timestamps default in the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = geocoded_addresses)]
pub(crate) struct NewGeocodedAddressRow<'a> {
    pub raw_address: &'a str,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub provider: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestaurantRow {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurant_menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MenuItemRow {
    pub restaurant_id: i64,
    pub product_id: i64,
    pub availability: bool,
}

/// Row struct for reading pending orders.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub phonenumber: String,
    pub address: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub comment: String,
    pub cooking_restaurant_id: Option<i64>,
}

/// Order line read through raw SQL with the price already in minor units.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct OrderItemRow {
    #[diesel(sql_type = BigInt)]
    pub order_id: i64,
    #[diesel(sql_type = BigInt)]
    pub product_id: i64,
    #[diesel(sql_type = Integer)]
    pub quantity: i32,
    #[diesel(sql_type = BigInt)]
    pub price_minor: i64,
}
