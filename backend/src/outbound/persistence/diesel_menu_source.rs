//! PostgreSQL-backed menu source adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MenuSource, MenuSourceError};
use crate::domain::{MenuCatalog, MenuItem, ProductId, ProductInfo, RestaurantId, RestaurantInfo};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, map_pool_error_message};
use super::models::{MenuItemRow, ProductRow, RestaurantRow};
use super::pool::{DbPool, PoolError};
use super::schema::{products, restaurant_menu_items, restaurants};

/// Diesel-backed implementation of the menu source port.
#[derive(Clone)]
pub struct DieselMenuSource {
    pool: DbPool,
}

impl DieselMenuSource {
    /// Create a new menu source with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MenuSourceError {
    MenuSourceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> MenuSourceError {
    move |error| match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => MenuSourceError::connection(message),
        DieselFailure::Query(message) => MenuSourceError::query(message),
    }
}

#[async_trait]
impl MenuSource for DieselMenuSource {
    async fn fetch_catalog(&self) -> Result<MenuCatalog, MenuSourceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let restaurant_rows: Vec<RestaurantRow> = restaurants::table
            .select(RestaurantRow::as_select())
            .order_by((restaurants::name.asc(), restaurants::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("load restaurants"))?;
        let product_rows: Vec<ProductRow> = products::table
            .select(ProductRow::as_select())
            .order_by(products::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("load products"))?;
        let item_rows: Vec<MenuItemRow> = restaurant_menu_items::table
            .select(MenuItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("load menu items"))?;

        Ok(MenuCatalog {
            restaurants: restaurant_rows
                .into_iter()
                .map(|row| RestaurantInfo {
                    id: RestaurantId::new(row.id),
                    name: row.name,
                    address: row.address,
                })
                .collect(),
            products: product_rows
                .into_iter()
                .map(|row| ProductInfo {
                    id: ProductId::new(row.id),
                    name: row.name,
                })
                .collect(),
            menu_items: item_rows
                .into_iter()
                .map(|row| MenuItem {
                    restaurant_id: RestaurantId::new(row.restaurant_id),
                    product_id: ProductId::new(row.product_id),
                    availability: row.availability,
                })
                .collect(),
        })
    }
}
