//! In-memory order and menu sources plus small builders.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::ports::{MenuSource, MenuSourceError, OrderSource, OrderSourceError};
use crate::domain::{
    CustomerContact, MenuCatalog, OrderId, OrderLine, OrderStatus, PaymentMethod, PendingOrder,
    ProductId, RestaurantId, RestaurantInfo,
};

/// Order source returning a fixed list.
pub struct StaticOrderSource(pub Vec<PendingOrder>);

#[async_trait]
impl OrderSource for StaticOrderSource {
    async fn pending_orders(&self) -> Result<Vec<PendingOrder>, OrderSourceError> {
        Ok(self.0.clone())
    }
}

/// Menu source returning a fixed catalogue and counting fetches.
pub struct StaticMenuSource {
    catalog: MenuCatalog,
    fetches: AtomicUsize,
}

impl StaticMenuSource {
    pub fn new(catalog: MenuCatalog) -> Self {
        Self {
            catalog,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of times the catalogue was read.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MenuSource for StaticMenuSource {
    async fn fetch_catalog(&self) -> Result<MenuCatalog, MenuSourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalog.clone())
    }
}

/// New order at `address` containing one unit of each product.
pub fn order_with_products(id: i64, address: &str, products: &[i64]) -> PendingOrder {
    PendingOrder {
        id: OrderId::new(id),
        status: OrderStatus::New,
        payment_method: Some(PaymentMethod::Cash),
        customer: CustomerContact {
            firstname: "Anna".to_owned(),
            lastname: "Smirnova".to_owned(),
            phonenumber: "+74950000000".to_owned(),
        },
        address: address.to_owned(),
        comment: String::new(),
        cooking_restaurant: None,
        lines: products
            .iter()
            .map(|product| OrderLine {
                product_id: ProductId::new(*product),
                quantity: 1,
                price_snapshot: 10_000,
            })
            .collect(),
    }
}

pub fn restaurant(id: i64, name: &str, address: &str) -> RestaurantInfo {
    RestaurantInfo {
        id: RestaurantId::new(id),
        name: name.to_owned(),
        address: address.to_owned(),
    }
}
