//! PostgreSQL-backed order source adapter.
//!
//! Orders load through the query DSL; their lines load through raw SQL so
//! `NUMERIC` prices can be converted to minor units in the database.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Array;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrderSource, OrderSourceError};
use crate::domain::{
    CustomerContact, OrderId, OrderLine, OrderStatus, PaymentMethod, PendingOrder, ProductId,
    RestaurantId,
};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, map_pool_error_message};
use super::models::{OrderItemRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::orders;

const COMPLETED_STATUS: &str = "COMPLETED";

const ORDER_ITEMS_SQL: &str = r#"
SELECT order_id,
       product_id,
       quantity,
       ROUND(price_snapshot * 100)::bigint AS price_minor
FROM order_items
WHERE order_id = ANY($1)
ORDER BY order_id, id
"#;

/// Diesel-backed implementation of the order source port.
#[derive(Clone)]
pub struct DieselOrderSource {
    pool: DbPool,
}

impl DieselOrderSource {
    /// Create a new order source with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderSourceError {
    OrderSourceError::connection(map_pool_error_message(error))
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> OrderSourceError {
    move |error| match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => OrderSourceError::connection(message),
        DieselFailure::Query(message) => OrderSourceError::query(message),
    }
}

fn to_line(row: &OrderItemRow) -> Result<OrderLine, OrderSourceError> {
    let quantity = u32::try_from(row.quantity).map_err(|_| {
        OrderSourceError::query(format!(
            "order {} has negative quantity {}",
            row.order_id, row.quantity
        ))
    })?;
    Ok(OrderLine {
        product_id: ProductId::new(row.product_id),
        quantity,
        price_snapshot: row.price_minor,
    })
}

fn to_pending_order(row: OrderRow, lines: Vec<OrderLine>) -> PendingOrder {
    PendingOrder {
        id: OrderId::new(row.id),
        status: OrderStatus::from_code(&row.status),
        payment_method: row.payment_method.as_deref().and_then(PaymentMethod::from_code),
        customer: CustomerContact {
            firstname: row.firstname,
            lastname: row.lastname,
            phonenumber: row.phonenumber,
        },
        address: row.address,
        comment: row.comment,
        cooking_restaurant: row.cooking_restaurant_id.map(RestaurantId::new),
        lines,
    }
}

#[async_trait]
impl OrderSource for DieselOrderSource {
    async fn pending_orders(&self) -> Result<Vec<PendingOrder>, OrderSourceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let order_rows: Vec<OrderRow> = orders::table
            .filter(orders::status.ne(COMPLETED_STATUS))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("load pending orders"))?;
        if order_rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = order_rows.iter().map(|row| row.id).collect();
        let item_rows: Vec<OrderItemRow> = sql_query(ORDER_ITEMS_SQL)
            .bind::<Array<BigInt>, _>(&ids)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("load order items"))?;

        let mut lines_by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for row in &item_rows {
            lines_by_order
                .entry(row.order_id)
                .or_default()
                .push(to_line(row)?);
        }

        Ok(order_rows
            .into_iter()
            .map(|row| {
                let lines = lines_by_order.remove(&row.id).unwrap_or_default();
                to_pending_order(row, lines)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion; queries themselves need a live database.
    use super::*;
    use rstest::rstest;

    fn order_row(status: &str, payment: Option<&str>) -> OrderRow {
        OrderRow {
            id: 42,
            firstname: "Anna".to_owned(),
            lastname: "Smirnova".to_owned(),
            phonenumber: "+74950000000".to_owned(),
            address: "Tverskaya 1".to_owned(),
            status: status.to_owned(),
            payment_method: payment.map(str::to_owned),
            comment: String::new(),
            cooking_restaurant_id: Some(3),
        }
    }

    #[rstest]
    fn converts_rows_into_pending_orders() {
        let line = to_line(&OrderItemRow {
            order_id: 42,
            product_id: 7,
            quantity: 2,
            price_minor: 35_050,
        })
        .expect("valid line");

        let order = to_pending_order(order_row("COOKING", Some("ONLINE")), vec![line]);

        assert_eq!(order.status, OrderStatus::Cooking);
        assert_eq!(order.payment_method, Some(PaymentMethod::Online));
        assert_eq!(order.cooking_restaurant, Some(RestaurantId::new(3)));
        assert_eq!(order.total_price(), 70_100);
    }

    #[rstest]
    fn unknown_payment_codes_become_none() {
        let order = to_pending_order(order_row("NEW", Some("BARTER")), Vec::new());
        assert_eq!(order.payment_method, None);
    }

    #[rstest]
    fn negative_quantities_are_rejected() {
        let result = to_line(&OrderItemRow {
            order_id: 1,
            product_id: 1,
            quantity: -1,
            price_minor: 100,
        });
        assert!(matches!(result, Err(OrderSourceError::Query { .. })));
    }
}
