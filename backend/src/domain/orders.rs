//! Order read models consumed by the dispatcher board.
//!
//! Orders arrive from the order store already persisted; this module only
//! models what dispatch needs: the distinct product set for menu matching,
//! the delivery address, and the status used to order the board.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw store identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Identifier of a product in the catalogue.
    ProductId
}

define_id! {
    /// Identifier of a restaurant.
    RestaurantId
}

define_id! {
    /// Identifier of a customer order.
    OrderId
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Received but not yet confirmed by a manager.
    Unprocessed,
    /// Confirmed by a manager.
    New,
    /// Being prepared by a restaurant.
    Cooking,
    /// Handed to a courier.
    Delivering,
    /// Delivered; never shown on the board.
    Completed,
    /// Status text the backend does not recognise.
    #[serde(untagged)]
    Other(String),
}

impl OrderStatus {
    /// Parse a stored status code; unknown values are preserved.
    pub fn from_code(code: &str) -> Self {
        match code {
            "UNPROCESSED" => Self::Unprocessed,
            "NEW" => Self::New,
            "COOKING" => Self::Cooking,
            "DELIVERING" => Self::Delivering,
            "COMPLETED" => Self::Completed,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Board priority: lower values are shown first.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Unprocessed => 0,
            Self::New => 1,
            Self::Cooking => 2,
            Self::Delivering => 3,
            Self::Completed => 4,
            Self::Other(_) => 5,
        }
    }

    /// Whether the order still needs dispatcher attention.
    pub fn is_pending(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cash,
    /// Paid electronically.
    Online,
}

impl PaymentMethod {
    /// Parse a stored payment method code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CASH" => Some(Self::Cash),
            "ONLINE" => Some(Self::Online),
            _ => None,
        }
    }
}

/// One ordered product with the price captured when the order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Ordered product.
    pub product_id: ProductId,
    /// Number of units; irrelevant to capability matching.
    pub quantity: u32,
    /// Unit price in minor currency units at order time.
    pub price_snapshot: i64,
}

/// Customer contact details shown to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    /// Customer first name.
    pub firstname: String,
    /// Customer last name.
    pub lastname: String,
    /// Phone number as stored.
    pub phonenumber: String,
}

/// A pending order as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    /// Order identifier.
    pub id: OrderId,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Payment method, when chosen.
    pub payment_method: Option<PaymentMethod>,
    /// Customer contact details.
    pub customer: CustomerContact,
    /// Raw delivery address; may be blank for malformed rows.
    pub address: String,
    /// Free-form manager comment.
    pub comment: String,
    /// Restaurant already assigned to cook this order.
    pub cooking_restaurant: Option<RestaurantId>,
    /// Ordered lines.
    pub lines: Vec<OrderLine>,
}

impl PendingOrder {
    /// Distinct product identifiers across all lines.
    pub fn product_ids(&self) -> BTreeSet<ProductId> {
        self.lines.iter().map(|line| line.product_id).collect()
    }

    /// Order total in minor currency units.
    pub fn total_price(&self) -> i64 {
        self.lines
            .iter()
            .map(|line| i64::from(line.quantity).saturating_mul(line.price_snapshot))
            .fold(0_i64, i64::saturating_add)
    }

    /// Total number of units ordered.
    pub fn items_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Sort orders for the board: status priority, then newest first.
pub fn sort_for_board(orders: &mut [PendingOrder]) {
    orders.sort_by(|left, right| {
        left.status
            .priority()
            .cmp(&right.status.priority())
            .then_with(|| right.id.cmp(&left.id))
    });
}

#[cfg(test)]
mod tests {
    //! Order totals, product sets, and board ordering.
    use super::*;
    use rstest::{fixture, rstest};

    fn line(product: i64, quantity: u32, price: i64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(product),
            quantity,
            price_snapshot: price,
        }
    }

    fn order(id: i64, status: OrderStatus, lines: Vec<OrderLine>) -> PendingOrder {
        PendingOrder {
            id: OrderId::new(id),
            status,
            payment_method: Some(PaymentMethod::Cash),
            customer: CustomerContact {
                firstname: "Ivan".to_owned(),
                lastname: "Petrov".to_owned(),
                phonenumber: "+79990000000".to_owned(),
            },
            address: "Tverskaya 1".to_owned(),
            comment: String::new(),
            cooking_restaurant: None,
            lines,
        }
    }

    #[fixture]
    fn burger_order() -> PendingOrder {
        order(
            7,
            OrderStatus::New,
            vec![line(1, 2, 35_000), line(2, 1, 12_050), line(1, 1, 35_000)],
        )
    }

    #[rstest]
    fn product_ids_are_distinct(burger_order: PendingOrder) {
        let ids: Vec<_> = burger_order.product_ids().into_iter().collect();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(2)]);
    }

    #[rstest]
    fn totals_multiply_quantity_by_snapshot(burger_order: PendingOrder) {
        assert_eq!(burger_order.total_price(), 117_050);
        assert_eq!(burger_order.items_count(), 4);
    }

    #[rstest]
    fn empty_order_has_zero_totals() {
        let empty = order(1, OrderStatus::New, Vec::new());
        assert_eq!(empty.total_price(), 0);
        assert_eq!(empty.items_count(), 0);
        assert!(empty.product_ids().is_empty());
    }

    #[rstest]
    #[case("UNPROCESSED", OrderStatus::Unprocessed, 0)]
    #[case("NEW", OrderStatus::New, 1)]
    #[case("COOKING", OrderStatus::Cooking, 2)]
    #[case("DELIVERING", OrderStatus::Delivering, 3)]
    #[case("COMPLETED", OrderStatus::Completed, 4)]
    #[case("LOST", OrderStatus::Other("LOST".to_owned()), 5)]
    fn status_codes_map_to_priorities(
        #[case] code: &str,
        #[case] expected: OrderStatus,
        #[case] priority: u8,
    ) {
        let status = OrderStatus::from_code(code);
        assert_eq!(status, expected);
        assert_eq!(status.priority(), priority);
    }

    #[rstest]
    fn board_sorts_by_priority_then_newest() {
        let mut orders = vec![
            order(1, OrderStatus::Cooking, Vec::new()),
            order(2, OrderStatus::Unprocessed, Vec::new()),
            order(3, OrderStatus::Cooking, Vec::new()),
            order(4, OrderStatus::Other("LOST".to_owned()), Vec::new()),
            order(5, OrderStatus::Unprocessed, Vec::new()),
        ];
        sort_for_board(&mut orders);
        let ids: Vec<i64> = orders.iter().map(|o| o.id.get()).collect();
        assert_eq!(ids, vec![5, 2, 3, 1, 4]);
    }

    #[rstest]
    fn payment_method_codes() {
        assert_eq!(PaymentMethod::from_code("CASH"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::from_code("ONLINE"), Some(PaymentMethod::Online));
        assert_eq!(PaymentMethod::from_code(""), None);
    }
}
