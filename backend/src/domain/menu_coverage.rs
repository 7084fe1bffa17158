//! Restaurant capability matching against order contents.
//!
//! A restaurant can fulfil an order when every ordered product is currently
//! available on its menu. Matching works on a [`MenuCatalogSnapshot`] built
//! fresh from the menu source for each request; snapshots are never cached.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ProductId, RestaurantId};

/// Restaurant details needed for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantInfo {
    /// Restaurant identifier.
    pub id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Raw street address; may be blank.
    pub address: String,
}

/// Product details shown in the availability matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
}

/// One menu row linking a restaurant to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Restaurant offering the product.
    pub restaurant_id: RestaurantId,
    /// Offered product.
    pub product_id: ProductId,
    /// Whether the restaurant can currently cook it.
    pub availability: bool,
}

/// Raw catalogue rows as read from the menu source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuCatalog {
    /// Restaurants in source order.
    pub restaurants: Vec<RestaurantInfo>,
    /// Products in source order.
    pub products: Vec<ProductInfo>,
    /// Menu rows, available or not.
    pub menu_items: Vec<MenuItem>,
}

/// Per-restaurant set of currently available products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuCatalogSnapshot {
    restaurants: Vec<RestaurantInfo>,
    available: HashMap<RestaurantId, BTreeSet<ProductId>>,
}

impl MenuCatalogSnapshot {
    /// Build a snapshot keeping only available menu rows.
    ///
    /// Menu rows pointing at restaurants missing from the catalogue are
    /// ignored.
    pub fn from_catalog(catalog: &MenuCatalog) -> Self {
        let mut available: HashMap<RestaurantId, BTreeSet<ProductId>> = HashMap::new();
        for item in catalog.menu_items.iter().filter(|item| item.availability) {
            available
                .entry(item.restaurant_id)
                .or_default()
                .insert(item.product_id);
        }
        let known: BTreeSet<RestaurantId> =
            catalog.restaurants.iter().map(|restaurant| restaurant.id).collect();
        available.retain(|id, _| known.contains(id));

        Self {
            restaurants: catalog.restaurants.clone(),
            available,
        }
    }

    /// Restaurants in catalogue order.
    pub fn restaurants(&self) -> &[RestaurantInfo] {
        &self.restaurants
    }

    /// Available products keyed by restaurant.
    pub fn menu_by_restaurant(&self) -> &HashMap<RestaurantId, BTreeSet<ProductId>> {
        &self.available
    }

    /// Look up a restaurant by identifier.
    pub fn restaurant(&self, id: RestaurantId) -> Option<&RestaurantInfo> {
        self.restaurants.iter().find(|restaurant| restaurant.id == id)
    }
}

/// How an order's products must relate to a restaurant's available set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageRule {
    /// Every ordered product must be available; extras are allowed.
    #[default]
    Subset,
    /// The available set must equal the ordered set exactly.
    ///
    /// Historical variant that rejects restaurants stocking extra products.
    ExactMatch,
}

/// Error returned when parsing an unknown coverage rule name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown coverage rule `{0}`; expected `subset` or `exact`")]
pub struct CoverageRuleParseError(pub String);

impl FromStr for CoverageRule {
    type Err = CoverageRuleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "subset" => Ok(Self::Subset),
            "exact" | "exact_match" => Ok(Self::ExactMatch),
            other => Err(CoverageRuleParseError(other.to_owned())),
        }
    }
}

/// Computes which restaurants can fulfil an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuCoverageResolver {
    rule: CoverageRule,
}

impl MenuCoverageResolver {
    /// Create a resolver applying `rule`.
    pub fn new(rule: CoverageRule) -> Self {
        Self { rule }
    }

    /// Rule in effect.
    pub fn rule(&self) -> CoverageRule {
        self.rule
    }

    /// Restaurants whose available products cover `order_products`.
    ///
    /// An empty order has no candidates. Restaurants absent from
    /// `menu_by_restaurant` stock nothing.
    pub fn resolve(
        &self,
        order_products: &BTreeSet<ProductId>,
        menu_by_restaurant: &HashMap<RestaurantId, BTreeSet<ProductId>>,
    ) -> BTreeSet<RestaurantId> {
        if order_products.is_empty() {
            return BTreeSet::new();
        }
        menu_by_restaurant
            .iter()
            .filter(|(_, available)| self.covers(order_products, available))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Candidate restaurants in snapshot order.
    pub fn candidates<'a>(
        &self,
        order_products: &BTreeSet<ProductId>,
        snapshot: &'a MenuCatalogSnapshot,
    ) -> Vec<&'a RestaurantInfo> {
        let matched = self.resolve(order_products, snapshot.menu_by_restaurant());
        snapshot
            .restaurants()
            .iter()
            .filter(|restaurant| matched.contains(&restaurant.id))
            .collect()
    }

    fn covers(&self, ordered: &BTreeSet<ProductId>, available: &BTreeSet<ProductId>) -> bool {
        match self.rule {
            CoverageRule::Subset => ordered.is_subset(available),
            CoverageRule::ExactMatch => ordered == available,
        }
    }
}

/// Availability of one product across all restaurants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductAvailability {
    /// Product described by this row.
    pub product: ProductInfo,
    /// One flag per restaurant, aligned with [`AvailabilityMatrix::restaurants`].
    pub availability: Vec<bool>,
}

/// Product × restaurant availability grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityMatrix {
    /// Column order, sorted by name.
    pub restaurants: Vec<RestaurantInfo>,
    /// One row per product in catalogue order.
    pub products: Vec<ProductAvailability>,
}

/// Build the availability grid; a missing menu row counts as unavailable.
pub fn availability_matrix(catalog: &MenuCatalog) -> AvailabilityMatrix {
    let mut restaurants = catalog.restaurants.clone();
    restaurants.sort_by(|left, right| left.name.cmp(&right.name).then(left.id.cmp(&right.id)));

    let flags: HashMap<(ProductId, RestaurantId), bool> = catalog
        .menu_items
        .iter()
        .map(|item| ((item.product_id, item.restaurant_id), item.availability))
        .collect();

    let products = catalog
        .products
        .iter()
        .map(|product| ProductAvailability {
            product: product.clone(),
            availability: restaurants
                .iter()
                .map(|restaurant| {
                    flags
                        .get(&(product.id, restaurant.id))
                        .copied()
                        .unwrap_or(false)
                })
                .collect(),
        })
        .collect();

    AvailabilityMatrix {
        restaurants,
        products,
    }
}
