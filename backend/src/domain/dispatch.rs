//! Dispatcher board composition.
//!
//! For every pending order the board lists the restaurants able to cook it,
//! nearest first. Menus are fetched fresh per board, addresses are resolved
//! in one cache-first batch, and geocoding failures only ever blank out
//! distances.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::ports::{MenuSource, MenuSourceError, OrderSource, OrderSourceError};
use super::{
    CandidateRestaurant, DispatchResult, DistanceRanker, Error, GeocodeOutcome, GeocodingService,
    MenuCatalogSnapshot, MenuCoverageResolver, PendingOrder, RestaurantInfo, UnrankedCandidate,
    sort_for_board,
};

/// One board row: an order with its ranked candidate restaurants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDispatch {
    /// The order being dispatched.
    pub order: PendingOrder,
    /// Capable restaurants, nearest first; empty when none can cook it.
    pub candidates: Vec<CandidateRestaurant>,
    /// Set when the order's own address could not be geocoded.
    pub order_address_unresolved: bool,
}

impl OrderDispatch {
    /// Whether no restaurant stocks every ordered product.
    pub fn has_no_menu_match(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Builds the dispatcher board from order and menu sources.
pub struct DispatchBoardService<O, M> {
    orders: Arc<O>,
    menus: Arc<M>,
    geocoding: GeocodingService,
    resolver: MenuCoverageResolver,
    ranker: DistanceRanker,
}

impl<O, M> DispatchBoardService<O, M>
where
    O: OrderSource,
    M: MenuSource,
{
    /// Create a new service.
    pub fn new(
        orders: Arc<O>,
        menus: Arc<M>,
        geocoding: GeocodingService,
        resolver: MenuCoverageResolver,
    ) -> Self {
        Self {
            orders,
            menus,
            geocoding,
            resolver,
            ranker: DistanceRanker,
        }
    }

    /// Build the board for all pending orders, in board order.
    ///
    /// # Errors
    ///
    /// Returns an error when the order or menu source cannot be read.
    /// Geocoding problems never fail the board.
    pub async fn build_board(&self) -> DispatchResult<Vec<OrderDispatch>> {
        let mut orders: Vec<PendingOrder> = self
            .orders
            .pending_orders()
            .await
            .map_err(map_order_source_error)?
            .into_iter()
            .filter(|order| order.status.is_pending())
            .collect();
        sort_for_board(&mut orders);

        let snapshot = self.fresh_snapshot().await?;
        let matched: Vec<(PendingOrder, Vec<RestaurantInfo>)> = orders
            .into_iter()
            .map(|order| {
                let candidates = self
                    .resolver
                    .candidates(&order.product_ids(), &snapshot)
                    .into_iter()
                    .cloned()
                    .collect();
                (order, candidates)
            })
            .collect();

        let outcomes = self
            .geocoding
            .resolve_batch(addresses_to_resolve(&matched))
            .await;

        let board: Vec<OrderDispatch> = matched
            .into_iter()
            .map(|(order, candidates)| self.assemble(order, candidates, &outcomes))
            .collect();
        info!(
            orders = board.len(),
            unresolved = board.iter().filter(|row| row.order_address_unresolved).count(),
            unmatched = board.iter().filter(|row| row.has_no_menu_match()).count(),
            "dispatch board built"
        );
        Ok(board)
    }

    /// Run the dispatch pipeline for a single order against `snapshot`.
    pub async fn dispatch_order(
        &self,
        order: PendingOrder,
        snapshot: &MenuCatalogSnapshot,
    ) -> OrderDispatch {
        let candidates: Vec<RestaurantInfo> = self
            .resolver
            .candidates(&order.product_ids(), snapshot)
            .into_iter()
            .cloned()
            .collect();
        let matched = [(order, candidates)];
        let outcomes = self
            .geocoding
            .resolve_batch(addresses_to_resolve(&matched))
            .await;
        let [(order, candidates)] = matched;
        self.assemble(order, candidates, &outcomes)
    }

    /// Read the menu catalogue and build a snapshot; never cached.
    ///
    /// # Errors
    ///
    /// Returns an error when the menu source cannot be read.
    pub async fn fresh_snapshot(&self) -> DispatchResult<MenuCatalogSnapshot> {
        let catalog = self
            .menus
            .fetch_catalog()
            .await
            .map_err(map_menu_source_error)?;
        Ok(MenuCatalogSnapshot::from_catalog(&catalog))
    }

    fn assemble(
        &self,
        order: PendingOrder,
        candidates: Vec<RestaurantInfo>,
        outcomes: &HashMap<String, GeocodeOutcome>,
    ) -> OrderDispatch {
        let coordinates_of = |raw: &str| outcomes.get(raw).and_then(GeocodeOutcome::coordinates);
        let origin = coordinates_of(order.address.as_str());
        let unranked = candidates.into_iter().map(|restaurant| UnrankedCandidate {
            coordinates: coordinates_of(restaurant.address.as_str()),
            restaurant,
        });
        OrderDispatch {
            candidates: self.ranker.rank(origin, unranked),
            order_address_unresolved: origin.is_none(),
            order,
        }
    }
}

fn addresses_to_resolve(matched: &[(PendingOrder, Vec<RestaurantInfo>)]) -> Vec<String> {
    matched
        .iter()
        .flat_map(|(order, candidates)| {
            std::iter::once(order.address.as_str())
                .chain(candidates.iter().map(|restaurant| restaurant.address.as_str()))
        })
        .filter(|raw| !raw.trim().is_empty())
        .map(str::to_owned)
        .collect()
}

fn map_order_source_error(error: OrderSourceError) -> Error {
    match error {
        OrderSourceError::Connection { message } => {
            Error::service_unavailable(format!("order store unavailable: {message}"))
        }
        OrderSourceError::Query { message } => {
            Error::internal(format!("order query failed: {message}"))
        }
    }
}

fn map_menu_source_error(error: MenuSourceError) -> Error {
    match error {
        MenuSourceError::Connection { message } => {
            Error::service_unavailable(format!("menu store unavailable: {message}"))
        }
        MenuSourceError::Query { message } => {
            Error::internal(format!("menu query failed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Board assembly over mocked sources.
    use super::*;
    use crate::domain::ports::{MockMenuSource, MockOrderSource, NoOpGeocodingMetrics};
    use crate::domain::{ErrorCode, MenuCatalog, MenuItem, OrderId, OrderStatus, ProductId, RestaurantId};
    use crate::outbound::cache::InMemoryGeocodeCache;
    use crate::test_support::{ScriptedGeocodingProvider, order_with_products, restaurant};
    use rstest::rstest;

    fn catalog() -> MenuCatalog {
        MenuCatalog {
            restaurants: vec![
                restaurant(1, "Near", "Kuznetsky Most 3"),
                restaurant(2, "Far", "Vernadskogo 86"),
                restaurant(3, "Partial", "Lenina 1"),
            ],
            products: Vec::new(),
            menu_items: [(1, 1), (1, 2), (2, 1), (2, 2), (3, 1)]
                .into_iter()
                .map(|(restaurant_id, product_id)| MenuItem {
                    restaurant_id: RestaurantId::new(restaurant_id),
                    product_id: ProductId::new(product_id),
                    availability: true,
                })
                .collect(),
        }
    }

    fn geocoding() -> GeocodingService {
        let provider = ScriptedGeocodingProvider::new()
            .with_point("Tverskaya 1", 55.75, 37.61)
            .with_point("Kuznetsky Most 3", 55.76, 37.62)
            .with_point("Vernadskogo 86", 55.70, 37.50);
        GeocodingService::new(
            Arc::new(InMemoryGeocodeCache::default()),
            Arc::new(provider),
            Arc::new(NoOpGeocodingMetrics),
        )
    }

    fn service(
        orders: MockOrderSource,
        menus: MockMenuSource,
    ) -> DispatchBoardService<MockOrderSource, MockMenuSource> {
        DispatchBoardService::new(
            Arc::new(orders),
            Arc::new(menus),
            geocoding(),
            MenuCoverageResolver::default(),
        )
    }

    fn menus_returning_catalog() -> MockMenuSource {
        let mut menus = MockMenuSource::new();
        menus
            .expect_fetch_catalog()
            .times(1)
            .return_once(|| Ok(catalog()));
        menus
    }

    #[rstest]
    #[tokio::test]
    async fn board_ranks_capable_restaurants_by_distance() {
        let mut orders = MockOrderSource::new();
        orders
            .expect_pending_orders()
            .return_once(|| Ok(vec![order_with_products(10, "Tverskaya 1", &[1, 2])]));

        let board = service(orders, menus_returning_catalog())
            .build_board()
            .await
            .expect("board builds");

        assert_eq!(board.len(), 1);
        let row = &board[0];
        assert!(!row.order_address_unresolved);
        let ids: Vec<i64> = row.candidates.iter().map(|c| c.restaurant_id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(row.candidates.iter().all(|c| c.distance_km.is_some()));
    }

    #[rstest]
    #[tokio::test]
    async fn completed_orders_are_dropped_and_rest_sorted() {
        let mut completed = order_with_products(1, "Tverskaya 1", &[1]);
        completed.status = OrderStatus::Completed;
        let mut unprocessed = order_with_products(2, "Tverskaya 1", &[1]);
        unprocessed.status = OrderStatus::Unprocessed;
        let fresh = order_with_products(3, "Tverskaya 1", &[1]);
        let mut orders = MockOrderSource::new();
        orders
            .expect_pending_orders()
            .return_once(move || Ok(vec![fresh, completed, unprocessed]));

        let board = service(orders, menus_returning_catalog())
            .build_board()
            .await
            .expect("board builds");

        let ids: Vec<OrderId> = board.iter().map(|row| row.order.id).collect();
        assert_eq!(ids, vec![OrderId::new(2), OrderId::new(3)]);
    }

    #[rstest]
    #[tokio::test]
    async fn unresolved_order_keeps_candidates_without_distances() {
        let mut orders = MockOrderSource::new();
        orders
            .expect_pending_orders()
            .return_once(|| Ok(vec![order_with_products(4, "Unknown St 1", &[1, 2])]));

        let board = service(orders, menus_returning_catalog())
            .build_board()
            .await
            .expect("board builds");

        let row = &board[0];
        assert!(row.order_address_unresolved);
        assert_eq!(row.candidates.len(), 2);
        assert!(row.candidates.iter().all(|c| c.distance_km.is_none()));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_order_has_no_menu_match() {
        let mut orders = MockOrderSource::new();
        orders
            .expect_pending_orders()
            .return_once(|| Ok(vec![order_with_products(5, "Tverskaya 1", &[])]));

        let board = service(orders, menus_returning_catalog())
            .build_board()
            .await
            .expect("board builds");

        assert!(board[0].has_no_menu_match());
        assert!(!board[0].order_address_unresolved);
    }

    #[rstest]
    #[case(OrderSourceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(OrderSourceError::query("bad column"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn order_source_failures_surface_as_domain_errors(
        #[case] failure: OrderSourceError,
        #[case] expected: ErrorCode,
    ) {
        let mut orders = MockOrderSource::new();
        orders
            .expect_pending_orders()
            .return_once(move || Err(failure));
        let mut menus = MockMenuSource::new();
        menus.expect_fetch_catalog().never();

        let error = service(orders, menus)
            .build_board()
            .await
            .expect_err("board fails");

        assert_eq!(error.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn menu_source_failure_surfaces_as_domain_error() {
        let mut orders = MockOrderSource::new();
        orders.expect_pending_orders().return_once(|| Ok(Vec::new()));
        let mut menus = MockMenuSource::new();
        menus
            .expect_fetch_catalog()
            .return_once(|| Err(MenuSourceError::connection("timeout")));

        let error = service(orders, menus)
            .build_board()
            .await
            .expect_err("board fails");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
        assert!(error.message().contains("menu store unavailable"));
    }

    #[rstest]
    #[tokio::test]
    async fn dispatch_order_runs_single_pipeline() {
        let service = service(MockOrderSource::new(), MockMenuSource::new());
        let snapshot = MenuCatalogSnapshot::from_catalog(&catalog());

        let row = service
            .dispatch_order(order_with_products(6, "Tverskaya 1", &[1]), &snapshot)
            .await;

        let ids: Vec<i64> = row.candidates.iter().map(|c| c.restaurant_id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(row.candidates[2].distance_km, None);
    }

    #[rstest]
    fn blank_addresses_are_not_resolved() {
        let matched = vec![(
            order_with_products(7, "  ", &[1]),
            vec![restaurant(1, "Near", "Kuznetsky Most 3"), restaurant(9, "Blank", "")],
        )];
        assert_eq!(addresses_to_resolve(&matched), vec!["Kuznetsky Most 3".to_owned()]);
    }
}
