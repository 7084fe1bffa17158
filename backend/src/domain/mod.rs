//! Domain primitives and services for order dispatch.
//!
//! Purpose: decide which restaurants can cook each pending order and rank
//! them by distance from the delivery address. Everything here is transport
//! agnostic; storage and the geocoding provider sit behind [`ports`].
//!
//! Public surface:
//! - Address, Coordinates: validated value types used as cache keys and
//!   positions.
//! - MenuCoverageResolver: subset matching of order contents against menus.
//! - DistanceRanker: deterministic nearest-first ranking.
//! - GeocodingService: cache-first geocoding with graceful degradation.
//! - DispatchBoardService: composes the above into the dispatcher board.
//! - Error (alias to `error::Error`): failure payload for source errors.

pub mod address;
pub mod dispatch;
pub mod distance_ranking;
pub mod error;
pub mod geo;
pub mod geocoding_service;
pub mod menu_coverage;
pub mod orders;
pub mod ports;

pub use self::address::{Address, AddressValidationError};
pub use self::dispatch::{DispatchBoardService, OrderDispatch};
pub use self::distance_ranking::{CandidateRestaurant, DistanceRanker, UnrankedCandidate};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{Coordinates, CoordinatesValidationError, round_km};
pub use self::geocoding_service::{
    DEFAULT_MAX_CONCURRENCY, DEFAULT_PROVIDER_TIMEOUT, GeocodeFailure, GeocodeOutcome,
    GeocodingService,
};
pub use self::menu_coverage::{
    AvailabilityMatrix, CoverageRule, CoverageRuleParseError, MenuCatalog, MenuCatalogSnapshot,
    MenuCoverageResolver, MenuItem, ProductAvailability, ProductInfo, RestaurantInfo,
    availability_matrix,
};
pub use self::orders::{
    CustomerContact, OrderId, OrderLine, OrderStatus, PaymentMethod, PendingOrder, ProductId,
    RestaurantId, sort_for_board,
};

/// Result alias for dispatch operations that can fail on data sources.
pub type DispatchResult<T> = Result<T, Error>;
