//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Implements the geocode cache, order source, and menu source ports on top
//! of `diesel-async` with `bb8` connection pooling. Row structs and the
//! schema stay private to this module; adapters hand domain types back.
//!
//! # Example
//!
//! ```ignore
//! use foodcart_backend::outbound::persistence::{DbPool, DieselGeocodeCache, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/foodcart")).await?;
//! let cache = DieselGeocodeCache::new(pool);
//! ```

pub(crate) mod diesel_helpers;
mod diesel_geocode_cache;
mod diesel_menu_source;
mod diesel_order_source;
mod models;
mod pool;
mod schema;

pub use diesel_geocode_cache::DieselGeocodeCache;
pub use diesel_menu_source::DieselMenuSource;
pub use diesel_order_source::DieselOrderSource;
pub use pool::{DbPool, PoolConfig, PoolError};
