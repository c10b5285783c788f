//! Parcel persistence boundary.
//!
//! `ParcelStore` is the only way the service touches stored parcels. Two
//! implementations ship with the crate: an in-memory map for tests/dev and a
//! Postgres table for production.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryParcelStore;
pub use postgres::PostgresParcelStore;
pub use r#trait::{ParcelStore, StoreError};
