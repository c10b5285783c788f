//! Parcels domain module.
//!
//! This crate contains the business rules for parcels: the record itself, the
//! delivery price strategies, the search predicate and the statistics
//! aggregation. Everything here is deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod parcel;
pub mod pricing;
pub mod search;
pub mod statistic;

pub use parcel::{CreateParcelRequest, DeliveryType, NewParcel, Parcel, ParcelId, ParcelStatus};
pub use pricing::{PriceCalculator, PriceCalculators, TariffCalculator};
pub use search::{Pagination, ParcelPage, ParcelSearchParams};
pub use statistic::ParcelStatistic;
