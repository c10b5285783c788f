//! Infrastructure layer: parcel storage, config, service orchestration.

pub mod config;
pub mod parcel_service;
pub mod store;
pub mod tracking;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use parcel_service::{ParcelService, ServiceError, ServiceResult};
pub use store::{InMemoryParcelStore, ParcelStore, PostgresParcelStore, StoreError};
pub use tracking::{PresetTrackingNumbers, TrackingNumberGenerator, UuidTrackingNumbers};
