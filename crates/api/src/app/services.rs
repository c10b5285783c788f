use std::sync::Arc;

use parceltrack_infra::{
    AppConfig, InMemoryParcelStore, ParcelService, ParcelStore, PostgresParcelStore, StoreBackend,
    StoreError,
};

/// Type-erased store shared by every handler.
pub type SharedParcelStore = Arc<dyn ParcelStore>;

pub struct AppServices {
    pub parcels: ParcelService<SharedParcelStore>,
}

impl AppServices {
    pub fn new(store: SharedParcelStore) -> Self {
        Self {
            parcels: ParcelService::new(store),
        }
    }

    /// Services backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryParcelStore::new()))
    }

    /// Select the store according to `config`. Postgres connects eagerly and
    /// creates its schema.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        match &config.store {
            StoreBackend::InMemory => {
                tracing::info!("using in-memory parcel store");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres { database_url } => {
                let store = PostgresParcelStore::connect(database_url).await?;
                tracing::info!("using postgres parcel store");
                Ok(Self::new(Arc::new(store)))
            }
        }
    }
}
