//! Parcel application service.
//!
//! Orchestrates one parcel operation at a time:
//!
//! ```text
//! request
//!   ↓
//! 1. Validate input (domain rules, no IO)
//!   ↓
//! 2. Price / allocate tracking number (creation only)
//!   ↓
//! 3. Read or write through the injected `ParcelStore`
//! ```
//!
//! The service holds no state of its own besides its collaborators, so a single
//! instance is shared by every request handler.

use thiserror::Error;
use tracing::instrument;

use parceltrack_core::{DomainError, TrackingNumber};
use parceltrack_parcels::{
    CreateParcelRequest, NewParcel, Parcel, ParcelPage, ParcelSearchParams, ParcelStatistic,
    ParcelStatus, Pagination, PriceCalculators,
};

use crate::store::{ParcelStore, StoreError};
use crate::tracking::{TrackingNumberGenerator, UuidTrackingNumbers};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct ParcelService<S, G = UuidTrackingNumbers> {
    store: S,
    tracking_numbers: G,
    calculators: PriceCalculators,
}

impl<S> ParcelService<S>
where
    S: ParcelStore,
{
    /// Service with random tracking numbers and the standard tariffs.
    pub fn new(store: S) -> Self {
        Self::with_parts(store, UuidTrackingNumbers, PriceCalculators::standard())
    }
}

impl<S, G> ParcelService<S, G>
where
    S: ParcelStore,
    G: TrackingNumberGenerator,
{
    pub fn with_parts(store: S, tracking_numbers: G, calculators: PriceCalculators) -> Self {
        Self {
            store,
            tracking_numbers,
            calculators,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip(self, tracking_number), fields(tracking_number = %tracking_number))]
    pub async fn get_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> ServiceResult<Parcel> {
        match self.store.find_by_tracking_number(tracking_number).await? {
            Some(parcel) => Ok(parcel),
            None => {
                tracing::debug!("parcel not found");
                Err(not_found(tracking_number).into())
            }
        }
    }

    /// Create a parcel in status `CREATED`, priced by its delivery type.
    #[instrument(skip(self, request), fields(delivery_type = %request.delivery_type))]
    pub async fn create(&self, request: CreateParcelRequest) -> ServiceResult<Parcel> {
        request.validate()?;
        let price = self
            .calculators
            .price_for(request.delivery_type, request.weight)?;

        let parcel = NewParcel {
            tracking_number: self.tracking_numbers.generate(),
            sender: request.sender,
            recipient: request.recipient,
            weight: request.weight,
            price,
            status: ParcelStatus::Created,
            delivery_type: request.delivery_type,
        };

        let stored = self.store.insert(parcel).await?;
        tracing::info!(
            parcel_id = %stored.id,
            tracking_number = %stored.tracking_number,
            price = stored.price,
            "parcel created"
        );
        Ok(stored)
    }

    /// Set the status of an existing parcel. Any status may follow any other.
    #[instrument(skip(self, tracking_number), fields(tracking_number = %tracking_number))]
    pub async fn update_status(
        &self,
        tracking_number: &TrackingNumber,
        status: ParcelStatus,
    ) -> ServiceResult<Parcel> {
        let mut parcel = self.get_by_tracking_number(tracking_number).await?;
        let previous = parcel.status;
        parcel.status = status;

        let updated = self.store.update(&parcel).await?;
        tracing::info!(%previous, current = %updated.status, "parcel status changed");
        Ok(updated)
    }

    #[instrument(skip(self, params))]
    pub async fn find_all(
        &self,
        params: &ParcelSearchParams,
        pagination: Pagination,
    ) -> ServiceResult<ParcelPage> {
        Ok(self.store.find_page(params, pagination).await?)
    }

    #[instrument(skip(self, params))]
    pub async fn build_statistic(
        &self,
        params: &ParcelSearchParams,
    ) -> ServiceResult<ParcelStatistic> {
        let parcels = self.store.find_matching(params).await?;
        Ok(ParcelStatistic::from_parcels(&parcels))
    }
}

fn not_found(tracking_number: &TrackingNumber) -> DomainError {
    DomainError::not_found(format!(
        "Parcel with tracking number {tracking_number} not found"
    ))
}
