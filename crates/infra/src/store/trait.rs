use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use parceltrack_core::TrackingNumber;
use parceltrack_parcels::{NewParcel, Parcel, ParcelPage, ParcelSearchParams, Pagination};

/// Parcel store operation error.
///
/// These are **infrastructure errors** (storage, uniqueness, decoding) as
/// opposed to domain errors (validation, lookups by the service).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record to update does not exist (anymore).
    #[error("parcel {0} does not exist in the store")]
    NotFound(String),

    /// A unique constraint was violated (duplicate tracking number).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backend failed (connection, query, poisoned lock, ...).
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored row could not be decoded into a parcel.
    #[error("corrupt parcel record: {0}")]
    Corrupt(String),
}

/// Persistent collection of parcels keyed by a store-assigned identifier, with
/// a unique tracking number.
///
/// Listing operations return parcels ordered by identifier (insertion order).
#[async_trait]
pub trait ParcelStore: Send + Sync {
    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<Parcel>, StoreError>;

    /// Insert a new parcel and assign its identifier.
    ///
    /// Fails with `StoreError::Conflict` if the tracking number is taken.
    async fn insert(&self, parcel: NewParcel) -> Result<Parcel, StoreError>;

    /// Overwrite the mutable fields of the parcel with the same identifier.
    ///
    /// The tracking number is never rewritten.
    async fn update(&self, parcel: &Parcel) -> Result<Parcel, StoreError>;

    /// One page of parcels matching `params`, plus the total match count.
    async fn find_page(
        &self,
        params: &ParcelSearchParams,
        pagination: Pagination,
    ) -> Result<ParcelPage, StoreError>;

    /// Every parcel matching `params` (unpaginated).
    async fn find_matching(&self, params: &ParcelSearchParams) -> Result<Vec<Parcel>, StoreError>;

    /// Remove every parcel; returns the number removed. Test fixtures only.
    async fn delete_all(&self) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> ParcelStore for Arc<S>
where
    S: ParcelStore + ?Sized,
{
    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<Parcel>, StoreError> {
        (**self).find_by_tracking_number(tracking_number).await
    }

    async fn insert(&self, parcel: NewParcel) -> Result<Parcel, StoreError> {
        (**self).insert(parcel).await
    }

    async fn update(&self, parcel: &Parcel) -> Result<Parcel, StoreError> {
        (**self).update(parcel).await
    }

    async fn find_page(
        &self,
        params: &ParcelSearchParams,
        pagination: Pagination,
    ) -> Result<ParcelPage, StoreError> {
        (**self).find_page(params, pagination).await
    }

    async fn find_matching(&self, params: &ParcelSearchParams) -> Result<Vec<Parcel>, StoreError> {
        (**self).find_matching(params).await
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        (**self).delete_all().await
    }
}
