use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use parceltrack_core::TrackingNumber;
use parceltrack_parcels::{NewParcel, Parcel, ParcelId, ParcelPage, ParcelSearchParams, Pagination};

use super::r#trait::{ParcelStore, StoreError};

#[derive(Debug)]
struct Tables {
    next_id: i64,
    by_id: BTreeMap<ParcelId, Parcel>,
    by_tracking_number: HashMap<TrackingNumber, ParcelId>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            next_id: 1,
            by_id: BTreeMap::new(),
            by_tracking_number: HashMap::new(),
        }
    }
}

/// In-memory parcel store.
///
/// Intended for tests/dev. Identifiers are assigned from a counter starting at
/// 1 and are never reused, even after `delete_all`.
#[derive(Debug, Default)]
pub struct InMemoryParcelStore {
    tables: RwLock<Tables>,
}

impl InMemoryParcelStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn matching(&self, params: &ParcelSearchParams) -> Result<Vec<Parcel>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .by_id
            .values()
            .filter(|p| params.matches(p))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ParcelStore for InMemoryParcelStore {
    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<Parcel>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .by_tracking_number
            .get(tracking_number)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn insert(&self, parcel: NewParcel) -> Result<Parcel, StoreError> {
        let mut tables = self.write()?;

        if tables.by_tracking_number.contains_key(&parcel.tracking_number) {
            return Err(StoreError::Conflict(format!(
                "tracking number {} already exists",
                parcel.tracking_number
            )));
        }

        let id = ParcelId(tables.next_id);
        tables.next_id += 1;

        let stored = parcel.with_id(id);
        tables
            .by_tracking_number
            .insert(stored.tracking_number.clone(), id);
        tables.by_id.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, parcel: &Parcel) -> Result<Parcel, StoreError> {
        let mut tables = self.write()?;
        let existing = tables
            .by_id
            .get_mut(&parcel.id)
            .ok_or_else(|| StoreError::NotFound(parcel.id.to_string()))?;

        existing.sender = parcel.sender.clone();
        existing.recipient = parcel.recipient.clone();
        existing.weight = parcel.weight;
        existing.price = parcel.price;
        existing.status = parcel.status;
        existing.delivery_type = parcel.delivery_type;
        Ok(existing.clone())
    }

    async fn find_page(
        &self,
        params: &ParcelSearchParams,
        pagination: Pagination,
    ) -> Result<ParcelPage, StoreError> {
        let matching = self.matching(params)?;
        let total = matching.len() as u64;
        Ok(ParcelPage::new(pagination.apply(matching), total, pagination))
    }

    async fn find_matching(&self, params: &ParcelSearchParams) -> Result<Vec<Parcel>, StoreError> {
        self.matching(params)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let removed = tables.by_id.len() as u64;
        tables.by_id.clear();
        tables.by_tracking_number.clear();
        Ok(removed)
    }
}
