//! Parcel search criteria and pagination.

use serde::{Deserialize, Serialize};

use parceltrack_core::TrackingNumber;

use crate::parcel::{DeliveryType, Parcel, ParcelStatus};

/// Filter criteria for parcel queries.
///
/// All criteria are combined with AND. Text criteria are exact matches, range
/// bounds are inclusive (an absent bound is unbounded) and an empty set means
/// "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParcelSearchParams {
    pub tracking_number: Option<TrackingNumber>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub from_weight: Option<f64>,
    pub to_weight: Option<f64>,
    pub from_price: Option<f64>,
    pub to_price: Option<f64>,
    pub statuses: Vec<ParcelStatus>,
    pub delivery_types: Vec<DeliveryType>,
}

impl ParcelSearchParams {
    /// Returns `true` if `parcel` satisfies every criterion.
    pub fn matches(&self, parcel: &Parcel) -> bool {
        self.tracking_number
            .as_ref()
            .is_none_or(|tn| *tn == parcel.tracking_number)
            && self.sender.as_ref().is_none_or(|s| *s == parcel.sender)
            && self.recipient.as_ref().is_none_or(|r| *r == parcel.recipient)
            && in_range(parcel.weight, self.from_weight, self.to_weight)
            && in_range(parcel.price, self.from_price, self.to_price)
            && (self.statuses.is_empty() || self.statuses.contains(&parcel.status))
            && (self.delivery_types.is_empty() || self.delivery_types.contains(&parcel.delivery_type))
    }
}

fn in_range(value: f64, from: Option<f64>, to: Option<f64>) -> bool {
    from.is_none_or(|lo| value >= lo) && to.is_none_or(|hi| value <= hi)
}

/// Pagination parameters for parcel listings (zero-based page index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Pagination {
    pub const DEFAULT_SIZE: u32 = 20;
    pub const MAX_SIZE: u32 = 1000;

    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(Self::DEFAULT_SIZE).clamp(1, Self::MAX_SIZE),
        }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }

    /// Slice one page out of an already ordered, already filtered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.size as usize)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of parcels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelPage {
    pub items: Vec<Parcel>,
    /// Number of parcels matching the filter across all pages.
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub has_more: bool,
}

impl ParcelPage {
    pub fn new(items: Vec<Parcel>, total: u64, pagination: Pagination) -> Self {
        let has_more = total > pagination.offset() + items.len() as u64;
        Self {
            items,
            total,
            page: pagination.page,
            size: pagination.size,
            has_more,
        }
    }
}
