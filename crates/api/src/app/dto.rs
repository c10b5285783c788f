use std::str::FromStr;

use serde::Deserialize;

use parceltrack_core::{DomainError, DomainResult, TrackingNumber};
use parceltrack_parcels::{DeliveryType, Pagination, ParcelSearchParams, ParcelStatus};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: ParcelStatus,
}

/// Query string of `GET /parcels` and `GET /parcels/statistic`.
///
/// `statuses` and `deliveryTypes` accept repeated keys, comma separated values or
/// both (`statuses=CREATED,IN_TRANSIT&statuses=DELIVERED`). Blank text
/// parameters count as absent. Range bounds must be finite.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParcelQuery {
    pub tracking_number: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub from_weight: Option<f64>,
    pub to_weight: Option<f64>,
    pub from_price: Option<f64>,
    pub to_price: Option<f64>,
    pub statuses: Vec<String>,
    pub delivery_types: Vec<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ParcelQuery {
    pub fn search_params(&self) -> DomainResult<ParcelSearchParams> {
        Ok(ParcelSearchParams {
            tracking_number: non_blank(&self.tracking_number)
                .map(TrackingNumber::from_str)
                .transpose()?,
            sender: non_blank(&self.sender).map(str::to_string),
            recipient: non_blank(&self.recipient).map(str::to_string),
            from_weight: finite("fromWeight", self.from_weight)?,
            to_weight: finite("toWeight", self.to_weight)?,
            from_price: finite("fromPrice", self.from_price)?,
            to_price: finite("toPrice", self.to_price)?,
            statuses: parse_list::<ParcelStatus>(&self.statuses)?,
            delivery_types: parse_list::<DeliveryType>(&self.delivery_types)?,
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.size)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn finite(name: &str, bound: Option<f64>) -> DomainResult<Option<f64>> {
    match bound {
        Some(value) if !value.is_finite() => Err(DomainError::validation(format!(
            "{name} must be a finite number (got {value})"
        ))),
        _ => Ok(bound),
    }
}

fn parse_list<T>(values: &[String]) -> DomainResult<Vec<T>>
where
    T: FromStr<Err = DomainError>,
{
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::parse)
        .collect()
}
