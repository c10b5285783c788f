use core::str::FromStr;

use serde::{Deserialize, Serialize};

use parceltrack_core::{DomainError, DomainResult, TrackingNumber};

/// Store-assigned surrogate identifier of a parcel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(pub i64);

impl core::fmt::Display for ParcelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Delivery progress of a parcel.
///
/// Progression is CREATED -> IN_TRANSIT -> DELIVERED, but transitions are not
/// validated: any status may be written over any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParcelStatus {
    Created,
    InTransit,
    Delivered,
}

impl ParcelStatus {
    pub const ALL: [ParcelStatus; 3] = [Self::Created, Self::InTransit, Self::Delivered];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParcelStatus::Created => "CREATED",
            ParcelStatus::InTransit => "IN_TRANSIT",
            ParcelStatus::Delivered => "DELIVERED",
        }
    }
}

impl core::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParcelStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown parcel status '{s}' (expected one of: CREATED, IN_TRANSIT, DELIVERED)"
                ))
            })
    }
}

/// Delivery category; decides which price calculator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    Default,
    Express,
    Econom,
}

impl DeliveryType {
    pub const ALL: [DeliveryType; 3] = [Self::Default, Self::Express, Self::Econom];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Default => "DEFAULT",
            DeliveryType::Express => "EXPRESS",
            DeliveryType::Econom => "ECONOM",
        }
    }
}

impl core::fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "unknown delivery type '{s}' (expected one of: DEFAULT, EXPRESS, ECONOM)"
                ))
            })
    }
}

/// A stored parcel.
///
/// `tracking_number`, `weight`, `price` and `delivery_type` never change after
/// creation; only `status` is mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: ParcelId,
    pub tracking_number: TrackingNumber,
    pub sender: String,
    pub recipient: String,
    pub weight: f64,
    pub price: f64,
    pub status: ParcelStatus,
    pub delivery_type: DeliveryType,
}

impl Parcel {
    /// Split off the store identifier (useful for comparing records across stores).
    pub fn without_id(&self) -> NewParcel {
        NewParcel {
            tracking_number: self.tracking_number.clone(),
            sender: self.sender.clone(),
            recipient: self.recipient.clone(),
            weight: self.weight,
            price: self.price,
            status: self.status,
            delivery_type: self.delivery_type,
        }
    }
}

/// A parcel that has not been assigned a store identifier yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParcel {
    pub tracking_number: TrackingNumber,
    pub sender: String,
    pub recipient: String,
    pub weight: f64,
    pub price: f64,
    pub status: ParcelStatus,
    pub delivery_type: DeliveryType,
}

impl NewParcel {
    pub fn with_id(self, id: ParcelId) -> Parcel {
        Parcel {
            id,
            tracking_number: self.tracking_number,
            sender: self.sender,
            recipient: self.recipient,
            weight: self.weight,
            price: self.price,
            status: self.status,
            delivery_type: self.delivery_type,
        }
    }
}

/// Input for parcel creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParcelRequest {
    pub sender: String,
    pub recipient: String,
    pub weight: f64,
    pub delivery_type: DeliveryType,
}

impl CreateParcelRequest {
    /// Check the request before any tracking number is allocated.
    pub fn validate(&self) -> DomainResult<()> {
        if self.sender.trim().is_empty() {
            return Err(DomainError::validation("sender must not be blank"));
        }
        if self.recipient.trim().is_empty() {
            return Err(DomainError::validation("recipient must not be blank"));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(DomainError::validation(format!(
                "weight must be a non-negative number (got {})",
                self.weight
            )));
        }
        Ok(())
    }
}
