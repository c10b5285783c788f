//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Externally visible identifier of a parcel.
///
/// Generated as a random UUID at creation, but any non-blank string received
/// from a client is accepted for lookups (unknown values simply miss).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Create a new, globally unique tracking number (UUIDv4, hyphenated).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for TrackingNumber {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for TrackingNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("tracking number must not be blank"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_numbers_are_uuids_and_distinct() {
        let a = TrackingNumber::generate();
        let b = TrackingNumber::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn parse_rejects_blank() {
        assert!("   ".parse::<TrackingNumber>().is_err());
        let tn: TrackingNumber = " abc ".parse().unwrap();
        assert_eq!(tn.as_str(), "abc");
    }

    #[test]
    fn serializes_as_plain_string() {
        let tn: TrackingNumber = "fa635f04-3094-46b2-b6f7-8fbe377c8be3".parse().unwrap();
        let json = serde_json::to_string(&tn).unwrap();
        assert_eq!(json, "\"fa635f04-3094-46b2-b6f7-8fbe377c8be3\"");
    }
}
