//! Tracking number generation.

use std::collections::VecDeque;
use std::sync::Mutex;

use parceltrack_core::TrackingNumber;

/// Source of fresh tracking numbers for newly created parcels.
pub trait TrackingNumberGenerator: Send + Sync {
    fn generate(&self) -> TrackingNumber;
}

/// Random UUIDv4 tracking numbers (production default).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTrackingNumbers;

impl TrackingNumberGenerator for UuidTrackingNumbers {
    fn generate(&self) -> TrackingNumber {
        TrackingNumber::generate()
    }
}

/// Hands out a predefined sequence, then falls back to random UUIDs.
///
/// Lets tests assert on the exact tracking number of a created parcel.
#[derive(Debug, Default)]
pub struct PresetTrackingNumbers {
    queue: Mutex<VecDeque<TrackingNumber>>,
}

impl PresetTrackingNumbers {
    pub fn new(numbers: impl IntoIterator<Item = TrackingNumber>) -> Self {
        Self {
            queue: Mutex::new(numbers.into_iter().collect()),
        }
    }

    pub fn push(&self, number: TrackingNumber) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(number);
        }
    }
}

impl TrackingNumberGenerator for PresetTrackingNumbers {
    fn generate(&self) -> TrackingNumber {
        self.queue
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(TrackingNumber::generate)
    }
}
