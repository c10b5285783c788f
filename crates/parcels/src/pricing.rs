//! Delivery price strategies.
//!
//! Every delivery type is priced with a linear tariff: `weight * rate + base_fee`.
//! A calculator only prices its own delivery type and rejects any other one,
//! so a misrouted request fails loudly instead of being priced with the wrong
//! tariff.

use std::collections::HashMap;

use parceltrack_core::{DomainError, DomainResult};

use crate::parcel::DeliveryType;

/// Strategy that prices one delivery type.
pub trait PriceCalculator: Send + Sync + core::fmt::Debug {
    /// The delivery type this calculator is responsible for.
    fn delivery_type(&self) -> DeliveryType;

    /// Price a parcel of `weight` sent with `delivery_type`.
    ///
    /// Fails with `DomainError::InvalidArgument` when `delivery_type` is not
    /// the calculator's own.
    fn calculate_price(&self, delivery_type: DeliveryType, weight: f64) -> DomainResult<f64>;
}

/// Linear tariff calculator (`weight * rate + base_fee`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TariffCalculator {
    delivery_type: DeliveryType,
    rate: f64,
    base_fee: f64,
}

impl TariffCalculator {
    pub const fn new(delivery_type: DeliveryType, rate: f64, base_fee: f64) -> Self {
        Self {
            delivery_type,
            rate,
            base_fee,
        }
    }

    /// DEFAULT: `weight * 0.2 + 400`.
    pub const fn default_delivery() -> Self {
        Self::new(DeliveryType::Default, 0.2, 400.0)
    }

    /// ECONOM: `weight * 0.1 + 200`.
    pub const fn econom() -> Self {
        Self::new(DeliveryType::Econom, 0.1, 200.0)
    }

    /// EXPRESS: `weight * 0.3 + 600`.
    pub const fn express() -> Self {
        Self::new(DeliveryType::Express, 0.3, 600.0)
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn base_fee(&self) -> f64 {
        self.base_fee
    }
}

impl PriceCalculator for TariffCalculator {
    fn delivery_type(&self) -> DeliveryType {
        self.delivery_type
    }

    fn calculate_price(&self, delivery_type: DeliveryType, weight: f64) -> DomainResult<f64> {
        if delivery_type != self.delivery_type {
            return Err(DomainError::invalid_argument(format!(
                "DeliveryType must be {}",
                self.delivery_type
            )));
        }
        Ok(weight * self.rate + self.base_fee)
    }
}

/// Calculator registry keyed by delivery type, resolved once at construction.
#[derive(Debug, Default)]
pub struct PriceCalculators {
    by_type: HashMap<DeliveryType, Box<dyn PriceCalculator>>,
}

impl PriceCalculators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard DEFAULT / ECONOM / EXPRESS tariffs.
    pub fn standard() -> Self {
        Self::new()
            .with(TariffCalculator::default_delivery())
            .with(TariffCalculator::econom())
            .with(TariffCalculator::express())
    }

    /// Register a calculator, replacing any previous one for the same type.
    pub fn with(mut self, calculator: impl PriceCalculator + 'static) -> Self {
        self.by_type
            .insert(calculator.delivery_type(), Box::new(calculator));
        self
    }

    pub fn get(&self, delivery_type: DeliveryType) -> Option<&dyn PriceCalculator> {
        self.by_type.get(&delivery_type).map(|c| c.as_ref())
    }

    /// Price a parcel with the calculator registered for `delivery_type`.
    pub fn price_for(&self, delivery_type: DeliveryType, weight: f64) -> DomainResult<f64> {
        let calculator = self.get(delivery_type).ok_or_else(|| {
            DomainError::invalid_argument(format!(
                "no price calculator registered for delivery type {delivery_type}"
            ))
        })?;
        calculator.calculate_price(delivery_type, weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_prices_for_ten_units() {
        let calculators = PriceCalculators::standard();
        assert_eq!(calculators.price_for(DeliveryType::Express, 10.0).unwrap(), 603.0);
        assert_eq!(calculators.price_for(DeliveryType::Default, 10.0).unwrap(), 402.0);
        assert_eq!(calculators.price_for(DeliveryType::Econom, 10.0).unwrap(), 201.0);
    }

    #[test]
    fn zero_weight_costs_the_base_fee() {
        let calculators = PriceCalculators::standard();
        assert_eq!(calculators.price_for(DeliveryType::Default, 0.0).unwrap(), 400.0);
        assert_eq!(calculators.price_for(DeliveryType::Econom, 0.0).unwrap(), 200.0);
        assert_eq!(calculators.price_for(DeliveryType::Express, 0.0).unwrap(), 600.0);
    }

    #[test]
    fn calculator_rejects_foreign_delivery_type() {
        let err = TariffCalculator::econom()
            .calculate_price(DeliveryType::Express, 10.0)
            .unwrap_err();
        assert_eq!(err, DomainError::invalid_argument("DeliveryType must be ECONOM"));

        let err = TariffCalculator::express()
            .calculate_price(DeliveryType::Default, 10.0)
            .unwrap_err();
        assert_eq!(err, DomainError::invalid_argument("DeliveryType must be EXPRESS"));
    }

    #[test]
    fn missing_calculator_is_invalid_argument_not_not_found() {
        let calculators = PriceCalculators::new().with(TariffCalculator::econom());
        let err = calculators.price_for(DeliveryType::Express, 1.0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let calculators = PriceCalculators::standard()
            .with(TariffCalculator::new(DeliveryType::Express, 1.0, 0.0));
        assert_eq!(calculators.price_for(DeliveryType::Express, 5.0).unwrap(), 5.0);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every standard tariff is `rate * w + base_fee`.
            #[test]
            fn standard_tariffs_follow_their_formula(weight in 0.0f64..1_000_000.0) {
                let calculators = PriceCalculators::standard();
                prop_assert_eq!(
                    calculators.price_for(DeliveryType::Default, weight).unwrap(),
                    weight * 0.2 + 400.0
                );
                prop_assert_eq!(
                    calculators.price_for(DeliveryType::Econom, weight).unwrap(),
                    weight * 0.1 + 200.0
                );
                prop_assert_eq!(
                    calculators.price_for(DeliveryType::Express, weight).unwrap(),
                    weight * 0.3 + 600.0
                );
            }

            /// Property: for any weight, EXPRESS >= DEFAULT >= ECONOM.
            #[test]
            fn tariffs_are_ordered(weight in 0.0f64..1_000_000.0) {
                let calculators = PriceCalculators::standard();
                let express = calculators.price_for(DeliveryType::Express, weight).unwrap();
                let default = calculators.price_for(DeliveryType::Default, weight).unwrap();
                let econom = calculators.price_for(DeliveryType::Econom, weight).unwrap();
                prop_assert!(express >= default);
                prop_assert!(default >= econom);
            }
        }
    }
}
