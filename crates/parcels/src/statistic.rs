//! Aggregate statistics over a set of parcels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::parcel::{DeliveryType, Parcel, ParcelStatus};

/// Summary of a filtered parcel set.
///
/// Count maps always contain every enum variant (zero when nothing matched).
/// Extremal parcels are `None` for an empty set; on ties the first parcel in
/// input order wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelStatistic {
    pub total_parcels: u64,
    pub average_weight: f64,
    pub average_price: f64,
    pub parcels_count_by_status: BTreeMap<ParcelStatus, u64>,
    pub parcels_count_by_delivery_type: BTreeMap<DeliveryType, u64>,
    pub most_expensive_parcel: Option<Parcel>,
    pub cheapest_parcel: Option<Parcel>,
    pub heaviest_parcel: Option<Parcel>,
    pub lightest_parcel: Option<Parcel>,
}

impl ParcelStatistic {
    /// Statistic of an empty set.
    pub fn empty() -> Self {
        Self {
            total_parcels: 0,
            average_weight: 0.0,
            average_price: 0.0,
            parcels_count_by_status: ParcelStatus::ALL.into_iter().map(|s| (s, 0)).collect(),
            parcels_count_by_delivery_type: DeliveryType::ALL.into_iter().map(|t| (t, 0)).collect(),
            most_expensive_parcel: None,
            cheapest_parcel: None,
            heaviest_parcel: None,
            lightest_parcel: None,
        }
    }

    pub fn from_parcels(parcels: &[Parcel]) -> Self {
        let mut stat = Self::empty();
        if parcels.is_empty() {
            return stat;
        }

        let mut weight_sum = 0.0;
        let mut price_sum = 0.0;
        for parcel in parcels {
            weight_sum += parcel.weight;
            price_sum += parcel.price;
            *stat.parcels_count_by_status.entry(parcel.status).or_insert(0) += 1;
            *stat
                .parcels_count_by_delivery_type
                .entry(parcel.delivery_type)
                .or_insert(0) += 1;
        }

        let n = parcels.len() as f64;
        stat.total_parcels = parcels.len() as u64;
        stat.average_weight = weight_sum / n;
        stat.average_price = price_sum / n;
        stat.most_expensive_parcel = pick(parcels, |p| p.price, |candidate, best| candidate > best);
        stat.cheapest_parcel = pick(parcels, |p| p.price, |candidate, best| candidate < best);
        stat.heaviest_parcel = pick(parcels, |p| p.weight, |candidate, best| candidate > best);
        stat.lightest_parcel = pick(parcels, |p| p.weight, |candidate, best| candidate < best);
        stat
    }
}

impl Default for ParcelStatistic {
    fn default() -> Self {
        Self::empty()
    }
}

/// First parcel whose key beats every earlier one under `better`.
fn pick(
    parcels: &[Parcel],
    key: impl Fn(&Parcel) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> Option<Parcel> {
    let mut best: Option<&Parcel> = None;
    for parcel in parcels {
        match best {
            Some(current) if !better(key(parcel), key(current)) => {}
            _ => best = Some(parcel),
        }
    }
    best.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fixtures::initial_parcels;
    use crate::search::ParcelSearchParams;

    fn statistic_for(params: &ParcelSearchParams) -> ParcelStatistic {
        let matching: Vec<Parcel> = initial_parcels()
            .into_iter()
            .filter(|p| params.matches(p))
            .collect();
        ParcelStatistic::from_parcels(&matching)
    }

    fn id_of(parcel: &Option<Parcel>) -> Option<i64> {
        parcel.as_ref().map(|p| p.id.0)
    }

    #[test]
    fn statistic_over_all_fixture_parcels() {
        let stat = statistic_for(&ParcelSearchParams::default());

        assert_eq!(stat.total_parcels, 5);
        assert_eq!(stat.average_weight, (50.0 + 30.5 + 10.0 + 75.0 + 22.0) / 5.0);
        assert_eq!(stat.average_price, (70.0 + 45.0 + 20.0 + 90.0 + 35.0) / 5.0);
        assert_eq!(stat.parcels_count_by_status[&ParcelStatus::Created], 1);
        assert_eq!(stat.parcels_count_by_status[&ParcelStatus::InTransit], 2);
        assert_eq!(stat.parcels_count_by_status[&ParcelStatus::Delivered], 2);
        assert_eq!(stat.parcels_count_by_delivery_type[&DeliveryType::Econom], 1);
        assert_eq!(stat.parcels_count_by_delivery_type[&DeliveryType::Default], 2);
        assert_eq!(stat.parcels_count_by_delivery_type[&DeliveryType::Express], 2);
        assert_eq!(id_of(&stat.most_expensive_parcel), Some(4));
        assert_eq!(id_of(&stat.cheapest_parcel), Some(3));
        assert_eq!(id_of(&stat.heaviest_parcel), Some(4));
        assert_eq!(id_of(&stat.lightest_parcel), Some(3));
    }

    #[test]
    fn statistic_over_express_and_default() {
        let stat = statistic_for(&ParcelSearchParams {
            delivery_types: vec![DeliveryType::Express, DeliveryType::Default],
            ..Default::default()
        });

        assert_eq!(stat.total_parcels, 4);
        assert_eq!(stat.average_weight, (50.0 + 30.5 + 75.0 + 22.0) / 4.0);
        assert_eq!(stat.average_price, (70.0 + 45.0 + 90.0 + 35.0) / 4.0);
        assert_eq!(stat.parcels_count_by_status[&ParcelStatus::Delivered], 1);
        assert_eq!(stat.parcels_count_by_delivery_type[&DeliveryType::Econom], 0);
        assert_eq!(id_of(&stat.most_expensive_parcel), Some(4));
        assert_eq!(id_of(&stat.cheapest_parcel), Some(5));
        assert_eq!(id_of(&stat.heaviest_parcel), Some(4));
        assert_eq!(id_of(&stat.lightest_parcel), Some(5));
    }

    #[test]
    fn statistic_of_unmatched_filter_is_empty() {
        let stat = statistic_for(&ParcelSearchParams {
            tracking_number: Some("invalidTrackingNumber".parse().unwrap()),
            ..Default::default()
        });

        assert_eq!(stat, ParcelStatistic::empty());
        assert_eq!(stat.total_parcels, 0);
        assert_eq!(stat.average_weight, 0.0);
        assert!(stat.parcels_count_by_status.values().all(|c| *c == 0));
        assert_eq!(stat.parcels_count_by_status.len(), 3);
        assert_eq!(stat.parcels_count_by_delivery_type.len(), 3);
        assert!(stat.most_expensive_parcel.is_none());
        assert!(stat.cheapest_parcel.is_none());
        assert!(stat.heaviest_parcel.is_none());
        assert!(stat.lightest_parcel.is_none());
    }

    #[test]
    fn ties_resolve_to_first_parcel() {
        let mut parcels = initial_parcels();
        parcels[1].price = 90.0;
        let stat = ParcelStatistic::from_parcels(&parcels);
        assert_eq!(id_of(&stat.most_expensive_parcel), Some(2));
    }

    #[test]
    fn empty_statistic_serializes_nulls_and_zero_counts() {
        let json = serde_json::to_value(ParcelStatistic::empty()).unwrap();
        assert_eq!(json["totalParcels"], 0);
        assert!(json["mostExpensiveParcel"].is_null());
        assert_eq!(json["parcelsCountByStatus"]["IN_TRANSIT"], 0);
        assert_eq!(json["parcelsCountByDeliveryType"]["ECONOM"], 0);
    }
}
