//! Orders candidate restaurants by geodesic distance from the delivery point.

use std::cmp::Ordering;

use serde::Serialize;

use super::{Coordinates, RestaurantId, RestaurantInfo, round_km};

/// Restaurant able to fulfil an order, with its distance when known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRestaurant {
    /// Restaurant identifier.
    pub restaurant_id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Raw street address.
    pub address: String,
    /// Distance in kilometres rounded to two decimals.
    pub distance_km: Option<f64>,
}

/// Candidate paired with its resolved position, prior to ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrankedCandidate {
    /// Restaurant to rank.
    pub restaurant: RestaurantInfo,
    /// Resolved restaurant position, if geocoding succeeded.
    pub coordinates: Option<Coordinates>,
}

/// Pure, deterministic distance ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceRanker;

impl DistanceRanker {
    /// Rank `candidates` by distance from `origin`.
    ///
    /// Known distances come first in ascending order. Candidates with an
    /// unknown distance follow in their input order.
    pub fn rank(
        &self,
        origin: Option<Coordinates>,
        candidates: impl IntoIterator<Item = UnrankedCandidate>,
    ) -> Vec<CandidateRestaurant> {
        let mut ranked: Vec<CandidateRestaurant> = candidates
            .into_iter()
            .map(|candidate| {
                let distance_km = origin
                    .zip(candidate.coordinates)
                    .map(|(from, to)| round_km(from.distance_km(&to)));
                CandidateRestaurant {
                    restaurant_id: candidate.restaurant.id,
                    name: candidate.restaurant.name,
                    address: candidate.restaurant.address,
                    distance_km,
                }
            })
            .collect();
        ranked.sort_by(|left, right| compare_distance(left.distance_km, right.distance_km));
        ranked
    }
}

fn compare_distance(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
