//! Geographic coordinates and geodesic distance on the WGS-84 ellipsoid.
//!
//! Distances use Vincenty's inverse formula, which agrees with ellipsoidal
//! geodesic libraries to well under a metre for the city-scale distances a
//! dispatcher compares. Nearly antipodal points can fail to converge; those
//! fall back to the haversine great-circle distance on the mean Earth radius.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;
const MEAN_EARTH_RADIUS_KM: f64 = 6_371.008_8;
const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// A WGS-84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

/// Validation errors returned when constructing [`Coordinates`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinatesValidationError {
    /// One of the components is NaN or infinite.
    #[error("coordinates must be finite numbers")]
    NonFinite,
    /// Latitude falls outside `[-90, 90]`.
    #[error("latitude {0} must be within [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude falls outside `[-180, 180]`.
    #[error("longitude {0} must be within [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesValidationError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinatesValidationError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesValidationError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Geodesic distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Self) -> f64 {
        vincenty_distance_m(self, other)
            .map(|metres| metres / 1_000.0)
            .unwrap_or_else(|| haversine_distance_km(self, other))
    }
}

/// Round a kilometre distance to two decimal places.
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}

fn vincenty_distance_m(from: &Coordinates, to: &Coordinates) -> Option<f64> {
    let a = WGS84_SEMI_MAJOR_AXIS_M;
    let f = WGS84_FLATTENING;
    let b = (1.0 - f) * a;

    let l = (to.longitude - from.longitude).to_radians();
    let u1 = ((1.0 - f) * from.latitude.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * to.latitude.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos²α = 0.
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - previous).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
            let big_a =
                1.0 + u_sq / 16_384.0 * (4_096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1_024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
            return Some(b * big_a * (sigma - delta_sigma));
        }
    }
    None
}

fn haversine_distance_km(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
