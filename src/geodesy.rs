//! Geodesic helpers for grid construction and neighbour searches.
//!
//! Only the projections and distances the QC pipeline needs: great-circle
//! (haversine) distance, a planar approximation for short baselines, and the
//! forward WGS84 geodesic (Vincenty direct).

use crate::constants::{EARTH_RADIUS_KM, WGS84_A, WGS84_F};

/// Distances between two points, in kilometres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    /// Great-circle distance on the mean-radius sphere
    pub haversine_km: f64,
    /// Equirectangular approximation, valid for short baselines only
    pub planar_km: f64,
}

/// Distance between two points given in decimal degrees
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Distance {
    Distance {
        haversine_km: haversine_km(lat1, lon1, lat2, lon2),
        planar_km: planar_km(lat1, lon1, lat2, lon2),
    }
}

/// Great-circle distance in kilometres
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Planar approximation in kilometres
pub fn planar_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let mean_lat = ((lat1 + lat2) / 2.0).to_radians();
    let x = (lon2 - lon1).to_radians() * mean_lat.cos();
    let y = (lat2 - lat1).to_radians();
    EARTH_RADIUS_KM * x.hypot(y)
}

/// Forward geodesic on the WGS84 ellipsoid.
///
/// Returns the `(lat, lon)` reached from `(lat, lon)` after travelling
/// `distance_m` metres along the initial bearing `bearing_deg` (clockwise
/// from true north).
pub fn project(lat: f64, lon: f64, bearing_deg: f64, distance_m: f64) -> (f64, f64) {
    if distance_m == 0.0 {
        return (lat, lon);
    }

    let a = WGS84_A;
    let f = WGS84_F;
    let b = a * (1.0 - f);

    let alpha1 = bearing_deg.to_radians();
    let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

    let tan_u1 = (1.0 - f) * lat.to_radians().tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;

    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

    let sigma0 = distance_m / (b * big_a);
    let mut sigma = sigma0;
    for _ in 0..200 {
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        let delta_sigma = delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
        let next = sigma0 + delta_sigma;
        let converged = (next - sigma).abs() < 1e-12;
        sigma = next;
        if converged {
            break;
        }
    }

    let (sin_sigma, cos_sigma) = sigma.sin_cos();
    let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();

    let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let phi2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - f) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
    let lambda =
        (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * f
            * sin_alpha
            * (sigma
                + c * sin_sigma
                    * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

    (phi2.to_degrees(), normalize_longitude(lon + l.to_degrees()))
}

fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let c2 = cos_2sigma_m * cos_2sigma_m;
    big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * c2)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * c2)))
}

/// Wrap a longitude into [-180, 180)
fn normalize_longitude(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}
