use crate::point::GeoPoint;

/// Mean Earth radius used for great-circle distances (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine).
///
/// Properties relied on by visibility filtering:
/// - `haversine_m(p, p) == 0.0` exactly.
/// - `haversine_m(a, b) == haversine_m(b, a)` exactly; deltas are taken as
///   absolute values so argument order never changes a rounding step.
/// - Antipodal points give `π·R`, never NaN (`a` is clamped to `[0, 1]`).
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat_rad();
    let lat2 = b.lat_rad();
    let dlat = (lat2 - lat1).abs();
    let dlon = (b.lon_rad() - a.lon_rad()).abs();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();
    let cos_product = if lat1 <= lat2 {
        lat1.cos() * lat2.cos()
    } else {
        lat2.cos() * lat1.cos()
    };

    let h = (sin_dlat * sin_dlat + cos_product * sin_dlon * sin_dlon).clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::{EARTH_RADIUS_M, haversine_m};
    use crate::point::GeoPoint;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn identical_points_are_exactly_zero() {
        for point in [p(0.0, 0.0), p(53.1653, 5.7815), p(-89.9, 179.9), p(90.0, -180.0)] {
            assert_eq!(haversine_m(point, point), 0.0);
        }
    }

    #[test]
    fn symmetric_in_arguments() {
        let pairs = [
            (p(53.1653, 5.7815), p(53.30, 5.90)),
            (p(-33.86, 151.21), p(51.5074, -0.1278)),
            (p(0.0, 179.5), p(0.0, -179.5)),
            (p(10.0, 20.0), p(-10.0, -160.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_m(a, b), haversine_m(b, a));
        }
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = haversine_m(p(0.0, 0.0), p(0.0, 180.0));
        assert!(d.is_finite());
        assert_close(d, std::f64::consts::PI * EARTH_RADIUS_M, 1e-6);

        let poles = haversine_m(p(90.0, 0.0), p(-90.0, 0.0));
        assert_close(poles, std::f64::consts::PI * EARTH_RADIUS_M, 1e-6);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_m(p(0.0, 0.0), p(1.0, 0.0));
        assert_close(d, EARTH_RADIUS_M * 1f64.to_radians(), 1e-6);
    }

    #[test]
    fn leeuwarden_neighbourhood() {
        // ~17 km between the two points used throughout the filter tests.
        let d = haversine_m(p(53.1653, 5.7815), p(53.30, 5.90));
        assert!(d > 15_000.0 && d < 20_000.0, "got {d}");
    }

    #[test]
    fn crosses_antimeridian_the_short_way() {
        let d = haversine_m(p(0.0, 179.5), p(0.0, -179.5));
        assert_close(d, EARTH_RADIUS_M * 1f64.to_radians(), 1e-6);
    }
}
