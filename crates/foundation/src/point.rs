use serde::{Deserialize, Serialize};

/// A position on the Earth's surface in decimal degrees.
///
/// Latitude is in `[-90, 90]`, longitude in `[-180, 180]`. Construction goes
/// through [`GeoPoint::new`] (or serde, which validates the same way), so a
/// `GeoPoint` in hand is always in range and finite.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLon")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
    #[error("could not parse coordinate pair {0:?} (expected LAT,LON)")]
    Parse(String),
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude.to_radians()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Parses `"LAT,LON"` (whitespace around either number is allowed).
impl std::str::FromStr for GeoPoint {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || CoordinateError::Parse(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(parse_err)?;
        let lat: f64 = lat.trim().parse().map_err(|_| parse_err())?;
        let lon: f64 = lon.trim().parse().map_err(|_| parse_err())?;
        GeoPoint::new(lat, lon)
    }
}

#[derive(Deserialize)]
struct LatLon {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<LatLon> for GeoPoint {
    type Error = CoordinateError;

    fn try_from(raw: LatLon) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoordinateError, GeoPoint};

    #[test]
    fn accepts_range_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert_eq!(
            GeoPoint::new(90.5, 0.0),
            Err(CoordinateError::Latitude(90.5))
        );
        assert_eq!(
            GeoPoint::new(0.0, -180.5),
            Err(CoordinateError::Longitude(-180.5))
        );
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn parses_lat_lon_pair() {
        let p: GeoPoint = " 53.1653 , 5.7815 ".parse().unwrap();
        assert_eq!(p.latitude(), 53.1653);
        assert_eq!(p.longitude(), 5.7815);
        assert!("53.1653".parse::<GeoPoint>().is_err());
        assert!("north,east".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn serde_validates_range() {
        let ok: GeoPoint = serde_json::from_str(r#"{"latitude":52.09,"longitude":5.12}"#).unwrap();
        assert_eq!(ok, GeoPoint::new(52.09, 5.12).unwrap());
        let bad = serde_json::from_str::<GeoPoint>(r#"{"latitude":120.0,"longitude":5.12}"#);
        assert!(bad.is_err());
    }
}
