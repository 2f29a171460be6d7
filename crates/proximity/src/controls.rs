//! Conversions for values coming from user-facing controls.

/// Meters per kilometer; the radius control is in kilometers.
pub const METERS_PER_KM: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RadiusInputError {
    #[error("radius {0:?} is not a number")]
    NotANumber(String),
}

pub fn km_to_meters(km: f64) -> f64 {
    km * METERS_PER_KM
}

/// Parses the radius control's text (kilometers) into meters.
///
/// Blank input means a radius of zero. Negative values pass through unchanged;
/// clamping happens when the radius is applied to a region.
pub fn parse_radius_km(text: &str) -> Result<f64, RadiusInputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let km: f64 = trimmed
        .parse()
        .map_err(|_| RadiusInputError::NotANumber(text.to_string()))?;
    if km.is_nan() {
        return Err(RadiusInputError::NotANumber(text.to_string()));
    }
    Ok(km_to_meters(km))
}

#[cfg(test)]
mod tests {
    use super::{RadiusInputError, parse_radius_km};

    #[test]
    fn ten_km_is_ten_thousand_meters() {
        assert_eq!(parse_radius_km("10"), Ok(10_000.0));
        assert_eq!(parse_radius_km(" 2.5 "), Ok(2_500.0));
    }

    #[test]
    fn blank_is_zero() {
        assert_eq!(parse_radius_km(""), Ok(0.0));
        assert_eq!(parse_radius_km("   "), Ok(0.0));
    }

    #[test]
    fn rejects_non_numeric() {
        assert_eq!(
            parse_radius_km("ten"),
            Err(RadiusInputError::NotANumber("ten".to_string()))
        );
        assert!(parse_radius_km("NaN").is_err());
    }

    #[test]
    fn negative_passes_through() {
        assert_eq!(parse_radius_km("-5"), Ok(-5_000.0));
    }
}
