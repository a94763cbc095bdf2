//! Distances and coordinate checks

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Whether the point falls inside Cameroon's bounding box
#[must_use]
pub fn validate_coordinates(lat: f64, lon: f64) -> bool {
    (1.7..=13.1).contains(&lat) && (8.5..=16.2).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaounde_douala_distance() {
        let km = haversine_km(3.848, 11.502, 4.051, 9.768);
        assert!((190.0..200.0).contains(&km), "got {km}");
        assert_eq!(haversine_km(4.0, 10.0, 4.0, 10.0), 0.0);
    }

    #[test]
    fn test_bounding_box() {
        assert!(validate_coordinates(3.848, 11.502));
        assert!(!validate_coordinates(6.5, 3.4));
    }
}
