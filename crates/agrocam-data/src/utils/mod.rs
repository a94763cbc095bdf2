//! Pure agronomic calculators

pub mod agro;
pub mod format;
pub mod geo;
pub mod units;

pub use agro::{
    estimate_maturity, growing_degree_days, moon_phase, season_for, seasonal_activities,
    MaturityEstimate, MoonPhase,
};
pub use format::{format_area, format_fcfa, roi, sanitize_input, validate_phone, RoiSummary};
pub use geo::{haversine_km, validate_coordinates};
pub use units::convert_units;
