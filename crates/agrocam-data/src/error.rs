//! Error types for agrocam-data

use thiserror::Error;

/// Data lookup error
#[derive(Debug, Error)]
pub enum Error {
    /// Region name not recognised
    #[error("région inconnue: {0}")]
    UnknownRegion(String),

    /// Crop name not recognised
    #[error("culture inconnue: {0}")]
    UnknownCrop(String),

    /// Unit pair without a conversion factor
    #[error("Conversion non supportée: {from} vers {to}")]
    UnsupportedConversion {
        /// Source unit
        from: String,
        /// Target unit
        to: String,
    },

    /// Out-of-range or malformed input
    #[error("entrée invalide: {0}")]
    InvalidInput(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
