use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeError {
    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Duplicate entity id: {0}")]
    DuplicateId(String),

    #[error("Entity not found: {0}")]
    UnknownEntity(String),
}
