use thiserror::Error;

use crate::world::EntityId;

#[derive(Debug, Error)]
pub enum RailError {
    #[error("path segment has no curves")]
    EmptySegment,

    #[error("unknown vehicle {0}")]
    UnknownVehicle(EntityId),

    #[error("vehicle {0} is already registered")]
    DuplicateVehicle(EntityId),

    #[error("invalid config value `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}

pub type Result<T> = std::result::Result<T, RailError>;
