use thiserror::Error;

/// Rejected field or palette parameters.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("parameter '{name}' must be finite (got {value})")]
    NonFinite { name: &'static str, value: f32 },

    #[error("z_max must be non-zero")]
    ZeroRange,

    #[error("invalid palette: {0}")]
    Palette(String),
}
