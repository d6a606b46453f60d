use thiserror::Error;

/// A tuning value that cannot drive the controller. Raised once at spawn, never per frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be finite")]
    NotFinite { field: &'static str },

    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("`{field}` must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    #[error("crouch scale must be in (0, 1] (got {0})")]
    CrouchScaleOutOfRange(f32),
}
