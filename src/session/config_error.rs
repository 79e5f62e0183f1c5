use thiserror::Error;

/// A rejected setting. The session is left unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("Area must not be negative (got {0})")]
    Negative(i64),

    #[error("Area is too large (got {0}, maximum is {max})", max = u32::MAX)]
    TooLarge(i64),

    #[error("Minimum area {min} would exceed the maximum area {max}")]
    MinAboveMax { min: u32, max: u32 },

    #[error("Maximum area {max} would be below the minimum area {min}")]
    MaxBelowMin { min: u32, max: u32 },

    #[error("Not a whole number")]
    NotANumber,

    #[error("Learning rate must be greater than 0 and at most 1 (got {0})")]
    LearningRate(f32),
}

impl ConfigError {
    /// Parse user input as an area. Signs are accepted so that negative input is reported
    /// as negative rather than as garbage.
    pub fn parse_area(text: &str) -> Result<u32, Self> {
        let value = text.trim().parse::<i64>().map_err(|_| Self::NotANumber)?;
        Self::check_area(value)
    }

    pub fn check_area(value: i64) -> Result<u32, Self> {
        if value < 0 {
            return Err(Self::Negative(value));
        }
        u32::try_from(value).map_err(|_| Self::TooLarge(value))
    }

    /// A running-average learning rate must lie in `(0, 1]`. NaN and infinities are rejected.
    pub fn check_learning_rate(rate: f32) -> Result<f32, Self> {
        if rate.is_finite() && rate > 0.0 && rate <= 1.0 {
            Ok(rate)
        } else {
            Err(Self::LearningRate(rate))
        }
    }
}
