use std::ops::RangeInclusive;

use crate::definitions::{DEFAULT_MAX_AREA, DEFAULT_MIN_AREA};

use super::ConfigError;

/// Inclusive pixel-area bounds for a region to count as debris. `min_area <= max_area` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Thresholds {
    min_area: u32,
    max_area: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            max_area: DEFAULT_MAX_AREA,
        }
    }
}

impl Thresholds {
    pub fn new(min_area: u32, max_area: u32) -> Result<Self, ConfigError> {
        if min_area > max_area {
            return Err(ConfigError::MinAboveMax {
                min: min_area,
                max: max_area,
            });
        }

        Ok(Self { min_area, max_area })
    }

    pub fn min_area(&self) -> u32 {
        self.min_area
    }

    pub fn max_area(&self) -> u32 {
        self.max_area
    }

    pub fn with_min_area(self, min_area: u32) -> Result<Self, ConfigError> {
        Self::new(min_area, self.max_area)
    }

    pub fn with_max_area(self, max_area: u32) -> Result<Self, ConfigError> {
        if max_area < self.min_area {
            return Err(ConfigError::MaxBelowMin {
                min: self.min_area,
                max: max_area,
            });
        }
        Self::new(self.min_area, max_area)
    }

    pub fn contains(&self, area: u32) -> bool {
        self.as_range().contains(&area)
    }

    pub fn as_range(&self) -> RangeInclusive<u32> {
        self.min_area..=self.max_area
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let t = Thresholds::new(50, 5000).unwrap();
        assert!(!t.contains(49));
        assert!(t.contains(50));
        assert!(t.contains(120));
        assert!(t.contains(5000));
        assert!(!t.contains(5001));
    }

    #[test]
    fn test_equal_bounds() {
        let t = Thresholds::new(7, 7).unwrap();
        assert!(t.contains(7));
        assert!(!t.contains(6));
        assert!(!t.contains(8));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert_eq!(
            Thresholds::new(10, 9),
            Err(ConfigError::MinAboveMax { min: 10, max: 9 })
        );

        let t = Thresholds::new(10, 20).unwrap();
        assert_eq!(
            t.with_min_area(21),
            Err(ConfigError::MinAboveMax { min: 21, max: 20 })
        );
        assert_eq!(
            t.with_max_area(9),
            Err(ConfigError::MaxBelowMin { min: 10, max: 9 })
        );
        assert_eq!(t.with_max_area(10), Thresholds::new(10, 10));
    }

    #[test]
    fn test_parse_area() {
        assert_eq!(ConfigError::parse_area(" 120 \n"), Ok(120));
        assert_eq!(ConfigError::parse_area("0"), Ok(0));
        assert_eq!(ConfigError::parse_area("-5"), Err(ConfigError::Negative(-5)));
        assert_eq!(
            ConfigError::parse_area("5000000000"),
            Err(ConfigError::TooLarge(5_000_000_000))
        );
        assert_eq!(ConfigError::parse_area("ten"), Err(ConfigError::NotANumber));
        assert_eq!(ConfigError::parse_area(""), Err(ConfigError::NotANumber));
    }

    #[test]
    fn test_check_learning_rate() {
        assert_eq!(ConfigError::check_learning_rate(0.05), Ok(0.05));
        assert_eq!(ConfigError::check_learning_rate(1.0), Ok(1.0));

        for bad in [0.0, -1.0, 1.5, 5.0, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(
                ConfigError::check_learning_rate(bad),
                Err(ConfigError::LearningRate(bad))
            );
        }
        assert!(matches!(
            ConfigError::check_learning_rate(f32::NAN),
            Err(ConfigError::LearningRate(rate)) if rate.is_nan()
        ));
    }
}
