//! Learning-rate and exploration-rate schedules

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Law mapping the cumulative episode count to a rate.
///
/// The same rate is applied to both alpha and epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateSchedule {
    /// `rate = n^(-exponent)`; decreasing, never zero.
    PowerLaw { exponent: f64 },
    /// `rate = 1 - n / horizon`; exhausted once the rate would reach zero.
    Linear { horizon: u64 },
}

impl Default for RateSchedule {
    fn default() -> Self {
        RateSchedule::PowerLaw { exponent: 0.2 }
    }
}

impl RateSchedule {
    /// Check the schedule's own parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            RateSchedule::PowerLaw { exponent } if !(exponent.is_finite() && exponent > 0.0) => {
                Err(Error::InvalidConfiguration {
                    message: format!("power-law exponent must be positive, got {exponent}"),
                })
            }
            RateSchedule::Linear { horizon: 0 } => Err(Error::InvalidConfiguration {
                message: "linear schedule horizon must be positive".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Rate after `episode` episodes on top of `offset` already completed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScheduleExhausted`] when a linear schedule would yield
    /// a rate at or below zero.
    pub fn rate(&self, offset: u64, episode: u64) -> Result<f64> {
        let elapsed = offset.saturating_add(episode);
        match *self {
            RateSchedule::PowerLaw { exponent } => Ok((elapsed.max(1) as f64).powf(-exponent)),
            RateSchedule::Linear { horizon } => {
                let rate = 1.0 - elapsed as f64 / horizon as f64;
                if rate > 0.0 {
                    Ok(rate)
                } else {
                    Err(Error::ScheduleExhausted { episode: elapsed })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_law_decreases_and_stays_positive() {
        let schedule = RateSchedule::default();
        let mut previous = f64::INFINITY;
        for episode in [1, 2, 10, 100, 10_000, 1_000_000] {
            let rate = schedule.rate(0, episode).unwrap();
            assert!(rate < previous);
            assert!(rate > 0.0);
            previous = rate;
        }
        assert_eq!(schedule.rate(0, 1).unwrap(), 1.0);
    }

    #[test]
    fn test_power_law_uses_offset() {
        let schedule = RateSchedule::PowerLaw { exponent: 0.2 };
        assert_eq!(schedule.rate(30, 2).unwrap(), schedule.rate(0, 32).unwrap());
        assert!((schedule.rate(0, 32).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_power_law_at_zero_is_finite() {
        assert_eq!(RateSchedule::default().rate(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_linear_exhausts() {
        let schedule = RateSchedule::Linear { horizon: 4 };
        assert!((schedule.rate(0, 1).unwrap() - 0.75).abs() < 1e-12);
        assert!((schedule.rate(0, 3).unwrap() - 0.25).abs() < 1e-12);
        assert!(matches!(
            schedule.rate(0, 4),
            Err(Error::ScheduleExhausted { episode: 4 })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(RateSchedule::default().validate().is_ok());
        assert!(RateSchedule::PowerLaw { exponent: 0.0 }.validate().is_err());
        assert!(RateSchedule::Linear { horizon: 0 }.validate().is_err());
    }
}
