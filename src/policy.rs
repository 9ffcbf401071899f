use serde::{Deserialize, Serialize};
use std::fmt;

pub const INTERVAL_MINUTES_RANGE: (f64, f64) = (5.0, 1500.0);
pub const HANDLING_TIME_RANGE: (f64, f64) = (1.0, 30000.0);
pub const SERVICE_LEVEL_TARGET_RANGE: (f64, f64) = (0.00001, 0.9998);
pub const SERVICE_LEVEL_TIME_RANGE: (f64, f64) = (1.0, 30000.0);
pub const MAX_OCCUPANCY_RANGE: (f64, f64) = (0.00001, 0.9998);
pub const SHRINKAGE_RANGE: (f64, f64) = (0.0, 0.9998);

#[derive(Debug, Clone, PartialEq)]
pub enum StaffingError {
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    Unbounded {
        ceiling: u32,
    },
}

impl fmt::Display for StaffingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffingError::OutOfRange {
                parameter,
                value,
                min,
                max,
            } => write!(
                f,
                "{parameter} {value} is outside the valid range [{min}, {max}]"
            ),
            StaffingError::Unbounded { ceiling } => write!(
                f,
                "staffing search exceeded {ceiling} agents without meeting the targets"
            ),
        }
    }
}

impl std::error::Error for StaffingError {}

/// The six session parameters applied to every interval of a plan.
/// Defaults describe a typical inbound voice queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingPolicy {
    pub interval_minutes: f64,
    pub handling_time_seconds: f64,
    pub service_level_target: f64,
    pub service_level_time_seconds: f64,
    pub max_occupancy_target: f64,
    pub shrinkage: f64,
}

impl Default for StaffingPolicy {
    fn default() -> Self {
        Self {
            interval_minutes: 30.0,
            handling_time_seconds: 360.0,
            service_level_target: 0.80,
            service_level_time_seconds: 30.0,
            max_occupancy_target: 0.85,
            shrinkage: 0.17,
        }
    }
}

fn check_range(
    parameter: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), StaffingError> {
    // Written so NaN fails the comparison and reports as out of range
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(StaffingError::OutOfRange {
            parameter,
            value,
            min,
            max,
        })
    }
}

impl StaffingPolicy {
    /// Reject any parameter outside its documented interval. Nothing is
    /// silently corrected here; callers see which parameter is invalid.
    pub fn validate(&self) -> Result<(), StaffingError> {
        check_range(
            "interval_minutes",
            self.interval_minutes,
            INTERVAL_MINUTES_RANGE,
        )?;
        check_range(
            "handling_time_seconds",
            self.handling_time_seconds,
            HANDLING_TIME_RANGE,
        )?;
        check_range(
            "service_level_target",
            self.service_level_target,
            SERVICE_LEVEL_TARGET_RANGE,
        )?;
        check_range(
            "service_level_time_seconds",
            self.service_level_time_seconds,
            SERVICE_LEVEL_TIME_RANGE,
        )?;
        check_range(
            "max_occupancy_target",
            self.max_occupancy_target,
            MAX_OCCUPANCY_RANGE,
        )?;
        check_range("shrinkage", self.shrinkage, SHRINKAGE_RANGE)?;
        Ok(())
    }
}
