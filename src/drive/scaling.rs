// Speed-factor strategies
//
// After a straight or rotate command the drivetrain may ask a strategy for a
// pair of gearbox speed factors. The default strategy leaves the factors alone.

use tracing::debug;

/// Picks per-side gearbox speed factors from wanted and measured speeds.
pub trait SpeedScaling: Send {
    /// Returns `Some((left, right))` to overwrite the gearbox speed factors, or
    /// `None` to leave them as they are.
    fn factors(&mut self, wanted: (f64, f64), measured: (f64, f64)) -> Option<(f64, f64)>;
}

/// Never touches the speed factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScaling;

impl SpeedScaling for NoScaling {
    fn factors(&mut self, _wanted: (f64, f64), _measured: (f64, f64)) -> Option<(f64, f64)> {
        None
    }
}

/// Slip compensation: throttles the faster side toward the slower one.
///
/// Below `no_scale_speed` on either side, or when both sides already match,
/// the factors are reset to 1.
#[derive(Debug, Clone, Copy)]
pub struct SpeedEqualizer {
    no_scale_speed: f64,
}

impl SpeedEqualizer {
    pub fn new(no_scale_speed: f64) -> Self {
        Self { no_scale_speed }
    }

    pub fn no_scale_speed(&self) -> f64 {
        self.no_scale_speed
    }
}

impl SpeedScaling for SpeedEqualizer {
    fn factors(&mut self, wanted: (f64, f64), measured: (f64, f64)) -> Option<(f64, f64)> {
        let (wanted_left, wanted_right) = wanted;
        let (left, right) = measured;

        let factors = if left.abs() <= self.no_scale_speed
            || right.abs() <= self.no_scale_speed
            || left == right
        {
            (1.0, 1.0)
        } else if left > right {
            (right / left * wanted_left / wanted_right, 1.0)
        } else {
            (1.0, left / right * wanted_right / wanted_left)
        };

        let factors = if factors.0.is_finite() && factors.1.is_finite() {
            factors
        } else {
            (1.0, 1.0)
        };
        debug!(left = factors.0, right = factors.1, "speed factors");
        Some(factors)
    }
}
