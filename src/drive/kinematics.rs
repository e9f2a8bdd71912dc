// Differential drive mixing
// Converts a single forward/turn command pair into left/right wheel speeds.

/// Per-side speed commands, nominally in [-1.0, 1.0]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

impl WheelSpeeds {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns speeds as array [left, right]
    pub fn as_array(&self) -> [f64; 2] {
        [self.left, self.right]
    }
}

/// Single-stick arcade mix
///
/// Four-quadrant max-based mixing: turning in place works with zero forward
/// value, and adding rotation never pulls the outer wheel below the inner one.
/// Inputs are not clamped, so out-of-range commands produce out-of-range
/// speeds.
///
/// `move_value == 0` and `rotate_value == 0` both take the `else` branches.
///
/// # Arguments
/// * `move_value` - Forward command (positive = forward)
/// * `rotate_value` - Turn command (positive = right wheel faster)
pub fn arcade_mix(move_value: f64, rotate_value: f64) -> WheelSpeeds {
    let (left, right) = if move_value > 0.0 {
        if rotate_value > 0.0 {
            (move_value - rotate_value, move_value.max(rotate_value))
        } else {
            (move_value.max(-rotate_value), move_value + rotate_value)
        }
    } else if rotate_value > 0.0 {
        (-(-move_value).max(rotate_value), move_value + rotate_value)
    } else {
        (move_value - rotate_value, -(-move_value).max(-rotate_value))
    };

    WheelSpeeds { left, right }
}
