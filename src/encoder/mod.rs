// Wheel encoder model
//
// Provides:
// - The `PulseSource` seam the drivetrain reads measurements through
// - Quadrature decoding types (1x / 2x / 4x)
// - A synthetic pulse counter whose rate is driven by the commanded speed

mod pulse_counter;

pub use pulse_counter::{EncodingType, PulseCounter};

/// A source of encoder pulses for one wheel.
///
/// The drivetrain only ever talks to this trait, so a hardware-counted source
/// can replace the synthetic [`PulseCounter`] without touching the kinematics.
pub trait PulseSource: Send {
    /// Raw tick count, unscaled by the decoding type.
    fn raw(&self) -> i32;

    /// Zero the tick count.
    fn reset(&mut self);

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// A disabled source is considered stopped.
    fn stopped(&self) -> bool {
        !self.is_enabled()
    }

    /// Distance since the last reset, in distance-per-pulse units.
    fn distance(&self) -> f64;

    /// Accumulate travelled distance (negative values are ignored).
    fn add_distance(&mut self, distance: f64);

    /// Rate in distance-per-pulse units per second. Returns 0.0 when no period
    /// has been measured.
    fn rate(&self) -> f64;

    /// Drive the measured rate directly (simulation coupling).
    fn set_rate(&mut self, rate: f64);

    /// Period of the most recent pulse in seconds, compensated for decoding.
    fn period(&self) -> f64;

    fn set_period(&mut self, period: f64);
}
