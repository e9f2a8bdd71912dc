// Synthetic quadrature pulse counter
//
// Accumulates raw ticks and derives distance and rate from the decoding scale
// (calibration constant x encoding multiplier) and the distance per pulse.
// In simulation the rate is written straight from the commanded speed.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::PulseSource;

/// How many edges per quadrature cycle are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingType {
    /// Rising edge of channel A only
    #[default]
    K1X,
    /// Rising and falling edges of channel A
    K2X,
    /// Rising and falling edges of both channels
    K4X,
}

impl EncodingType {
    /// Multiplier applied to the raw count for this decoding type
    pub fn multiplier(self) -> f64 {
        match self {
            EncodingType::K1X => 1.0,
            EncodingType::K2X => 2.0,
            EncodingType::K4X => 4.0,
        }
    }
}

/// Timing state behind `rate()` / `period()`.
///
/// A measured period is what a real counter latches between edges. A synthetic
/// rate is kept as-is so that `rate()` reads back exactly what was written.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Timing {
    Period(f64),
    Rate(f64),
}

/// Quadrature encoder model for one wheel.
#[derive(Debug, Clone)]
pub struct PulseCounter {
    channels: (u8, u8),
    ticks: i32,
    // Fractional ticks left over from `add_distance`
    pending: f64,
    encoding: EncodingType,
    calibration: f64,
    distance_per_pulse: f64,
    timing: Timing,
    reverse_direction: bool,
    enabled: bool,
}

impl PulseCounter {
    /// Create a counter on the given A/B channels with 1x decoding and a
    /// calibration constant of 1.
    pub fn new(a_channel: u8, b_channel: u8) -> Self {
        Self::with_calibration(a_channel, b_channel, EncodingType::default(), 1.0)
    }

    /// Create a counter with an explicit decoding type and per-device
    /// calibration constant (e.g. 0.9 for a unit that under-counts by 10%).
    pub fn with_calibration(
        a_channel: u8,
        b_channel: u8,
        encoding: EncodingType,
        calibration: f64,
    ) -> Self {
        Self {
            channels: (a_channel, b_channel),
            ticks: 0,
            pending: 0.0,
            encoding,
            calibration,
            distance_per_pulse: 1.0,
            timing: Timing::Period(0.0),
            reverse_direction: false,
            enabled: true,
        }
    }

    /// Builder-style distance per pulse
    pub fn with_distance_per_pulse(mut self, distance_per_pulse: f64) -> Self {
        self.distance_per_pulse = distance_per_pulse;
        self
    }

    /// Builder-style reverse direction
    pub fn reversed(mut self, reverse_direction: bool) -> Self {
        self.reverse_direction = reverse_direction;
        self
    }

    pub fn channels(&self) -> (u8, u8) {
        self.channels
    }

    /// Enable counting
    pub fn start(&mut self) {
        self.enabled = true;
    }

    /// Disable counting
    pub fn stop(&mut self) {
        self.enabled = false;
    }

    /// Current count adjusted for the decoding scale, truncated toward zero.
    pub fn get(&self) -> i32 {
        (self.ticks as f64 * self.decoding_scale() * self.sign()) as i32
    }

    /// Accumulate raw ticks. Negative counts are ignored.
    pub fn add_ticks(&mut self, ticks: i32) {
        let ticks = ticks.max(0);
        self.set_ticks(self.ticks.saturating_add(ticks));
    }

    pub fn set_ticks(&mut self, ticks: i32) {
        trace!(channels = ?self.channels, ticks, "set ticks");
        self.ticks = ticks;
    }

    /// Reset, then back-solve the tick count so that `distance()` reads `distance`
    /// to within one tick.
    ///
    /// Targets beyond the `i32` tick range saturate at the nearest end of it.
    pub fn set_distance(&mut self, distance: f64) {
        self.reset();
        let per_tick = self.distance_per_tick();
        if per_tick == 0.0 || !per_tick.is_finite() {
            return;
        }
        let ticks = distance * self.sign() / per_tick;
        if ticks > i32::MAX as f64 || ticks < i32::MIN as f64 {
            warn!(
                channels = ?self.channels,
                distance, "distance out of tick range, saturating"
            );
        }
        self.set_ticks(ticks as i32);
    }

    /// Calibration constant x encoding multiplier
    pub fn decoding_scale(&self) -> f64 {
        self.calibration * self.encoding.multiplier()
    }

    pub fn calibration(&self) -> f64 {
        self.calibration
    }

    pub fn encoding_type(&self) -> EncodingType {
        self.encoding
    }

    pub fn set_encoding_type(&mut self, encoding: EncodingType) {
        self.encoding = encoding;
    }

    pub fn distance_per_pulse(&self) -> f64 {
        self.distance_per_pulse
    }

    /// Distance moved per pulse, excluding the decoding scale
    pub fn set_distance_per_pulse(&mut self, distance_per_pulse: f64) {
        self.distance_per_pulse = distance_per_pulse;
    }

    /// Whether counts are inverted so that forward motion reads positive
    pub fn direction(&self) -> bool {
        self.reverse_direction
    }

    pub fn set_reverse_direction(&mut self, reverse_direction: bool) {
        self.reverse_direction = reverse_direction;
    }

    fn sign(&self) -> f64 {
        if self.reverse_direction { -1.0 } else { 1.0 }
    }

    fn distance_per_tick(&self) -> f64 {
        self.decoding_scale() * self.distance_per_pulse
    }
}

impl PulseSource for PulseCounter {
    fn raw(&self) -> i32 {
        self.ticks
    }

    fn reset(&mut self) {
        self.ticks = 0;
        self.pending = 0.0;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn distance(&self) -> f64 {
        self.ticks as f64 * self.distance_per_tick() * self.sign()
    }

    /// Travel is counted in the sensor's own counting direction; the sign of
    /// `distance()` comes from the reverse-direction flag.
    fn add_distance(&mut self, distance: f64) {
        let per_tick = self.distance_per_tick();
        if distance <= 0.0 || per_tick == 0.0 || !per_tick.is_finite() {
            return;
        }
        let ticks = self.pending + distance / per_tick;
        let whole = ticks.trunc();
        self.pending = ticks - whole;
        self.add_ticks(whole as i32);
    }

    fn rate(&self) -> f64 {
        match self.timing {
            Timing::Rate(rate) => rate * self.sign(),
            Timing::Period(_) => {
                let period = self.period();
                if period == 0.0 || !period.is_finite() {
                    0.0
                } else {
                    self.distance_per_pulse / period * self.sign()
                }
            }
        }
    }

    fn set_rate(&mut self, rate: f64) {
        self.timing = Timing::Rate(rate * self.sign());
    }

    fn period(&self) -> f64 {
        match self.timing {
            Timing::Period(period) => period / self.decoding_scale(),
            Timing::Rate(rate) if rate == 0.0 => f64::INFINITY,
            Timing::Rate(rate) => self.distance_per_pulse / rate,
        }
    }

    fn set_period(&mut self, period: f64) {
        self.timing = Timing::Period(period);
    }
}
