// Gearbox: one motor assembly's commanded speed
//
// Wraps a single motor sink with a safety-disable latch and a post-scale
// speed factor. The factor only affects what reaches the sink; `get()` always
// reports the speed that was asked for.

use tracing::{debug, info};

use super::sink::{MotorSink, SimController};

pub struct Gearbox {
    sink: Box<dyn MotorSink>,
    speed: f64,
    enabled: bool,
    speed_factor: f64,
}

impl Gearbox {
    /// Wrap an existing motor sink
    pub fn new(sink: Box<dyn MotorSink>) -> Self {
        Self {
            sink,
            speed: 0.0,
            enabled: true,
            speed_factor: 1.0,
        }
    }

    /// Gearbox driving a simulated controller on `channel`
    pub fn simulated(channel: u8) -> Self {
        Self::new(Box::new(SimController::new(channel)))
    }

    /// Command a speed. No-op while disabled; range is not enforced.
    pub fn set(&mut self, speed: f64) {
        if !self.enabled {
            return;
        }
        self.speed = speed;
        self.write_sink();
    }

    /// Last commanded speed, 0 if never set or disabled
    pub fn get(&self) -> f64 {
        self.speed
    }

    pub fn stop(&mut self) {
        self.set(0.0);
    }

    /// Zero the output and latch disabled until `enable()`
    pub fn disable(&mut self) {
        info!("Disabling gearbox");
        self.speed = 0.0;
        self.sink.set(0.0);
        self.sink.disable();
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        info!("Enabling gearbox");
        self.sink.enable();
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Post-multiplier applied on the way to the sink
    pub fn set_speed_factor(&mut self, factor: f64) {
        self.speed_factor = factor;
        if self.enabled {
            self.write_sink();
        }
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    /// Output stage hook; same as `set`
    pub fn pid_write(&mut self, output: f64) {
        self.set(output);
    }

    /// Value the sink actually received
    pub fn output(&self) -> f64 {
        self.sink.get()
    }

    fn write_sink(&mut self) {
        let output = self.speed * self.speed_factor;
        debug!(speed = self.speed, factor = self.speed_factor, output, "gearbox write");
        self.sink.set(output);
    }
}
