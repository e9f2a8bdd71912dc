// Motor output sinks
//
// A sink accepts a signed speed command, nominally in [-1.0, 1.0], and
// remembers the last value it was given.

use tracing::info;

/// Anything that can take a speed command for one motor.
pub trait MotorSink: Send {
    /// Command a speed. Ignored while the sink is disabled.
    fn set(&mut self, speed: f64);

    /// Most recently commanded speed
    fn get(&self) -> f64;

    fn enable(&mut self);

    /// Zero the output and stop accepting commands until re-enabled.
    fn disable(&mut self);

    fn is_enabled(&self) -> bool;
}

/// In-memory speed controller on a PWM channel.
///
/// Stands in for a physical controller when running without hardware.
#[derive(Debug, Clone)]
pub struct SimController {
    channel: u8,
    speed: f64,
    enabled: bool,
}

impl SimController {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            speed: 0.0,
            enabled: true,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl MotorSink for SimController {
    fn set(&mut self, speed: f64) {
        if self.enabled {
            self.speed = speed;
        }
    }

    fn get(&self) -> f64 {
        self.speed
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        info!("Disabling controller on channel {}", self.channel);
        self.set(0.0);
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get() {
        let mut controller = SimController::new(3);
        assert_eq!(controller.get(), 0.0);
        assert_eq!(controller.channel(), 3);

        controller.set(0.4);
        assert_eq!(controller.get(), 0.4);

        // Range is not enforced
        controller.set(-1.5);
        assert_eq!(controller.get(), -1.5);
    }

    #[test]
    fn test_disable_latches() {
        let mut controller = SimController::new(1);
        controller.set(0.8);
        controller.disable();
        assert!(!controller.is_enabled());
        assert_eq!(controller.get(), 0.0);

        controller.set(1.0);
        assert_eq!(controller.get(), 0.0);

        controller.enable();
        controller.set(1.0);
        assert_eq!(controller.get(), 1.0);
    }
}
