// Gearbox paired with its wheel encoder
//
// Converts encoder readings into linear and angular wheel quantities using the
// wheel radius.

use tracing::debug;

use super::DriveError;
use crate::encoder::PulseSource;
use crate::motor::Gearbox;

pub struct MonitoredGearbox {
    name: String,
    gearbox: Gearbox,
    encoder: Box<dyn PulseSource>,
    wheel_radius: f64,
}

impl MonitoredGearbox {
    /// Bind a gearbox to its encoder.
    ///
    /// Fails if `wheel_radius` is not a positive finite number, since every
    /// angular reading divides by it.
    pub fn new(
        name: impl Into<String>,
        gearbox: Gearbox,
        encoder: Box<dyn PulseSource>,
        wheel_radius: f64,
    ) -> Result<Self, DriveError> {
        let name = name.into();
        check_wheel_radius(&name, wheel_radius)?;
        Ok(Self {
            name,
            gearbox,
            encoder,
            wheel_radius,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Forward a speed command to the gearbox
    pub fn set(&mut self, speed: f64) {
        self.gearbox.set(speed);
    }

    /// Commanded speed
    pub fn get(&self) -> f64 {
        self.gearbox.get()
    }

    /// Distance travelled since the last reset
    pub fn distance(&self) -> f64 {
        self.encoder.distance()
    }

    /// Wheel rotation in radians
    pub fn angle(&self) -> f64 {
        self.distance() / self.wheel_radius
    }

    /// Measured linear velocity
    pub fn velocity(&self) -> f64 {
        self.encoder.rate()
    }

    /// Measured angular velocity in radians per second
    pub fn angular_velocity(&self) -> f64 {
        self.velocity() / self.wheel_radius
    }

    pub fn reset(&mut self) {
        self.encoder.reset();
    }

    pub fn start_encoders(&mut self) {
        self.encoder.set_enabled(true);
    }

    pub fn stop_encoders(&mut self) {
        self.encoder.set_enabled(false);
    }

    pub fn reset_encoders(&mut self) {
        debug!("Resetting {} encoder", self.name);
        self.encoder.reset();
    }

    /// Integrate the measured velocity over `dt` seconds into the encoder.
    pub fn advance(&mut self, dt: f64) {
        if self.encoder.is_enabled() {
            let travelled = (self.velocity() * dt).abs();
            self.encoder.add_distance(travelled);
        }
    }

    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    pub fn set_wheel_radius(&mut self, wheel_radius: f64) -> Result<(), DriveError> {
        check_wheel_radius(&self.name, wheel_radius)?;
        self.wheel_radius = wheel_radius;
        Ok(())
    }

    pub fn gearbox(&self) -> &Gearbox {
        &self.gearbox
    }

    pub fn gearbox_mut(&mut self) -> &mut Gearbox {
        &mut self.gearbox
    }

    pub fn encoder(&self) -> &dyn PulseSource {
        self.encoder.as_ref()
    }

    pub fn encoder_mut(&mut self) -> &mut dyn PulseSource {
        self.encoder.as_mut()
    }
}

fn check_wheel_radius(name: &str, wheel_radius: f64) -> Result<(), DriveError> {
    if wheel_radius > 0.0 && wheel_radius.is_finite() {
        Ok(())
    } else {
        Err(DriveError::InvalidWheelRadius {
            side: name.to_string(),
            radius: wheel_radius,
        })
    }
}
