// Drivetrain kinematics
//
// Provides:
// - Arcade mixing (forward/turn -> left/right speeds)
// - MonitoredGearbox: gearbox + encoder with wheel geometry
// - Drivetrain: straight, rotate, arcade and two-joystick drive
// - Opt-in speed-factor strategies for slip compensation

mod drivetrain;
pub mod kinematics;
mod monitored;
pub mod scaling;

pub use drivetrain::Drivetrain;
pub use kinematics::{arcade_mix, WheelSpeeds};
pub use monitored::MonitoredGearbox;
pub use scaling::{NoScaling, SpeedEqualizer, SpeedScaling};

/// Errors raised while assembling drivetrain components
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Invalid wheel radius for {side} side: {radius} (must be positive and finite)")]
    InvalidWheelRadius { side: String, radius: f64 },
}
