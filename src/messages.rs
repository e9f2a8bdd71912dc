// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::drive::{Drivetrain, WheelSpeeds};

// Command from teleop/scripts -> runtime
// Tagged by "mode" so each drive operation carries only its own fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DriveCommand {
    Straight { speed: f64 },
    Rotate { speed: f64 },
    Arcade { move_value: f64, rotate_value: f64 },
    Tank { left: f64, right: f64 },
    Stop,
}

impl DriveCommand {
    /// Run this command against the drivetrain
    pub fn apply(&self, drivetrain: &mut Drivetrain) {
        match *self {
            DriveCommand::Straight { speed } => drivetrain.straight(speed),
            DriveCommand::Rotate { speed } => drivetrain.rotate(speed),
            DriveCommand::Arcade {
                move_value,
                rotate_value,
            } => drivetrain.arcade(move_value, rotate_value),
            DriveCommand::Tank { left, right } => drivetrain.tank(WheelSpeeds::new(left, right)),
            DriveCommand::Stop => drivetrain.stop(),
        }
    }
}

// Telemetry from runtime -> observers
// Measured values come from the encoders, commanded ones from the gearboxes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DriveTelemetry {
    pub left_speed: f64,
    pub right_speed: f64,
    pub left_command: f64,
    pub right_command: f64,
    pub left_distance: f64,
    pub right_distance: f64,
}

impl From<&Drivetrain> for DriveTelemetry {
    fn from(drivetrain: &Drivetrain) -> Self {
        let commands = drivetrain.commands();
        Self {
            left_speed: drivetrain.left_speed(),
            right_speed: drivetrain.right_speed(),
            left_command: commands.left,
            right_command: commands.right,
            left_distance: drivetrain.left().distance(),
            right_distance: drivetrain.right().distance(),
        }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
}
