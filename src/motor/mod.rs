// Motor output side of the drivetrain
//
// Provides:
// - The `MotorSink` seam for one motor controller
// - An in-memory controller for running without hardware
// - `Gearbox`, the disable latch and speed factor in front of a sink

mod gearbox;
mod sink;

pub use gearbox::Gearbox;
pub use sink::{MotorSink, SimController};
