// Differential drivetrain core
//
// - `drive`: arcade/tank mixing and the two-sided drivetrain
// - `motor`: motor sinks and the gearbox in front of them
// - `encoder`: quadrature pulse counter model
// - `config`, `messages`, `runtime`: the zenoh control-loop shell

pub mod config;
pub mod drive;
pub mod encoder;
pub mod messages;
pub mod motor;
pub mod runtime;
