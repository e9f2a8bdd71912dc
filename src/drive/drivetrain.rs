// Two-sided differential drivetrain
//
// Every drive mode funnels into `set_left_speed` / `set_right_speed`, which
// write the gearbox and drive the side's encoder rate from the same value.
// The right side is mounted mirrored, so its sink always sees the negated
// command. Speed getters read the encoders, never the commands.

use tracing::{debug, info};

use super::kinematics::{arcade_mix, WheelSpeeds};
use super::monitored::MonitoredGearbox;
use super::scaling::{NoScaling, SpeedEqualizer, SpeedScaling};
use super::DriveError;
use crate::config::{DrivetrainConfig, SideConfig};
use crate::encoder::PulseCounter;
use crate::motor::Gearbox;

pub struct Drivetrain {
    left: MonitoredGearbox,
    right: MonitoredGearbox,
    scaling: Box<dyn SpeedScaling>,
}

impl Drivetrain {
    /// Drivetrain with speed scaling disabled
    pub fn new(left: MonitoredGearbox, right: MonitoredGearbox) -> Self {
        Self {
            left,
            right,
            scaling: Box::new(NoScaling),
        }
    }

    /// Build both sides from a validated config
    pub fn from_config(config: &DrivetrainConfig) -> Result<Self, DriveError> {
        let left = build_side(&config.left, config.wheel_radius)?;
        let right = build_side(&config.right, config.wheel_radius)?;
        let mut drivetrain = Self::new(left, right);
        if let Some(settings) = &config.equalizer {
            let equalizer = SpeedEqualizer::new(settings.no_scale_speed);
            info!(
                "Speed equalizer enabled (no-scale speed {})",
                equalizer.no_scale_speed()
            );
            drivetrain.set_scaling(Box::new(equalizer));
        }
        Ok(drivetrain)
    }

    /// Replace the speed-factor strategy
    pub fn set_scaling(&mut self, scaling: Box<dyn SpeedScaling>) {
        self.scaling = scaling;
    }

    /// Drive straight
    ///
    /// # Arguments
    /// * `speed` - Speed in range of [-1.0, 1.0]
    pub fn straight(&mut self, speed: f64) {
        self.set_left_speed(speed);
        self.set_right_speed(speed);
        self.scale_factors(speed, speed);
    }

    /// Turn in place
    ///
    /// Both sinks receive `speed`, which the mirrored right mount turns into
    /// opposite wheel motion. Both encoders report `speed`.
    pub fn rotate(&mut self, speed: f64) {
        drive_side(&mut self.left, speed, speed);
        drive_side(&mut self.right, speed, speed);
        self.scale_factors(speed, -speed);
    }

    /// Single-stick drive, see [`arcade_mix`]
    pub fn arcade(&mut self, move_value: f64, rotate_value: f64) {
        let wheels = arcade_mix(move_value, rotate_value);
        self.two_joystick_drive(wheels.left, wheels.right);
    }

    /// Independent per-side speeds, no mixing
    pub fn two_joystick_drive(&mut self, left_speed: f64, right_speed: f64) {
        debug!("Setting wheel speeds: left={}, right={}", left_speed, right_speed);
        self.set_left_speed(left_speed);
        self.set_right_speed(right_speed);
    }

    /// Same as `two_joystick_drive`
    pub fn tank(&mut self, wheels: WheelSpeeds) {
        self.two_joystick_drive(wheels.left, wheels.right);
    }

    pub fn stop(&mut self) {
        self.straight(0.0);
    }

    pub fn set_left_speed(&mut self, speed: f64) {
        drive_side(&mut self.left, speed, speed);
    }

    pub fn set_right_speed(&mut self, speed: f64) {
        drive_side(&mut self.right, -speed, speed);
    }

    /// Measured left velocity
    pub fn left_speed(&self) -> f64 {
        self.left.velocity()
    }

    /// Measured right velocity
    pub fn right_speed(&self) -> f64 {
        self.right.velocity()
    }

    /// Commanded speeds as seen by the gearboxes (right side mirrored)
    pub fn commands(&self) -> WheelSpeeds {
        WheelSpeeds::new(self.left.get(), self.right.get())
    }

    /// Integrate both encoders over `dt` seconds
    pub fn advance(&mut self, dt: f64) {
        self.left.advance(dt);
        self.right.advance(dt);
    }

    pub fn reset_encoders(&mut self) {
        self.left.reset_encoders();
        self.right.reset_encoders();
    }

    /// Zero and latch both gearboxes. Measured speeds read 0 until `enable`.
    pub fn disable(&mut self) {
        info!("Disabling drivetrain");
        for side in [&mut self.left, &mut self.right] {
            side.gearbox_mut().disable();
            side.encoder_mut().set_rate(0.0);
        }
    }

    pub fn enable(&mut self) {
        info!("Enabling drivetrain");
        self.left.gearbox_mut().enable();
        self.right.gearbox_mut().enable();
    }

    pub fn left(&self) -> &MonitoredGearbox {
        &self.left
    }

    pub fn right(&self) -> &MonitoredGearbox {
        &self.right
    }

    pub fn left_mut(&mut self) -> &mut MonitoredGearbox {
        &mut self.left
    }

    pub fn right_mut(&mut self) -> &mut MonitoredGearbox {
        &mut self.right
    }

    fn scale_factors(&mut self, wanted_left: f64, wanted_right: f64) {
        let measured = (self.left_speed(), self.right_speed());
        if let Some((left, right)) = self
            .scaling
            .factors((wanted_left, wanted_right), measured)
        {
            self.left.gearbox_mut().set_speed_factor(left);
            self.right.gearbox_mut().set_speed_factor(right);
        }
    }
}

/// Write `command` to the side's gearbox and `rate` to its encoder. A latched
/// gearbox does not move, so its encoder reads 0.
fn drive_side(side: &mut MonitoredGearbox, command: f64, rate: f64) {
    side.set(command);
    let rate = if side.gearbox().is_enabled() { rate } else { 0.0 };
    side.encoder_mut().set_rate(rate);
}

fn build_side(side: &SideConfig, wheel_radius: f64) -> Result<MonitoredGearbox, DriveError> {
    let (a, b) = side.encoder_channels;
    let encoder = PulseCounter::with_calibration(a, b, side.encoding, side.calibration)
        .with_distance_per_pulse(side.distance_per_pulse)
        .reversed(side.reverse_direction);
    MonitoredGearbox::new(
        side.name.clone(),
        Gearbox::simulated(side.motor_channel),
        Box::new(encoder),
        wheel_radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EqualizerConfig, WHEEL_RADIUS};
    use crate::encoder::{EncodingType, PulseSource};

    const EPS: f64 = 1e-7;

    fn drivetrain() -> Drivetrain {
        let mut e1 = PulseCounter::new(5, 6);
        let mut e2 = PulseCounter::with_calibration(7, 8, EncodingType::K1X, 0.9);
        e1.set_period(1.0);
        e2.set_period(1.0);
        let a = MonitoredGearbox::new("left", Gearbox::simulated(1), Box::new(e1), WHEEL_RADIUS)
            .unwrap();
        let b = MonitoredGearbox::new("right", Gearbox::simulated(2), Box::new(e2), WHEEL_RADIUS)
            .unwrap();
        Drivetrain::new(a, b)
    }

    fn sweep() -> impl Iterator<Item = f64> {
        (-50..=50).map(|i| i as f64 / 50.0)
    }

    fn set_two_speeds(d: &mut Drivetrain, left: f64, right: f64) {
        d.set_left_speed(left);
        d.set_right_speed(right);
        assert!((left - d.left_speed()).abs() < EPS && (right - d.right_speed()).abs() < EPS);
    }

    #[test]
    fn test_straight() {
        let mut d = drivetrain();
        for speed in sweep() {
            d.straight(speed);
            assert_eq!(d.left_speed(), speed);
            assert_eq!(d.right_speed(), speed);
            set_two_speeds(&mut d, speed, speed);
        }
    }

    #[test]
    fn test_straight_mirrors_right_sink() {
        let mut d = drivetrain();
        d.straight(0.6);
        assert_eq!(d.left().gearbox().output(), 0.6);
        assert_eq!(d.right().gearbox().output(), -0.6);
        assert_eq!(d.commands(), WheelSpeeds::new(0.6, -0.6));
    }

    #[test]
    fn test_rotate() {
        let mut d = drivetrain();
        for speed in sweep() {
            d.rotate(speed);
            assert_eq!(d.left_speed(), speed);
            assert_eq!(d.right_speed(), speed);
        }
    }

    #[test]
    fn test_rotate_turns_in_place() {
        let mut d = drivetrain();
        d.rotate(0.5);
        // Right sink is mirrored, so equal sink values mean opposite wheel motion
        assert_eq!(d.left().gearbox().output(), 0.5);
        assert_eq!(d.right().gearbox().output(), 0.5);
    }

    #[test]
    fn test_arcade() {
        let mut d = drivetrain();

        d.arcade(1.0, 0.0);
        assert_eq!(d.left_speed(), 1.0);
        assert_eq!(d.right_speed(), 1.0);

        d.arcade(1.0, 1.0);
        assert_eq!(d.left_speed(), 0.0);
        assert_eq!(d.right_speed(), 1.0);

        d.arcade(1.0, -1.0);
        assert!(d.left_speed() > d.right_speed());

        d.arcade(0.0, 1.0);
        assert_eq!(d.left_speed(), -1.0);
        assert_eq!(d.right_speed(), 1.0);

        d.arcade(0.0, -1.0);
        assert!(d.left_speed() > d.right_speed());

        d.arcade(0.0, 0.0);
        assert_eq!(d.left_speed(), d.right_speed());

        d.arcade(0.0, 0.5);
        assert!(d.left_speed() < d.right_speed());

        d.arcade(0.0, -0.5);
        assert!(d.left_speed() > d.right_speed());

        d.arcade(1.0, 0.5);
        assert!(d.left_speed() < d.right_speed());

        d.arcade(-1.0, 0.5);
        assert!(d.left_speed() < d.right_speed());

        d.arcade(-1.0, -0.5);
        assert!(d.left_speed() > d.right_speed());

        d.arcade(2.0, 1.0);
        assert_eq!(d.left_speed(), 1.0);
        assert_eq!(d.right_speed(), 2.0);
    }

    #[test]
    fn test_stop() {
        let mut d = drivetrain();
        for speed in sweep() {
            d.straight(speed);
            set_two_speeds(&mut d, speed, speed);
            d.stop();
            assert_eq!(d.left_speed(), 0.0);
            assert_eq!(d.right_speed(), 0.0);
        }

        d.arcade(-0.3, 0.9);
        d.stop();
        assert_eq!(d.left_speed(), 0.0);
        assert_eq!(d.right_speed(), 0.0);
    }

    #[test]
    fn test_two_joystick_drive() {
        let mut d = drivetrain();
        d.two_joystick_drive(1.0, 1.0);
        assert_eq!(d.left_speed(), 1.0);
        assert_eq!(d.right_speed(), 1.0);

        d.tank(WheelSpeeds::new(-0.25, 0.75));
        assert_eq!(d.left_speed(), -0.25);
        assert_eq!(d.right_speed(), 0.75);
    }

    #[test]
    fn test_set_left_speed() {
        let mut d = drivetrain();
        d.set_left_speed(1.0);
        assert_eq!(d.left_speed(), 1.0);
        d.set_left_speed(0.0);
        assert_eq!(d.left_speed(), 0.0);
    }

    #[test]
    fn test_set_right_speed() {
        let mut d = drivetrain();
        d.set_right_speed(1.0);
        assert_eq!(d.right_speed(), 1.0);
        assert_eq!(d.right().get(), -1.0);
        d.set_right_speed(0.0);
        assert_eq!(d.right_speed(), 0.0);
    }

    #[test]
    fn test_measured_is_not_commanded() {
        let mut d = drivetrain();
        d.straight(0.5);
        // Encoder moved on its own, command untouched
        d.left_mut().encoder_mut().set_rate(0.2);
        assert_eq!(d.left_speed(), 0.2);
        assert_eq!(d.commands().left, 0.5);
    }

    #[test]
    fn test_disabled_gearboxes_ignore_commands() {
        let mut d = drivetrain();
        d.straight(0.8);
        d.disable();
        assert_eq!(d.left_speed(), 0.0);
        assert_eq!(d.right_speed(), 0.0);

        d.straight(0.4);
        d.arcade(0.5, 0.2);
        assert_eq!(d.commands(), WheelSpeeds::zero());
        assert_eq!(d.left_speed(), 0.0);
        assert_eq!(d.right_speed(), 0.0);

        d.advance(1.0);
        assert_eq!(d.left().distance(), 0.0);

        d.enable();
        d.straight(0.4);
        assert_eq!(d.commands(), WheelSpeeds::new(0.4, -0.4));
        assert_eq!(d.left_speed(), 0.4);
        assert_eq!(d.right_speed(), 0.4);
    }

    #[test]
    fn test_advance_and_reset_encoders() {
        let mut d = drivetrain();
        d.straight(0.5);
        for _ in 0..10 {
            d.advance(1.0);
        }
        assert!(d.left().distance() > 0.0);
        assert!(d.right().distance() > 0.0);

        d.reset_encoders();
        assert_eq!(d.left().distance(), 0.0);
        assert_eq!(d.right().distance(), 0.0);
    }

    #[test]
    fn test_scaling_inert_by_default() {
        let mut d = drivetrain();
        d.left_mut().gearbox_mut().set_speed_factor(0.3);
        d.straight(1.0);
        assert_eq!(d.left().gearbox().speed_factor(), 0.3);
    }

    #[test]
    fn test_equalizer_resets_factors_when_matched() {
        let mut d = drivetrain();
        d.set_scaling(Box::new(SpeedEqualizer::new(0.05)));
        d.left_mut().gearbox_mut().set_speed_factor(0.3);
        d.straight(1.0);
        assert_eq!(d.left().gearbox().speed_factor(), 1.0);
        assert_eq!(d.right().gearbox().speed_factor(), 1.0);
    }

    #[test]
    fn test_from_config() {
        let mut config = DrivetrainConfig::default();
        config.right.calibration = 0.9;
        config.equalizer = Some(EqualizerConfig { no_scale_speed: 0.1 });

        let mut d = Drivetrain::from_config(&config).unwrap();
        d.straight(0.7);
        assert_eq!(d.left_speed(), 0.7);
        assert_eq!(d.right_speed(), 0.7);
        assert_eq!(d.left().name(), "left");
        assert_eq!(d.right().name(), "right");
        assert_eq!(d.left().wheel_radius(), config.wheel_radius);
    }

    #[test]
    fn test_from_config_rejects_bad_radius() {
        let config = DrivetrainConfig {
            wheel_radius: 0.0,
            ..DrivetrainConfig::default()
        };
        assert!(Drivetrain::from_config(&config).is_err());
    }
}
