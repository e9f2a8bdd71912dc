// Fixed-rate control loop with watchdog
// Note: the watchdog stops the drivetrain if commands stop arriving, so a crashed
// teleop client never leaves the robot driving on its last command

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{info, warn};

// local imports
use crate::config::{CMD_TIMEOUT, TOPIC_CMD_DRIVE, TOPIC_HEALTH, TOPIC_TELEMETRY};
use crate::drive::Drivetrain;
use crate::messages::{DriveCommand, DriveTelemetry, RuntimeHealth};

pub struct Runtime {
    drivetrain: Drivetrain,
    latest_cmd: Option<DriveCommand>,
    cmd_received_at: Instant,
    health: RuntimeHealth,
}

impl Runtime {
    pub fn new(drivetrain: Drivetrain) -> Self {
        Self {
            drivetrain,
            latest_cmd: None,
            cmd_received_at: Instant::now(),
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    pub fn drivetrain(&self) -> &Drivetrain {
        &self.drivetrain
    }

    /// Process incoming command
    pub fn on_command(&mut self, cmd: DriveCommand, now: Instant) {
        info!("Received command: {:?}", &cmd);
        self.latest_cmd = Some(cmd);
        self.cmd_received_at = now;
    }

    /// One control tick: apply the latest command (or stop if it is stale),
    /// then integrate the encoders over `dt`
    pub fn step(&mut self, now: Instant, dt: Duration) -> DriveTelemetry {
        let cmd_age = now.saturating_duration_since(self.cmd_received_at);

        match self.latest_cmd {
            Some(cmd) if cmd_age <= CMD_TIMEOUT => {
                self.health = RuntimeHealth::Ok;
                cmd.apply(&mut self.drivetrain);
            }
            Some(_) => {
                // Watchdog triggered - stop the robot
                if self.health != RuntimeHealth::CmdStale {
                    warn!("Command stale ({:?} old), stopping drivetrain", cmd_age);
                }
                self.health = RuntimeHealth::CmdStale;
                self.drivetrain.stop();
            }
            None => {
                // No command ever received
                self.health = RuntimeHealth::CmdStale;
                self.drivetrain.stop();
            }
        }

        self.drivetrain.advance(dt.as_secs_f64());
        DriveTelemetry::from(&self.drivetrain)
    }
}

/// Tick period for a loop running at `loop_hz` (clamped to at least 1 Hz)
pub fn loop_period(loop_hz: u64) -> Duration {
    Duration::from_secs_f64(1.0 / loop_hz.max(1) as f64)
}

pub async fn run(
    drivetrain: Drivetrain,
    loop_hz: u64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(TOPIC_CMD_DRIVE).await?;
    let pub_telemetry = session.declare_publisher(TOPIC_TELEMETRY).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let mut runtime = Runtime::new(drivetrain);
    let period = loop_period(loop_hz);
    let mut tick = interval(period);

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        loop_hz,
        CMD_TIMEOUT.as_millis()
    );
    info!("Subscribed to: {}", TOPIC_CMD_DRIVE);
    info!("Publishing to: {}, {}", TOPIC_TELEMETRY, TOPIC_HEALTH);

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking), keep latest
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<DriveCommand>(&payload) {
                Ok(cmd) => {
                    runtime.on_command(cmd, Instant::now());
                }
                Err(e) => {
                    warn!("Failed to parse command: {}", e);
                }
            }
        }

        // 2. Drive (includes watchdog logic)
        let telemetry = runtime.step(Instant::now(), period);

        // 3. Publish telemetry
        let telemetry_json = serde_json::to_string(&telemetry)?;
        pub_telemetry.put(telemetry_json).await?;

        // 4. Publish health
        let health_json = serde_json::to_string(&runtime.health)?;
        pub_health.put(health_json).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DrivetrainConfig;

    const DT: Duration = Duration::from_millis(20);

    fn runtime() -> Runtime {
        Runtime::new(DrivetrainConfig::default().build().unwrap())
    }

    #[test]
    fn test_stale_until_first_command() {
        let mut rt = runtime();
        let telemetry = rt.step(Instant::now(), DT);
        assert_eq!(rt.health(), RuntimeHealth::CmdStale);
        assert_eq!(telemetry.left_speed, 0.0);
        assert_eq!(telemetry.right_speed, 0.0);
    }

    #[test]
    fn test_fresh_command_is_applied() {
        let mut rt = runtime();
        let now = Instant::now();
        rt.on_command(DriveCommand::Straight { speed: 0.5 }, now);

        let telemetry = rt.step(now + Duration::from_millis(10), DT);
        assert_eq!(rt.health(), RuntimeHealth::Ok);
        assert_eq!(telemetry.left_speed, 0.5);
        assert_eq!(telemetry.right_speed, 0.5);
        assert_eq!(telemetry.right_command, -0.5);
    }

    #[test]
    fn test_watchdog_stops_drivetrain() {
        let mut rt = runtime();
        let now = Instant::now();
        rt.on_command(DriveCommand::Arcade { move_value: 1.0, rotate_value: 0.5 }, now);
        rt.step(now, DT);
        assert_eq!(rt.health(), RuntimeHealth::Ok);

        let telemetry = rt.step(now + CMD_TIMEOUT + Duration::from_millis(1), DT);
        assert_eq!(rt.health(), RuntimeHealth::CmdStale);
        assert_eq!(telemetry.left_speed, 0.0);
        assert_eq!(telemetry.right_speed, 0.0);
        assert_eq!(rt.drivetrain().commands().left, 0.0);
    }

    #[test]
    fn test_distance_accumulates_while_driving() {
        let mut rt = runtime();
        let start = Instant::now();
        let mut now = start;
        for _ in 0..50 {
            rt.on_command(DriveCommand::Straight { speed: 1.0 }, now);
            rt.step(now, DT);
            now += DT;
        }
        let telemetry = DriveTelemetry::from(rt.drivetrain());
        // ~1 m of travel at 1 m/s for 1 s
        assert!(telemetry.left_distance > 0.9 && telemetry.left_distance <= 1.0);
        assert!(telemetry.right_distance > 0.9 && telemetry.right_distance <= 1.0);
    }

    #[test]
    fn test_loop_period() {
        assert_eq!(loop_period(50), Duration::from_millis(20));
        assert_eq!(loop_period(0), Duration::from_secs(1));
        assert!(!loop_period(2000).is_zero());

        // 300 Hz must not round down to a 3 ms tick
        let period = loop_period(300).as_secs_f64();
        assert!((period - 1.0 / 300.0).abs() < 1e-9);
    }
}
