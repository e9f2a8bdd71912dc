// Arcade-stick keyboard teleop for the drivetrain runtime
//
// Held keys deflect a virtual stick; releasing for `RELEASE_AFTER` centers it.
// The stick is published as `DriveCommand::Arcade` every `PUBLISH_PERIOD`.
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use drivetrain_zenoh_runtime::config::TOPIC_CMD_DRIVE;
use drivetrain_zenoh_runtime::messages::DriveCommand;
use std::time::{Duration, Instant};
use tracing::info;

const GEARS: [(&str, f64); 3] = [("low", 0.25), ("mid", 0.5), ("high", 1.0)];
const PUBLISH_PERIOD: Duration = Duration::from_millis(20);
const RELEASE_AFTER: Duration = Duration::from_millis(100);

enum Action {
    Move(f64),
    Turn(f64),
    GearUp,
    GearDown,
    Brake,
    Quit,
}

fn action_for(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Action::Move(1.0)),
        KeyCode::Char('s') | KeyCode::Down => Some(Action::Move(-1.0)),
        // positive rotate speeds up the right side
        KeyCode::Char('a') | KeyCode::Left => Some(Action::Turn(1.0)),
        KeyCode::Char('d') | KeyCode::Right => Some(Action::Turn(-1.0)),
        KeyCode::Char('r') => Some(Action::GearUp),
        KeyCode::Char('f') => Some(Action::GearDown),
        KeyCode::Char(' ') => Some(Action::Brake),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

struct Stick {
    gear: usize,
    move_value: f64,
    rotate_value: f64,
    touched: Instant,
}

impl Stick {
    fn new() -> Self {
        Self {
            gear: 0,
            move_value: 0.0,
            rotate_value: 0.0,
            touched: Instant::now(),
        }
    }

    fn scale(&self) -> f64 {
        GEARS[self.gear].1
    }

    fn center(&mut self) {
        self.move_value = 0.0;
        self.rotate_value = 0.0;
    }

    fn shift(&mut self, up: bool) {
        self.gear = if up {
            (self.gear + 1).min(GEARS.len() - 1)
        } else {
            self.gear.saturating_sub(1)
        };
        info!("Gear: {}", GEARS[self.gear].0);
    }

    fn command(&mut self) -> DriveCommand {
        if self.touched.elapsed() > RELEASE_AFTER {
            self.center();
        }
        DriveCommand::Arcade {
            move_value: self.move_value,
            rotate_value: self.rotate_value,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_DRIVE).await?;
    info!("Publishing arcade commands on {}", TOPIC_CMD_DRIVE);
    info!("W/S move, A/D turn, R/F gear, Space brake, Q quit");

    enable_raw_mode()?;
    let result = drive(&publisher).await;
    disable_raw_mode()?;
    result
}

async fn drive(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut stick = Stick::new();

    loop {
        if event::poll(PUBLISH_PERIOD)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match action_for(key.code) {
                    Some(Action::Move(dir)) => {
                        stick.move_value = dir * stick.scale();
                        stick.touched = Instant::now();
                    }
                    Some(Action::Turn(dir)) => {
                        stick.rotate_value = dir * stick.scale();
                        stick.touched = Instant::now();
                    }
                    Some(Action::GearUp) => stick.shift(true),
                    Some(Action::GearDown) => stick.shift(false),
                    Some(Action::Brake) => {
                        stick.center();
                        publisher.put(serde_json::to_string(&DriveCommand::Stop)?).await?;
                        continue;
                    }
                    Some(Action::Quit) => return Ok(()),
                    None => {}
                }
            }
        }

        publisher.put(serde_json::to_string(&stick.command())?).await?;
    }
}
