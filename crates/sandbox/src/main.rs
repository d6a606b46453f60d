use std::process::ExitCode;

use bevy::app::AppExit;
use bevy::log::error;
use clap::Parser;
use locomotion::config::LocomotionConfig;
use locomotion::movement::MovementConfig;

mod app;
mod autopilot;
mod gym;

use crate::app::{SandboxSettings, create_sandbox_app};

#[derive(Parser, Debug)]
#[command(name = "sandbox")]
#[command(version = "0.1")]
#[command(about = "Gym level for trying out sliding, wall running and air jumps")]
#[command(long_about = "
Gym level for trying out sliding, wall running and air jumps

EXAMPLES:
    cargo run --bin sandbox                                  # Windowed, keyboard and mouse
    cargo run --bin sandbox -- --headless                    # Scripted run, logs what happened
    cargo run --bin sandbox -- --headless --frames 1200      # Longer scripted run
    cargo run --bin sandbox -- --air-jumps 2 --wall-run-speed 1400
")]
struct Cli {
    #[arg(long, default_value_t = false)]
    #[arg(help = "Run without a window, driven by the autopilot")]
    headless: bool,

    #[arg(long, default_value_t = 600)]
    #[arg(help = "Frames to simulate before exiting (headless only)")]
    frames: u32,

    #[arg(long)]
    #[arg(help = "Air jumps available between landings")]
    air_jumps: Option<u32>,

    #[arg(long)]
    #[arg(help = "Wall-run speed in centimetres per second")]
    wall_run_speed: Option<f32>,
}

impl Cli {
    fn locomotion_config(&self) -> LocomotionConfig {
        let mut config = LocomotionConfig::default();
        if let Some(air_jumps) = self.air_jumps {
            config.air_jump_max = air_jumps;
        }
        if let Some(wall_run_speed) = self.wall_run_speed {
            config.wall_run_speed = wall_run_speed;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = SandboxSettings {
        headless: cli.headless,
        config: cli.locomotion_config(),
        movement: MovementConfig::default(),
    };
    let invalid = settings.config.validate().err();

    // Built first so the log subscriber is installed before reporting.
    let mut app = create_sandbox_app(settings, cli.frames);
    if let Some(err) = invalid {
        error!("Invalid locomotion config: {err}");
        return ExitCode::FAILURE;
    }

    match app.run() {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(code) => ExitCode::from(code.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_reach_the_config() {
        let cli = Cli::parse_from(["sandbox", "--air-jumps", "3", "--wall-run-speed", "1400"]);
        let config = cli.locomotion_config();
        assert_eq!(config.air_jump_max, 3);
        assert_eq!(config.wall_run_speed, 1400.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_defaults_keep_stock_tuning() {
        let cli = Cli::parse_from(["sandbox", "--headless"]);
        assert!(cli.headless);
        assert_eq!(cli.frames, 600);
        assert_eq!(cli.locomotion_config(), LocomotionConfig::default());
    }

    #[test]
    fn test_negative_wall_run_speed_is_rejected() {
        let cli = Cli::parse_from(["sandbox", "--wall-run-speed=-5"]);
        assert!(cli.locomotion_config().validate().is_err());
    }
}
