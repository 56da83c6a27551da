use clap::Parser;
use goal_scene::app::{HeadlessOptions, run_gui, run_headless};
use goal_scene::io::cli::Cli;
use goal_scene::scene::world::World;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let world = match World::new(&config) {
        Ok(w) => w,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.headless {
        let options = HeadlessOptions {
            frames: cli.frames,
            start_goal: cli.goal,
            output: PathBuf::from(&config.render.output),
        };
        run_headless(world, &config, &options)
    } else {
        run_gui(world, &config)
    };

    match result {
        Ok(()) => {
            info!("Bye.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
