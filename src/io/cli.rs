use crate::io::config::Config;
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "goal-scene")]
#[command(about = "Software-rasterized football scene with a scripted shot on goal")]
pub struct Cli {
    /// Configuration file (TOML); built-in defaults when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Model drawn as the ball (.obj, .gltf, .glb), overrides the configured one
    #[arg(short, long, value_name = "FILE")]
    pub model: Option<String>,

    /// Render without a window and write the last frame to an image
    #[arg(long)]
    pub headless: bool,

    /// Animation ticks to run before the headless frame is written
    #[arg(long, default_value_t = 1)]
    pub frames: usize,

    /// Start the shot on goal before running the headless frames
    #[arg(long)]
    pub goal: bool,

    /// Output image for headless mode, overrides the configured one
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,
}

impl Cli {
    /// Loads the configuration file (if any) and applies the command-line overrides.
    pub fn resolve_config(&self) -> Result<Config, String> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading configuration from {}", path);
                Config::load(path)?
            }
            None => Config::default(),
        };

        if let Some(model) = &self.model {
            config.scene.model = Some(model.clone());
        }
        if let Some(output) = &self.output {
            config.render.output = output.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = Cli::parse_from([
            "goal-scene",
            "--headless",
            "--frames",
            "12",
            "--goal",
            "--model",
            "ball.glb",
            "-o",
            "shot.png",
        ]);
        assert!(cli.headless && cli.goal);
        assert_eq!(cli.frames, 12);

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.scene.model.as_deref(), Some("ball.glb"));
        assert_eq!(config.render.output, "shot.png");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["goal-scene", "--config", "/no/such/config.toml"]);
        assert!(cli.resolve_config().is_err());
    }
}
