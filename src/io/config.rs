use crate::scene::animation::BallParams;
use crate::scene::light::Light;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Everything the viewer reads from its TOML file. Every field has a default,
/// so an empty file is a valid configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub animation: AnimationConfig,
    pub scene: SceneConfig,
    pub overlay: OverlayConfig,
    pub lights: Vec<LightConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            animation: AnimationConfig::default(),
            scene: SceneConfig::default(),
            overlay: OverlayConfig::default(),
            lights: vec![
                LightConfig {
                    r#type: "point".to_string(),
                    position: [30000.0, 0.0, 30.0],
                    direction: None,
                    cutoff: None,
                    ambient: [0.5, 0.5, 0.5],
                    diffuse: [0.35, 0.35, 0.35],
                },
                LightConfig {
                    r#type: "spot".to_string(),
                    position: [5.0, 0.0, 5.0],
                    direction: Some([0.0, -1.0, 0.0]),
                    cutoff: Some(30.0),
                    ambient: [1.0, 0.0, 1.0],
                    diffuse: [1.0, 0.0, 1.0],
                },
            ],
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Builds the eye-space lights; entries of unknown type are skipped.
    pub fn build_lights(&self) -> Vec<Light> {
        self.lights
            .iter()
            .filter_map(|l| {
                let position = Point3::from(l.position);
                let ambient = Vector3::from(l.ambient);
                let diffuse = Vector3::from(l.diffuse);
                match l.r#type.as_str() {
                    "point" => Some(Light::new_point(position, ambient, diffuse)),
                    "spot" => Some(Light::new_spot(
                        position,
                        Vector3::from(l.direction.unwrap_or([0.0, -1.0, 0.0])),
                        l.cutoff.unwrap_or(180.0),
                        ambient,
                        diffuse,
                    )),
                    other => {
                        log::warn!("Ignoring light of unknown type '{}'", other);
                        None
                    }
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Supersampling factor per axis.
    pub samples: usize,
    /// "none", "back" or "front"
    pub cull_mode: String,
    pub clear_color: [f32; 3],
    /// PNG written by headless runs.
    pub output: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            samples: 1,
            cull_mode: "none".to_string(),
            clear_color: [0.75, 0.8, 0.95],
            output: "goal_scene.png".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Initial distance from the camera to the scene.
    pub distance: f32,
    pub distance_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 2.0, 2.0],
            fov: 45.0,
            near: 1.0,
            far: 20000.0,
            distance: 7000.0,
            distance_step: 700.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Degrees per rotation key press.
    pub rotation_step: f32,
    pub max_rotation_x: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotation_step: 5.0,
            max_rotation_x: 90.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub bounce_step: f32,
    pub bounce_floor: f32,
    pub spin_step: f32,
    pub goal_step: f32,
    pub near_band: f32,
    pub far_band: f32,
    /// Animation ticks per second in GUI mode.
    pub tick_rate: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        let p = BallParams::default();
        Self {
            bounce_step: p.bounce_step,
            bounce_floor: p.bounce_floor,
            spin_step: p.spin_step,
            goal_step: p.goal_step,
            near_band: p.near_band,
            far_band: p.far_band,
            tick_rate: 30.0,
        }
    }
}

impl AnimationConfig {
    pub fn ball_params(&self) -> BallParams {
        BallParams {
            bounce_step: self.bounce_step,
            bounce_floor: self.bounce_floor,
            spin_step: self.spin_step,
            goal_step: self.goal_step,
            near_band: self.near_band,
            far_band: self.far_band,
            ..BallParams::default()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Model drawn as the ball; the built-in sphere when absent.
    pub model: Option<String>,
    /// Radius the imported model is fitted into.
    pub model_radius: f32,
    pub plastic_texture: Option<String>,
    pub grass_texture: Option<String>,
    /// Texture matrix scale applied to every UV.
    pub texture_scale: f32,
    /// "nearest" or "linear"
    pub filter: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model: None,
            model_radius: 150.0,
            plastic_texture: None,
            grass_texture: None,
            texture_scale: 5.0,
            filter: "nearest".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub lines: Vec<String>,
    pub color: [f32; 3],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            lines: vec![
                "E/D: tilt   S/F: turn".to_string(),
                "+/-: zoom   F4: open model".to_string(),
                "V: shoot   B: cancel".to_string(),
                "F10: exit".to_string(),
            ],
            color: [1.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LightConfig {
    /// "point" or "spot"
    pub r#type: String,
    pub position: [f32; 3],
    pub direction: Option<[f32; 3]>,
    /// Spot cone half-angle in degrees.
    pub cutoff: Option<f32>,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.render.width, 800);
        assert_eq!(config.camera.distance, 7000.0);
        assert_eq!(config.animation.ball_params(), BallParams::default());
        assert_eq!(config.build_lights().len(), 2);
        assert!(config.scene.model.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
            [camera]
            distance = 9000.0

            [scene]
            model = "assets/ball.obj"

            [[lights]]
            type = "point"
            position = [0.0, 100.0, 0.0]
            ambient = [0.1, 0.1, 0.1]
            diffuse = [0.9, 0.9, 0.9]
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.distance, 9000.0);
        assert_eq!(config.camera.distance_step, 700.0);
        assert_eq!(config.scene.model.as_deref(), Some("assets/ball.obj"));
        assert_eq!(config.scene.texture_scale, 5.0);
        assert_eq!(config.build_lights().len(), 1);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(Config::parse("[camera\ndistance = ").is_err());
    }
}
