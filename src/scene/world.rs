//! Everything the viewer renders, and every way the user can change it.

use crate::error::WorldError;
use crate::io::config::Config;
use crate::scene::animation::BallAnimation;
use crate::scene::asset::{AssetSource, SceneAsset};
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::texture::{Texture, TextureFilter, TextureKind, TextureSet};
use log::{debug, info};
use nalgebra::{Point3, Vector3};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_SCALE: f32 = 1.0;
pub const DEFAULT_GOAL_DISTANCE: f32 = 0.0;

/// User-controlled view of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Tilt in degrees, kept within `[0, max_rotation_x]`.
    pub rotation_x: f32,
    pub rotation_y: f32,
    /// Distance from the camera to the scene origin.
    pub scene_distance: f32,
    /// Extra uniform scale of the ball.
    pub scale: f32,
}

#[derive(Debug, Clone, Copy)]
struct Controls {
    rotation_step: f32,
    max_rotation_x: f32,
    distance_step: f32,
}

pub struct World {
    view: ViewState,
    goal_distance: f32,
    ball: BallAnimation,
    textures: TextureSet,
    scene: SceneAsset,
    camera: Camera,
    lights: Vec<Light>,
    texture_scale: f32,
    controls: Controls,
    model_radius: f32,
    filter: TextureFilter,
}

impl World {
    /// Builds the world described by `config`: textures, lights, camera and the ball
    /// model (the built-in sphere unless a model file is configured).
    pub fn new(config: &Config) -> Result<Self, WorldError> {
        let filter = TextureFilter::from_name(&config.scene.filter);

        let textures = TextureSet::load(
            config.scene.plastic_texture.as_deref().map(Path::new),
            config.scene.grass_texture.as_deref().map(Path::new),
            filter,
        )
        .map_err(WorldError::Initialization)?;

        let scene = match &config.scene.model {
            Some(path) => SceneAsset::load(Path::new(path), config.scene.model_radius, filter)
                .map_err(WorldError::Initialization)?,
            None => SceneAsset::builtin_ball(config.scene.model_radius),
        };

        let distance_step = config.camera.distance_step.abs().max(f32::EPSILON);
        let view = ViewState {
            rotation_x: 0.0,
            rotation_y: 0.0,
            scene_distance: config.camera.distance.max(distance_step),
            scale: DEFAULT_SCALE,
        };

        let camera = Camera::new_perspective(
            Point3::from(config.camera.eye),
            Point3::new(0.0, 0.0, -view.scene_distance),
            Vector3::y(),
            config.camera.fov.to_radians(),
            config.render.width as f32 / config.render.height.max(1) as f32,
            config.camera.near,
            config.camera.far,
        );

        info!(
            "World ready: scene '{}', {} lights, camera distance {}",
            scene.source(),
            config.lights.len(),
            view.scene_distance
        );

        Ok(Self {
            view,
            goal_distance: DEFAULT_GOAL_DISTANCE,
            ball: BallAnimation::new(config.animation.ball_params()),
            textures,
            scene,
            camera,
            lights: config.build_lights(),
            texture_scale: config.scene.texture_scale,
            controls: Controls {
                rotation_step: config.controls.rotation_step,
                max_rotation_x: config.controls.max_rotation_x,
                distance_step,
            },
            model_radius: config.scene.model_radius,
            filter,
        })
    }

    /// View, scale, goal and speed changes are ignored while the ball is scripted.
    pub fn is_locked(&self) -> bool {
        self.ball.is_scripted()
    }

    fn check_unlocked(&self, what: &str) -> bool {
        if self.is_locked() {
            debug!("Ignoring {} during the goal animation", what);
            return false;
        }
        true
    }

    /// Tilts the scene by `delta` degrees; returns whether anything changed.
    pub fn rotate_x(&mut self, delta: f32) -> bool {
        if !self.check_unlocked("tilt") {
            return false;
        }
        let before = self.view.rotation_x;
        self.view.rotation_x = (before + delta).clamp(0.0, self.controls.max_rotation_x);
        self.view.rotation_x != before
    }

    pub fn rotate_y(&mut self, delta: f32) -> bool {
        if !self.check_unlocked("turn") {
            return false;
        }
        self.view.rotation_y = (self.view.rotation_y + delta) % 360.0;
        true
    }

    /// Moves the camera `steps` distance steps away (negative steps come closer).
    /// The distance never drops below one step.
    pub fn zoom(&mut self, steps: f32) -> bool {
        if !self.check_unlocked("zoom") {
            return false;
        }
        let step = self.controls.distance_step;
        let before = self.view.scene_distance;
        self.view.scene_distance = (before + steps * step).max(step);
        self.camera.look_at_scene(self.view.scene_distance);
        self.view.scene_distance != before
    }

    pub fn set_scale(&mut self, scale: f32) -> bool {
        if !self.check_unlocked("scale change") {
            return false;
        }
        self.view.scale = if scale.is_finite() { scale } else { DEFAULT_SCALE };
        true
    }

    pub fn set_goal_distance(&mut self, distance: f32) -> bool {
        if !self.check_unlocked("goal distance change") {
            return false;
        }
        self.goal_distance = if distance.is_finite() {
            distance
        } else {
            DEFAULT_GOAL_DISTANCE
        };
        true
    }

    /// Non-positive or non-finite speeds fall back to the default speed.
    pub fn set_speed(&mut self, speed: f32) -> bool {
        if !self.check_unlocked("speed change") {
            return false;
        }
        self.ball.set_speed(speed);
        true
    }

    pub fn start_goal(&mut self) {
        if self.ball.is_scripted() {
            debug!("Goal animation already running, restarting it");
        }
        self.ball.start_goal();
    }

    pub fn cancel_goal(&mut self) -> bool {
        self.ball.cancel_goal()
    }

    /// Advances the ball by one animation tick.
    pub fn advance_frame(&mut self) {
        self.ball.tick();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.camera.set_viewport(width, height);
    }

    /// Replaces the ball model with the one in `path`.
    ///
    /// On failure the current scene stays untouched. On success the previous asset
    /// is dropped together with its meshes and textures.
    pub fn reload_scene(&mut self, path: &Path) -> Result<(), WorldError> {
        let asset = SceneAsset::load(path, self.model_radius, self.filter).map_err(|reason| {
            WorldError::Load {
                path: path.to_path_buf(),
                reason,
            }
        })?;
        info!("Scene replaced: '{}' -> '{}'", self.scene.source(), asset.source());
        self.scene = asset;
        Ok(())
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn goal_distance(&self) -> f32 {
        self.goal_distance
    }

    pub fn ball(&self) -> &BallAnimation {
        &self.ball
    }

    pub fn scene(&self) -> &SceneAsset {
        &self.scene
    }

    pub fn scene_source(&self) -> &AssetSource {
        self.scene.source()
    }

    pub fn texture(&self, kind: TextureKind) -> &Arc<Texture> {
        self.textures.get(kind)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn texture_scale(&self) -> f32 {
        self.texture_scale
    }

    pub fn rotation_step(&self) -> f32 {
        self.controls.rotation_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::animation::BallMode;
    use std::path::PathBuf;

    fn world() -> World {
        World::new(&Config::default()).unwrap()
    }

    #[test]
    fn default_world_uses_builtin_ball() {
        let w = world();
        assert_eq!(w.scene_source(), &AssetSource::Builtin);
        assert_eq!(w.view().scene_distance, 7000.0);
        assert_eq!(w.lights().len(), 2);
    }

    #[test]
    fn missing_model_fails_initialization() {
        let mut config = Config::default();
        config.scene.model = Some("/definitely/not/here.obj".to_string());
        assert!(matches!(
            World::new(&config),
            Err(WorldError::Initialization(_))
        ));
    }

    #[test]
    fn rotation_x_stays_clamped() {
        let mut w = world();
        let step = w.rotation_step();
        assert!(!w.rotate_x(-step));
        assert_eq!(w.view().rotation_x, 0.0);

        for _ in 0..40 {
            w.rotate_x(step);
            assert!((0.0..=90.0).contains(&w.view().rotation_x));
        }
        assert_eq!(w.view().rotation_x, 90.0);
        assert!(!w.rotate_x(step));

        for _ in 0..7 {
            w.rotate_x(-step);
        }
        assert_eq!(w.view().rotation_x, 55.0);
    }

    #[test]
    fn zoom_never_reaches_the_camera() {
        let mut w = world();
        for _ in 0..20 {
            w.zoom(-1.0);
        }
        assert_eq!(w.view().scene_distance, 700.0);
        w.zoom(1.0);
        assert_eq!(w.view().scene_distance, 1400.0);
    }

    #[test]
    fn view_changes_are_ignored_during_the_shot() {
        let mut w = world();
        w.rotate_x(10.0);
        w.start_goal();
        let before = *w.view();

        assert!(!w.rotate_x(5.0));
        assert!(!w.rotate_y(5.0));
        assert!(!w.zoom(1.0));
        assert!(!w.set_scale(3.0));
        assert!(!w.set_goal_distance(100.0));
        assert!(!w.set_speed(4.0));

        assert_eq!(*w.view(), before);
        assert_eq!(w.goal_distance(), 0.0);
        assert_eq!(w.ball().speed(), 1.0);

        assert!(w.cancel_goal());
        assert!(w.rotate_x(5.0));
        assert_eq!(w.view().rotation_x, 15.0);
    }

    #[test]
    fn shot_runs_to_completion_and_resumes_bouncing() {
        let mut w = world();
        w.advance_frame();
        w.advance_frame();
        w.start_goal();
        assert_eq!(w.ball().position(), Vector3::zeros());
        assert!(!w.ball().is_automatic());

        let mut ticks = 0;
        while w.ball().is_scripted() {
            w.advance_frame();
            ticks += 1;
            assert!(ticks <= 31, "goal animation did not terminate");
        }
        assert_eq!(w.ball().mode(), BallMode::Idle);
        w.advance_frame();
        assert_eq!(w.ball().mode(), BallMode::Bouncing);
    }

    #[test]
    fn failed_reload_keeps_the_scene() {
        let mut w = world();
        let missing = PathBuf::from("/definitely/not/here.glb");
        let err = w.reload_scene(&missing).unwrap_err();
        assert!(matches!(err, WorldError::Load { ref path, .. } if *path == missing));
        assert_eq!(w.scene_source(), &AssetSource::Builtin);
    }

    #[test]
    fn reload_replaces_the_scene() {
        let dir = std::env::temp_dir().join(format!("goal-scene-world-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mut w = world();
        w.reload_scene(&path).unwrap();
        assert_eq!(w.scene_source(), &AssetSource::File(path.clone()));
        assert_eq!(w.scene().model().triangle_count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
