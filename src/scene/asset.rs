use crate::io::model_loader::load_model;
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use crate::scene::texture::TextureFilter;
use crate::scene::utils::normalize_and_center_model;
use log::{debug, info};
use nalgebra::Vector3;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a [`SceneAsset`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    File(PathBuf),
    /// The procedural ball used when no model file is configured.
    Builtin,
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::File(path) => write!(f, "{}", path.display()),
            AssetSource::Builtin => write!(f, "<built-in ball>"),
        }
    }
}

/// The imported model drawn as the ball, together with everything it owns.
///
/// Meshes, materials and their textures are released when the asset is dropped.
pub struct SceneAsset {
    model: Model,
    source: AssetSource,
}

impl SceneAsset {
    /// Imports `path` and fits it into a sphere of `radius` scene units.
    pub fn load(path: &Path, radius: f32, filter: TextureFilter) -> Result<Self, String> {
        let mut model = load_model(path, filter)?;
        let (center, scale) = normalize_and_center_model(&mut model, radius);
        debug!(
            "Scene '{}' normalized. Center: {:?}, Scale: {:.4}",
            path.display(),
            center,
            scale
        );
        Ok(Self {
            model,
            source: AssetSource::File(path.to_path_buf()),
        })
    }

    pub fn builtin_ball(radius: f32) -> Self {
        let material = Material::colored(Vector3::new(0.95, 0.95, 0.95));
        let model = Model::new(vec![Mesh::create_uv_sphere(radius, 24, 16, 0)], vec![material]);
        info!("Using the built-in ball (radius {})", radius);
        Self {
            model,
            source: AssetSource::Builtin,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }
}

impl Drop for SceneAsset {
    fn drop(&mut self) {
        debug!(
            "Releasing scene '{}' ({} meshes)",
            self.source,
            self.model.meshes.len()
        );
    }
}
