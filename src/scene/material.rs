use crate::scene::texture::Texture;
use nalgebra::Vector3;
use std::sync::Arc;

/// How a sampled texel is combined with the lit fragment color
/// (the fixed-function `GL_TEXTURE_ENV_MODE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TexEnvMode {
    /// fragment + texel, clamped
    Add,
    /// fragment * texel
    #[default]
    Modulate,
}

impl TexEnvMode {
    pub fn combine(self, fragment: Vector3<f32>, texel: Vector3<f32>) -> Vector3<f32> {
        match self {
            TexEnvMode::Add => (fragment + texel).map(|c| c.min(1.0)),
            TexEnvMode::Modulate => fragment.component_mul(&texel),
        }
    }
}

/// Surface description for the fixed-function shader.
///
/// `color` is tracked into both the ambient and diffuse reflectance.
#[derive(Debug, Clone)]
pub struct Material {
    pub color: Vector3<f32>,
    pub texture: Option<Arc<Texture>>,
    pub tex_env: TexEnvMode,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vector3::new(0.8, 0.8, 0.8),
            texture: None,
            tex_env: TexEnvMode::Modulate,
        }
    }
}

impl Material {
    pub fn colored(color: Vector3<f32>) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn textured(color: Vector3<f32>, texture: Arc<Texture>, tex_env: TexEnvMode) -> Self {
        Self {
            color,
            texture: Some(texture),
            tex_env,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_mode_saturates() {
        let c = TexEnvMode::Add.combine(Vector3::new(0.2, 0.6, 0.9), Vector3::new(0.5, 0.5, 0.5));
        assert!((c.x - 0.7).abs() < 1e-6);
        assert_eq!(c.y, 1.0);
        assert_eq!(c.z, 1.0);
    }

    #[test]
    fn modulate_mode_multiplies() {
        let c =
            TexEnvMode::Modulate.combine(Vector3::new(1.0, 0.5, 0.0), Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(c, Vector3::new(0.5, 0.25, 0.0));
    }
}
