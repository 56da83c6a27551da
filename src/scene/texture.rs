use image::{Rgb, RgbImage};
use log::info;
use nalgebra::Vector3;
use std::path::Path;
use std::sync::Arc;

/// Texel lookup used by [`Texture::sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

impl TextureFilter {
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" | "bilinear" => TextureFilter::Linear,
            _ => TextureFilter::Nearest,
        }
    }
}

/// A decoded 2D texture map with REPEAT wrapping.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: Arc<RgbImage>,
    pub width: u32,
    pub height: u32,
    pub filter: TextureFilter,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P, filter: TextureFilter) -> Result<Self, String> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref)
            .map_err(|e| format!("Failed to load texture '{}': {}", path_ref.display(), e))?
            .to_rgb8();

        info!(
            "Loaded texture: {:?} ({}x{})",
            path_ref,
            img.width(),
            img.height()
        );

        Ok(Self::from_image(img, filter))
    }

    pub fn from_image(img: RgbImage, filter: TextureFilter) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            image: Arc::new(img),
            filter,
        }
    }

    /// A 1x1 texture of a single color (components in 0.0..1.0).
    pub fn solid(color: [f32; 3]) -> Self {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let img = RgbImage::from_pixel(1, 1, Rgb(color.map(to_byte)));
        Self::from_image(img, TextureFilter::Nearest)
    }

    /// Samples the texture at (u, v); coordinates outside [0, 1] repeat.
    /// V points up, image rows point down.
    pub fn sample(&self, u: f32, v: f32) -> Vector3<f32> {
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        let x = u * self.width as f32;
        let y = (1.0 - v) * self.height as f32;

        match self.filter {
            TextureFilter::Nearest => self.texel(x.floor() as i32, y.floor() as i32),
            TextureFilter::Linear => {
                // Texel centers are at +0.5
                let x = x - 0.5;
                let y = y - 0.5;
                let x0 = x.floor() as i32;
                let y0 = y.floor() as i32;
                let wx = x - x.floor();
                let wy = y - y.floor();

                let top = self.texel(x0, y0) * (1.0 - wx) + self.texel(x0 + 1, y0) * wx;
                let bottom = self.texel(x0, y0 + 1) * (1.0 - wx) + self.texel(x0 + 1, y0 + 1) * wx;
                top * (1.0 - wy) + bottom * wy
            }
        }
    }

    /// Texel with REPEAT wrapping, as [0, 1] RGB.
    fn texel(&self, x: i32, y: i32) -> Vector3<f32> {
        if self.width == 0 || self.height == 0 {
            return Vector3::zeros();
        }
        let xw = x.rem_euclid(self.width as i32) as u32;
        let yw = y.rem_euclid(self.height as i32) as u32;
        let p = self.image.get_pixel(xw, yw);
        Vector3::new(
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
        )
    }
}

/// The textures the world itself owns (the imported scene brings its own).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Plastic = 0,
    Grass = 1,
}

impl TextureKind {
    pub fn name(self) -> &'static str {
        match self {
            TextureKind::Plastic => "plastic",
            TextureKind::Grass => "grass",
        }
    }

    /// Color used when no image is configured for this slot.
    pub fn fallback_color(self) -> [f32; 3] {
        match self {
            TextureKind::Plastic => [0.95, 0.95, 0.95],
            TextureKind::Grass => [0.18, 0.55, 0.2],
        }
    }
}

/// One texture per [`TextureKind`], all present by construction.
#[derive(Debug, Clone)]
pub struct TextureSet {
    textures: [Arc<Texture>; 2],
}

impl TextureSet {
    /// Builds the set from optional image paths; a missing path falls back to the
    /// slot's solid color, an unreadable one is an error.
    pub fn load(
        plastic: Option<&Path>,
        grass: Option<&Path>,
        filter: TextureFilter,
    ) -> Result<Self, String> {
        let load_slot = |kind: TextureKind, path: Option<&Path>| -> Result<Arc<Texture>, String> {
            match path {
                Some(p) => Texture::load(p, filter).map(Arc::new),
                None => {
                    info!("No {} texture configured, using a solid color", kind.name());
                    Ok(Arc::new(Texture::solid(kind.fallback_color())))
                }
            }
        };

        Ok(Self {
            textures: [
                load_slot(TextureKind::Plastic, plastic)?,
                load_slot(TextureKind::Grass, grass)?,
            ],
        })
    }

    pub fn get(&self, kind: TextureKind) -> &Arc<Texture> {
        &self.textures[kind as usize]
    }
}
