use crate::core::framebuffer::FrameBuffer;
use crate::pipeline::passes::framebuffer_to_rgba;
use image::RgbaImage;
use log::info;
use std::path::Path;

/// Saves tightly packed RGBA rows to an image file; the format follows the extension.
pub fn save_rgba_to_image(pixels: Vec<u8>, width: usize, height: usize, path: &Path) -> Result<(), String> {
    let img = RgbaImage::from_raw(width as u32, height as u32, pixels)
        .ok_or_else(|| format!("Pixel buffer does not match {}x{}", width, height))?;
    img.save(path)
        .map_err(|e| format!("Failed to save image to '{}': {}", path.display(), e))?;
    info!("Saved {}x{} frame to {}", width, height, path.display());
    Ok(())
}

pub fn save_framebuffer(framebuffer: &FrameBuffer, path: &Path) -> Result<(), String> {
    save_rgba_to_image(
        framebuffer_to_rgba(framebuffer),
        framebuffer.width,
        framebuffer.height,
        path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_buffer_is_rejected() {
        let path = std::env::temp_dir().join("goal-scene-never-written.png");
        assert!(save_rgba_to_image(vec![0; 7], 2, 2, &path).is_err());
    }

    #[test]
    fn writes_a_png() {
        let path = std::env::temp_dir().join(format!("goal-scene-image-{}.png", std::process::id()));
        save_rgba_to_image(vec![255; 4 * 4 * 3], 4, 3, &path).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
        let _ = std::fs::remove_file(&path);
    }
}
