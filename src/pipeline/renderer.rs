use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{CullMode, Rasterizer};
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use nalgebra::Vector3;

/// Owns the framebuffer and feeds meshes through a shader into the rasterizer.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    /// `sample_count`: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
        }
    }

    pub fn with_cull_mode(mut self, mode: CullMode) -> Self {
        self.rasterizer.set_cull_mode(mode);
        self
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height
    }

    /// Reallocates the framebuffer if the size changed. Returns true when it did.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.framebuffer.width && height == self.framebuffer.height {
            return false;
        }
        self.framebuffer = FrameBuffer::new(width, height, self.framebuffer.sample_count);
        true
    }

    pub fn clear(&mut self, color: Vector3<f32>) {
        self.framebuffer.clear(color, f32::INFINITY);
    }

    /// Draws every mesh of `model` with its own material.
    pub fn draw_model<S: Shader>(&self, model: &Model, shader: &S) {
        for mesh in &model.meshes {
            self.draw_mesh(mesh, shader, model.material_for(mesh));
        }
    }

    pub fn draw_mesh<S: Shader>(&self, mesh: &Mesh, shader: &S, material: Option<&Material>) {
        for chunk in mesh.indices.chunks_exact(3) {
            let (Some(v0), Some(v1), Some(v2)) = (
                mesh.vertices.get(chunk[0] as usize),
                mesh.vertices.get(chunk[1] as usize),
                mesh.vertices.get(chunk[2] as usize),
            ) else {
                continue;
            };

            let (pos0, var0) = shader.vertex(v0, material);
            let (pos1, var1) = shader.vertex(v1, material);
            let (pos2, var2) = shader.vertex(v2, material);

            self.rasterizer.rasterize_triangle(
                &self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
                material,
            );
        }
    }
}
