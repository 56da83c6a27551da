use nalgebra::{Point3, Vector2, Vector3};

/// A single vertex of a mesh, in the mesh's local space.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    /// Outward-facing unit normal.
    pub normal: Vector3<f32>,
    /// Texture coordinates (UV), before the texture matrix is applied.
    pub texcoord: Vector2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }
}
