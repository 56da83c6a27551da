use crate::core::geometry::Vertex;
use crate::scene::material::Material;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Per-vertex data the rasterizer blends with barycentric weights (`a * t + b * u`).
/// Shared across the rayon workers of one draw call.
pub trait Interpolatable:
    Copy + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

/// Shader represents the programmable stages of the pipeline.
///
/// Implementations must be thread-safe (Send + Sync) because shading may be invoked
/// concurrently across fragments.
pub trait Shader: Send + Sync {
    /// Per-vertex varying data to be interpolated and provided to the fragment shader.
    type Varying: Interpolatable;

    /// Transforms the given vertex into homogeneous clip space and returns the
    /// varying data associated with that vertex.
    fn vertex(&self, vertex: &Vertex, material: Option<&Material>) -> (Vector4<f32>, Self::Varying);

    /// Computes the final RGB color (0.0..1.0) for the current fragment.
    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Vector3<f32>;
}
