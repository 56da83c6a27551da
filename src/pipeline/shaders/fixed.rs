use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use crate::scene::light::{GLOBAL_AMBIENT, Light};
use crate::scene::material::Material;
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Lit vertex color and scaled texture coordinates, interpolated per fragment.
#[derive(Clone, Copy, Debug)]
pub struct FixedVarying {
    pub color: Vector3<f32>,
    pub uv: Vector2<f32>,
}

impl Add for FixedVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            color: self.color + other.color,
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for FixedVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            color: self.color * scalar,
            uv: self.uv * scalar,
        }
    }
}

impl Interpolatable for FixedVarying {}

/// Fixed-function style shading: per-vertex (Gouraud) lighting with color tracking,
/// then the texture environment applied per fragment.
///
/// Lights are given in eye space, so they stay put relative to the camera
/// whatever the modelview does.
pub struct FixedFunctionShader<'a> {
    pub modelview: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    normal_matrix: Matrix3<f32>,
    mvp: Matrix4<f32>,
    pub lights: &'a [Light],
    /// Texture matrix: uniform scale applied to every texture coordinate.
    pub texture_scale: f32,
    fallback_material: Material,
}

impl<'a> FixedFunctionShader<'a> {
    pub fn new(
        modelview: Matrix4<f32>,
        projection: Matrix4<f32>,
        lights: &'a [Light],
        texture_scale: f32,
    ) -> Self {
        let upper = modelview.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = upper
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(upper);

        Self {
            modelview,
            projection,
            normal_matrix,
            mvp: projection * modelview,
            lights,
            texture_scale,
            fallback_material: Material::default(),
        }
    }

    /// Colour reaching the eye from a surface point, before texturing.
    pub fn light_vertex(
        &self,
        eye_pos: &Point3<f32>,
        eye_normal: &Vector3<f32>,
        color: &Vector3<f32>,
    ) -> Vector3<f32> {
        let lit = self
            .lights
            .iter()
            .fold(color * GLOBAL_AMBIENT, |acc, light| {
                acc + light.shade(eye_pos, eye_normal, color)
            });
        lit.map(|c| c.clamp(0.0, 1.0))
    }
}

impl Shader for FixedFunctionShader<'_> {
    type Varying = FixedVarying;

    fn vertex(&self, vertex: &Vertex, material: Option<&Material>) -> (Vector4<f32>, Self::Varying) {
        let material = material.unwrap_or(&self.fallback_material);
        let position = vertex.position.to_homogeneous();

        let eye = self.modelview * position;
        let eye_pos = Point3::new(eye.x, eye.y, eye.z);
        let eye_normal = (self.normal_matrix * vertex.normal)
            .try_normalize(1e-8)
            .unwrap_or_else(Vector3::z);

        let varying = FixedVarying {
            color: self.light_vertex(&eye_pos, &eye_normal, &material.color),
            uv: vertex.texcoord * self.texture_scale,
        };

        (self.mvp * position, varying)
    }

    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Vector3<f32> {
        match material.and_then(|m| m.texture.as_ref().map(|t| (m.tex_env, t))) {
            Some((tex_env, texture)) => {
                let texel = texture.sample(varying.uv.x, varying.uv.y);
                tex_env.combine(varying.color, texel)
            }
            None => varying.color,
        }
    }
}
