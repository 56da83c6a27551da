use crate::core::geometry::Vertex;
use nalgebra::{Point3, Vector2, Vector3};
use std::f32::consts::PI;

/// A collection of vertices and indices representing a 3D object.
#[derive(Debug)]
pub struct Mesh {
    /// List of vertices.
    pub vertices: Vec<Vertex>,
    /// List of indices defining triangles (3 indices per triangle).
    pub indices: Vec<u32>,
    /// Index into the owning model's material list.
    pub material_id: usize,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, material_id: usize) -> Self {
        Self {
            vertices,
            indices,
            material_id,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// A flat quad from four corners in fan order, split into (0,1,2) and (0,2,3).
    pub fn create_quad(
        corners: [Point3<f32>; 4],
        texcoords: [Vector2<f32>; 4],
        normal: Vector3<f32>,
        material_id: usize,
    ) -> Self {
        let vertices = corners
            .iter()
            .zip(texcoords.iter())
            .map(|(p, uv)| Vertex::new(*p, normal, *uv))
            .collect();
        Self::new(vertices, vec![0, 1, 2, 0, 2, 3], material_id)
    }

    /// An open cylinder (no caps) along +Z from z = 0 to z = `height`, laid out
    /// like a GLU quadric: `s` runs around the circumference, `t` along the axis,
    /// normals point outwards.
    pub fn create_cylinder(
        base_radius: f32,
        top_radius: f32,
        height: f32,
        slices: u32,
        stacks: u32,
        material_id: usize,
    ) -> Self {
        let slices = slices.max(3);
        let stacks = stacks.max(1);

        // Slope of the side wall folds into the normal's z component
        let nz = (base_radius - top_radius) / height;
        let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);

        for j in 0..=stacks {
            let t = j as f32 / stacks as f32;
            let radius = base_radius + (top_radius - base_radius) * t;
            let z = height * t;
            for i in 0..=slices {
                let s = i as f32 / slices as f32;
                let angle = 2.0 * PI * s;
                let (sin, cos) = angle.sin_cos();
                vertices.push(Vertex::new(
                    Point3::new(sin * radius, cos * radius, z),
                    Vector3::new(sin, cos, nz).normalize(),
                    Vector2::new(s, t),
                ));
            }
        }

        let row = slices + 1;
        let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
        for j in 0..stacks {
            for i in 0..slices {
                let a = j * row + i;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, b, d, a, d, c]);
            }
        }

        Self::new(vertices, indices, material_id)
    }

    /// A UV sphere centred on the origin.
    pub fn create_uv_sphere(radius: f32, segments: u32, rings: u32, material_id: usize) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);

        for r in 0..=rings {
            let v = r as f32 / rings as f32;
            let phi = PI * v;
            for s in 0..=segments {
                let u = s as f32 / segments as f32;
                let theta = 2.0 * PI * u;
                let normal = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                vertices.push(Vertex::new(
                    Point3::from(normal * radius),
                    normal,
                    Vector2::new(u, 1.0 - v),
                ));
            }
        }

        let row = segments + 1;
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for r in 0..rings {
            for s in 0..segments {
                let a = r * row + s;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Self::new(vertices, indices, material_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cylinder_spans_its_height_at_its_radius() {
        let mesh = Mesh::create_cylinder(7.0, 7.0, 1000.0, 16, 2, 0);
        assert_eq!(mesh.vertices.len(), 17 * 3);
        assert_eq!(mesh.triangle_count(), 16 * 2 * 2);

        let max_z = mesh.vertices.iter().map(|v| v.position.z).fold(f32::MIN, f32::max);
        let min_z = mesh.vertices.iter().map(|v| v.position.z).fold(f32::MAX, f32::min);
        assert_eq!(min_z, 0.0);
        assert_eq!(max_z, 1000.0);

        for v in &mesh.vertices {
            let r = (v.position.x * v.position.x + v.position.y * v.position.y).sqrt();
            assert!((r - 7.0).abs() < 1e-3);
            // outward normals
            assert!(v.normal.x * v.position.x + v.normal.y * v.position.y > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = Mesh::create_uv_sphere(2.0, 12, 8, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        for v in &mesh.vertices {
            assert!((v.position.coords.norm() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn quad_is_two_triangles() {
        let mesh = Mesh::create_quad(
            [
                Point3::new(-1.0, 0.0, -1.0),
                Point3::new(1.0, 0.0, -1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(-1.0, 0.0, 1.0),
            ],
            [Vector2::zeros(); 4],
            Vector3::y(),
            3,
        );
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.material_id, 3);
    }
}
