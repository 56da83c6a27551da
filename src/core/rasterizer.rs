use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::Shader;
use crate::scene::material::Material;
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

/// Draws clipped triangles onto a [`FrameBuffer`].
pub struct Rasterizer {
    pub cull_mode: CullMode,
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

impl CullMode {
    /// Parses the config spelling; anything unknown disables culling.
    pub fn from_name(name: &str) -> Self {
        match name {
            "back" => CullMode::Back,
            "front" => CullMode::Front,
            _ => CullMode::None,
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

type ClipVertex<V> = (Vector4<f32>, V);

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::None,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Rasterizes one triangle given in clip space.
    ///
    /// The triangle is clipped against the six frustum planes (Sutherland–Hodgman in
    /// homogeneous clip space) and the resulting convex polygon is drawn as a fan.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&Material>,
    ) {
        let mut current_poly: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        let mut clip_buffer: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);

        for i in 0..3 {
            current_poly.push((clip_coords[i], varyings[i]));
        }

        // (axis, sign): the inside half-space is sign * p[axis] <= p.w
        let planes = [
            (0, 1.0),
            (0, -1.0),
            (1, 1.0),
            (1, -1.0),
            (2, 1.0),
            (2, -1.0),
        ];

        for &(axis, sign) in &planes {
            if current_poly.is_empty() {
                return;
            }
            Self::clip_polygon_against_plane::<S>(&current_poly, &mut clip_buffer, axis, sign);
            std::mem::swap(&mut current_poly, &mut clip_buffer);
        }

        if current_poly.len() < 3 {
            return;
        }

        let v0 = current_poly[0];
        for i in 1..(current_poly.len() - 1) {
            let v1 = current_poly[i];
            let v2 = current_poly[i + 1];

            self.rasterize_triangle_clipped(
                framebuffer,
                shader,
                &[v0.0, v1.0, v2.0],
                &[v0.1, v1.1, v2.1],
                material,
            );
        }
    }

    /// Clips `input` against one plane, writing the surviving polygon to `output`.
    fn clip_polygon_against_plane<S: Shader>(
        input: &[ClipVertex<S::Varying>],
        output: &mut Vec<ClipVertex<S::Varying>>,
        axis: usize,
        sign: f32,
    ) {
        output.clear();

        let Some(&last) = input.last() else {
            return;
        };

        let is_inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;

        let mut prev = last;
        let mut prev_inside = is_inside(&prev.0);

        for curr in input {
            let curr_inside = is_inside(&curr.0);

            if curr_inside {
                if !prev_inside {
                    if let Some(inter) = Self::intersect_edge_plane::<S>(prev, *curr, axis, sign) {
                        output.push(inter);
                    }
                }
                output.push(*curr);
            } else if prev_inside {
                if let Some(inter) = Self::intersect_edge_plane::<S>(prev, *curr, axis, sign) {
                    output.push(inter);
                }
            }

            prev = *curr;
            prev_inside = curr_inside;
        }
    }

    /// Intersection of segment a-b with the plane `sign * p[axis] = p.w`,
    /// interpolating both position and varying.
    #[inline(always)]
    fn intersect_edge_plane<S: Shader>(
        a: ClipVertex<S::Varying>,
        b: ClipVertex<S::Varying>,
        axis: usize,
        sign: f32,
    ) -> Option<ClipVertex<S::Varying>> {
        let ac = a.0[axis];
        let bc = b.0[axis];
        let aw = a.0.w;
        let bw = b.0.w;

        let denom = sign * (bc - ac) - (bw - aw);
        if denom.abs() < 1e-9 {
            return None;
        }

        let t = (aw - sign * ac) / denom;
        if !t.is_finite() {
            return None;
        }

        let pos = a.0 + (b.0 - a.0) * t;
        let vary = a.1 * (1.0 - t) + b.1 * t;

        Some((pos, vary))
    }

    /// Draws a triangle that is known to lie inside the frustum:
    /// perspective division, viewport transform, culling, then the parallel pixel loop.
    fn rasterize_triangle_clipped<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&Material>,
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen_coords = [Point2::origin(); 3];
        let mut w_values = [0.0; 3];

        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            w_values[i] = clip_coords[i].w;
            screen_coords[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        let v0 = screen_coords[0];
        let v1 = screen_coords[1];
        let v2 = screen_coords[2];
        let edge1 = v1 - v0;
        let edge2 = v2 - v1;
        let signed_area = edge1.x * edge2.y - edge1.y * edge2.x;

        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        let (min_x, min_y, max_x, max_y) = Self::compute_bounding_box(&screen_coords);

        // Scissor
        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = max_x.min(framebuffer.buffer_width as i32 - 1) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = max_y.min(framebuffer.buffer_height as i32 - 1) as usize;

        (start_y..=end_y).into_par_iter().for_each(|y| {
            for x in start_x..=end_x {
                let pixel_center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);

                let Some(bary) = barycentric_coordinates(
                    pixel_center,
                    screen_coords[0],
                    screen_coords[1],
                    screen_coords[2],
                ) else {
                    continue;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }

                let Some(corrected) =
                    perspective_correct_barycentric(bary, w_values[0], w_values[1], w_values[2])
                else {
                    continue;
                };

                // NDC depth is affine in screen space, so it uses the uncorrected weights.
                let z_ndc = bary.x * clip_coords[0].z / w_values[0]
                    + bary.y * clip_coords[1].z / w_values[1]
                    + bary.z * clip_coords[2].z / w_values[2];
                let depth = z_ndc * 0.5 + 0.5;

                if framebuffer.depth_test_and_update(x, y, depth) {
                    let interpolated = varyings[0] * corrected.x
                        + varyings[1] * corrected.y
                        + varyings[2] * corrected.z;
                    let color = shader.fragment(interpolated, material);
                    framebuffer.set_pixel_safe(x, y, color);
                }
            }
        });
    }

    fn compute_bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
        let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
        let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
        let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
        let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
        (min_x, min_y, max_x, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use crate::core::pipeline::Interpolatable;
    use nalgebra::Vector3;
    use std::ops::{Add, Mul};

    #[derive(Clone, Copy)]
    struct Flat(f32);

    impl Add for Flat {
        type Output = Self;
        fn add(self, o: Self) -> Self {
            Flat(self.0 + o.0)
        }
    }

    impl Mul<f32> for Flat {
        type Output = Self;
        fn mul(self, s: f32) -> Self {
            Flat(self.0 * s)
        }
    }

    impl Interpolatable for Flat {}

    struct Passthrough;

    impl Shader for Passthrough {
        type Varying = Flat;

        fn vertex(&self, vertex: &Vertex, _: Option<&Material>) -> (Vector4<f32>, Flat) {
            (vertex.position.to_homogeneous(), Flat(1.0))
        }

        fn fragment(&self, varying: Flat, _: Option<&Material>) -> Vector3<f32> {
            Vector3::repeat(varying.0)
        }
    }

    fn draw(rasterizer: &Rasterizer, clip: [Vector4<f32>; 3]) -> FrameBuffer {
        let fb = FrameBuffer::new(8, 8, 1);
        rasterizer.rasterize_triangle(&fb, &Passthrough, &clip, &[Flat(1.0); 3], None);
        fb
    }

    // Counter-clockwise in NDC, which is clockwise on screen (y flips)
    fn big_triangle() -> [Vector4<f32>; 3] {
        [
            Vector4::new(-1.0, -1.0, 0.0, 1.0),
            Vector4::new(3.0, -1.0, 0.0, 1.0),
            Vector4::new(-1.0, 3.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn covering_triangle_fills_every_pixel() {
        let fb = draw(&Rasterizer::new(), big_triangle());
        for y in 0..8 {
            for x in 0..8 {
                let color = fb.get_pixel(x, y).unwrap();
                assert!((color.x - 1.0).abs() < 1e-4);
                assert_eq!(fb.depth_at(x, y), Some(0.5));
            }
        }
    }

    #[test]
    fn culling_follows_winding() {
        let mut front = Rasterizer::new();
        front.set_cull_mode(CullMode::Front);
        let mut back = Rasterizer::new();
        back.set_cull_mode(CullMode::Back);

        let drawn_front = draw(&front, big_triangle()).depth_at(4, 4).unwrap().is_finite();
        let drawn_back = draw(&back, big_triangle()).depth_at(4, 4).unwrap().is_finite();
        // Exactly one of the two modes keeps the triangle
        assert_ne!(drawn_front, drawn_back);
    }

    #[test]
    fn triangle_behind_the_camera_is_dropped() {
        let fb = draw(
            &Rasterizer::new(),
            [
                Vector4::new(-1.0, -1.0, 0.0, -1.0),
                Vector4::new(1.0, -1.0, 0.0, -1.0),
                Vector4::new(0.0, 1.0, 0.0, -1.0),
            ],
        );
        assert!(fb.depth_at(4, 4).is_some_and(f32::is_infinite));
    }
}
