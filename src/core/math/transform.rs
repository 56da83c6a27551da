use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for the transformation matrices used by the scene (Right-Handed).
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Creates a rotation matrix around the X-axis.
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,  -s,   0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Y-axis.
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a non-uniform scaling matrix.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Creates a View matrix (Look-At, Right-Handed).
    /// Transforms world space coordinates to camera/view space.
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        // In RHS, camera looks down -Z
        let z_axis = (eye - target).normalize();
        let x_axis = up.cross(&z_axis).normalize();
        let y_axis = z_axis.cross(&x_axis);

        let rotation = Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, 0.0,
            y_axis.x, y_axis.y, y_axis.z, 0.0,
            z_axis.x, z_axis.y, z_axis.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );

        rotation * Self::translation(&-eye.coords)
    }

    /// Creates a Perspective Projection matrix (Right-Handed).
    /// Maps view frustum to NDC [-1, 1].
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov_y_rad / 2.0).tan();
        let nf = 1.0 / (near - far);

        Matrix4::new(
            f / aspect_ratio, 0.0, 0.0,               0.0,
            0.0,              f,   0.0,               0.0,
            0.0,              0.0, (far + near) * nf, 2.0 * far * near * nf,
            0.0,              0.0, -1.0,              0.0,
        )
    }
}

//=================================
// Matrix Stack
//=================================

/// A modelview matrix stack in the spirit of `glPushMatrix`/`glPopMatrix`.
///
/// Every operation post-multiplies the current matrix, so the last call is the
/// first transform applied to a vertex. Saving and restoring only happens through
/// [`MatrixStack::scoped`], which keeps pushes and pops balanced.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Matrix4<f32>,
    saved: Vec<Matrix4<f32>>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            current: Matrix4::identity(),
            saved: Vec::new(),
        }
    }

    pub fn top(&self) -> Matrix4<f32> {
        self.current
    }

    /// Number of saved matrices below the current one.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn multiply(&mut self, m: &Matrix4<f32>) -> &mut Self {
        self.current *= m;
        self
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.multiply(&TransformFactory::translation(&Vector3::new(x, y, z)))
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.multiply(&TransformFactory::scaling_nonuniform(&Vector3::new(x, y, z)))
    }

    pub fn scale_uniform(&mut self, s: f32) -> &mut Self {
        self.scale(s, s, s)
    }

    pub fn rotate_x_deg(&mut self, degrees: f32) -> &mut Self {
        self.multiply(&TransformFactory::rotation_x(degrees.to_radians()))
    }

    pub fn rotate_y_deg(&mut self, degrees: f32) -> &mut Self {
        self.multiply(&TransformFactory::rotation_y(degrees.to_radians()))
    }

    /// Saves the current matrix, runs `f`, then restores it.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.saved.len();
        self.saved.push(self.current);
        let result = f(self);
        self.saved.truncate(depth + 1);
        if let Some(m) = self.saved.pop() {
            self.current = m;
        }
        result
    }
}

//=================================
// Core Transformation Functions
//=================================

/// Performs perspective division: Clip Space -> NDC.
#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Point3<f32> {
    let w = clip.w;
    if w.abs() > 1e-6 {
        Point3::new(clip.x / w, clip.y / w, clip.z / w)
    } else {
        Point3::origin()
    }
}

/// Converts NDC coordinates to Screen coordinates (Viewport Transform).
/// Note: Y-axis is flipped (NDC +Y is up, Screen +Y is down).
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn scoped_restores_previous_matrix() {
        let mut stack = MatrixStack::new();
        stack.translate(1.0, 2.0, 3.0);
        let before = stack.top();

        let inner_depth = stack.scoped(|s| {
            s.scale_uniform(5.0).rotate_x_deg(90.0);
            s.scoped(|s| {
                s.translate(10.0, 0.0, 0.0);
                s.depth()
            })
        });

        assert_eq!(inner_depth, 2);
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.top(), before);
    }

    #[test]
    fn last_operation_applies_first() {
        let mut stack = MatrixStack::new();
        stack.translate(0.0, 100.0, 0.0).scale_uniform(2.0);
        let p = stack.top() * Vector4::new(1.0, 1.0, 1.0, 1.0);
        assert!(approx(p.x, 2.0));
        assert!(approx(p.y, 102.0));
        assert!(approx(p.z, 2.0));
    }

    #[test]
    fn rotate_x_maps_cylinder_axis_downwards() {
        // A +Z axis rotated by 90 degrees about X points along -Y.
        let mut stack = MatrixStack::new();
        stack.rotate_x_deg(90.0);
        let axis = stack.top() * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert!(approx(axis.x, 0.0));
        assert!(approx(axis.y, -1.0));
        assert!(approx(axis.z, 0.0));
    }

    #[test]
    fn view_looks_down_negative_z() {
        let view = TransformFactory::view(
            &Point3::new(0.0, 0.0, 5.0),
            &Point3::origin(),
            &Vector3::y(),
        );
        let p = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx(p.z, -5.0));
    }
}
