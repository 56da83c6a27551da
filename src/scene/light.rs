use nalgebra::{Point3, Vector3};

/// Global ambient term of the fixed-function lighting model.
pub const GLOBAL_AMBIENT: f32 = 0.2;

/// A positional light source, given in eye space.
#[derive(Debug, Clone)]
pub enum Light {
    /// Radiates in all directions.
    Point {
        position: Point3<f32>,
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
    },
    /// Lights only the cone around `direction` whose half-angle is `cutoff_deg`.
    Spot {
        position: Point3<f32>,
        direction: Vector3<f32>,
        cutoff_deg: f32,
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
    },
}

impl Light {
    pub fn new_point(position: Point3<f32>, ambient: Vector3<f32>, diffuse: Vector3<f32>) -> Self {
        Self::Point {
            position,
            ambient,
            diffuse,
        }
    }

    pub fn new_spot(
        position: Point3<f32>,
        direction: Vector3<f32>,
        cutoff_deg: f32,
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
    ) -> Self {
        Self::Spot {
            position,
            direction: direction.normalize(),
            cutoff_deg,
            ambient,
            diffuse,
        }
    }

    /// Ambient plus Lambert diffuse reflected towards the eye from a surface point
    /// whose ambient and diffuse reflectance are both `color`.
    pub fn shade(
        &self,
        surface: &Point3<f32>,
        normal: &Vector3<f32>,
        color: &Vector3<f32>,
    ) -> Vector3<f32> {
        let (position, ambient, diffuse, spot) = match self {
            Light::Point {
                position,
                ambient,
                diffuse,
            } => (position, ambient, diffuse, None),
            Light::Spot {
                position,
                direction,
                cutoff_deg,
                ambient,
                diffuse,
            } => (position, ambient, diffuse, Some((direction, *cutoff_deg))),
        };

        let to_light = (position - surface).normalize();

        if let Some((direction, cutoff_deg)) = spot {
            let cos_angle = (-to_light).dot(direction);
            if cos_angle < cutoff_deg.to_radians().cos() {
                return Vector3::zeros();
            }
        }

        let lambert = normal.dot(&to_light).max(0.0);
        (ambient + diffuse * lambert).component_mul(color)
    }
}
