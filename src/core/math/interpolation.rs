use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Barycentric coordinates (alpha, beta, gamma) of `p` with respect to the
/// screen-space triangle (v1, v2, v3).
///
/// Returns `None` for a degenerate triangle (area near zero).
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let p_v1 = p - v1;

    // Twice the signed area of the triangle
    let total_area_x2 = e1.x * e2.y - e1.y * e2.x;
    if total_area_x2.abs() < EPSILON {
        return None;
    }
    let inv_total_area_x2 = 1.0 / total_area_x2;

    let beta = (p_v1.x * e2.y - p_v1.y * e2.x) * inv_total_area_x2;
    let gamma = (e1.x * p_v1.y - e1.y * p_v1.x) * inv_total_area_x2;
    let alpha = 1.0 - beta - gamma;

    Some(Vector3::new(alpha, beta, gamma))
}

/// True when all three weights are non-negative (within tolerance).
#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Perspective-correct barycentrics: each screen-space weight is divided by its
/// vertex's clip w and the result renormalised.
///
/// Returns `None` when the weighted sum is too close to zero.
pub fn perspective_correct_barycentric(
    bary: Vector3<f32>,
    w1: f32,
    w2: f32,
    w3: f32,
) -> Option<Vector3<f32>> {
    let inv = |w: f32| if w.abs() > EPSILON { 1.0 / w } else { 1.0 };

    let wa = bary.x * inv(w1);
    let wb = bary.y * inv(w2);
    let wc = bary.z * inv(w3);

    let sum = wa + wb + wc;
    if sum.abs() < EPSILON {
        return None;
    }
    let inv_sum = 1.0 / sum;
    Some(Vector3::new(wa * inv_sum, wb * inv_sum, wc * inv_sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_has_equal_weights() {
        let bary = barycentric_coordinates(
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(0.0, 3.0),
        )
        .unwrap();
        assert!((bary.x - 1.0 / 3.0).abs() < 1e-5);
        assert!((bary.y - 1.0 / 3.0).abs() < 1e-5);
        assert!(is_inside_triangle(bary));
    }

    #[test]
    fn degenerate_triangle_is_rejected() {
        let p = Point2::new(0.0, 0.0);
        assert!(barycentric_coordinates(p, p, Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn equal_w_leaves_weights_unchanged() {
        let bary = Vector3::new(0.2, 0.3, 0.5);
        let corrected = perspective_correct_barycentric(bary, 4.0, 4.0, 4.0).unwrap();
        assert!((corrected - bary).norm() < 1e-5);
    }
}
