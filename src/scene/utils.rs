use crate::scene::model::Model;
use nalgebra::Point3;

/// Centres the model on the origin and scales it so its bounding box's largest
/// half-extent equals `radius`.
///
/// Returns the original centre and the scaling factor used.
pub fn normalize_and_center_model(model: &mut Model, radius: f32) -> (Point3<f32>, f32) {
    let mut min_bound = Point3::new(f32::MAX, f32::MAX, f32::MAX);
    let mut max_bound = Point3::new(f32::MIN, f32::MIN, f32::MIN);
    let mut has_verts = false;

    for vertex in model.meshes.iter().flat_map(|m| m.vertices.iter()) {
        min_bound = min_bound.inf(&vertex.position);
        max_bound = max_bound.sup(&vertex.position);
        has_verts = true;
    }

    if !has_verts {
        return (Point3::origin(), 1.0);
    }

    let center = nalgebra::center(&min_bound, &max_bound);
    let extent = max_bound - min_bound;
    let max_dimension = extent.x.max(extent.y).max(extent.z);

    let scale_factor = if max_dimension > 1e-6 {
        2.0 * radius / max_dimension
    } else {
        1.0
    };

    for vertex in model.meshes.iter_mut().flat_map(|m| m.vertices.iter_mut()) {
        vertex.position = Point3::from((vertex.position - center) * scale_factor);
    }

    (center, scale_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::material::Material;
    use crate::scene::mesh::Mesh;

    #[test]
    fn model_is_centred_and_fitted() {
        let mut model = Model::new(
            vec![Mesh::create_uv_sphere(4.0, 8, 6, 0)],
            vec![Material::default()],
        );
        for v in &mut model.meshes[0].vertices {
            v.position.x += 10.0;
        }

        let (center, scale) = normalize_and_center_model(&mut model, 100.0);
        assert!((center.x - 10.0).abs() < 1e-3);
        assert!((scale - 25.0).abs() < 1e-3);

        let max_x = model.meshes[0]
            .vertices
            .iter()
            .map(|v| v.position.x)
            .fold(f32::MIN, f32::max);
        assert!((max_x - 100.0).abs() < 1e-2);
    }
}
