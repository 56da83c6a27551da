use crate::core::geometry::Vertex;
use crate::scene::material::{Material, TexEnvMode};
use crate::scene::mesh::Mesh;
use crate::scene::model::Model;
use crate::scene::texture::{Texture, TextureFilter};
use image::RgbImage;
use log::{info, warn};
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3};
use std::path::Path;
use std::sync::Arc;

/// File extensions (lower case) that [`load_model`] understands.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["obj", "gltf", "glb"];

/// Imports a model, choosing the importer from the file extension.
pub fn load_model(path: &Path, filter: TextureFilter) -> Result<Model, String> {
    if !path.is_file() {
        return Err(format!("File not found: {}", path.display()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let model = match extension.as_str() {
        "obj" => load_obj(path, filter)?,
        "gltf" | "glb" => load_gltf(path, filter)?,
        other => {
            return Err(format!(
                "Unsupported model format '{}' (expected one of: {})",
                other,
                SUPPORTED_EXTENSIONS.join(", ")
            ));
        }
    };

    if model.triangle_count() == 0 {
        return Err(format!("Model '{}' contains no triangles", path.display()));
    }

    info!(
        "Model loaded: {} ({} meshes, {} vertices, {} triangles)",
        path.display(),
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}

/// Wavefront OBJ through `tobj`; MTL diffuse colors and diffuse maps are honoured.
fn load_obj(path: &Path, filter: TextureFilter) -> Result<Model, String> {
    info!("Loading OBJ file: {}", path.display());

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, materials) = tobj::load_obj(path, &load_options)
        .map_err(|e| format!("Failed to load OBJ: {}", e))?;

    let obj_materials = materials.unwrap_or_else(|e| {
        warn!("Ignoring MTL for '{}': {}", path.display(), e);
        Vec::new()
    });

    let base_dir = path.parent().unwrap_or(Path::new("."));
    let mut materials: Vec<Material> = obj_materials
        .iter()
        .map(|m| {
            let color = m.diffuse.map(Vector3::from).unwrap_or(Vector3::new(0.8, 0.8, 0.8));
            let texture = m.diffuse_texture.as_ref().and_then(|name| {
                Texture::load(base_dir.join(name), filter)
                    .map_err(|e| warn!("{}", e))
                    .ok()
            });
            Material {
                color,
                texture: texture.map(Arc::new),
                tex_env: TexEnvMode::Modulate,
            }
        })
        .collect();

    let fallback_material = materials.len();
    materials.push(Material::default());

    let meshes = models
        .into_iter()
        .map(|model| {
            let mesh = model.mesh;
            let num_vertices = mesh.positions.len() / 3;
            let has_normals = mesh.normals.len() >= num_vertices * 3;
            let has_texcoords = mesh.texcoords.len() >= num_vertices * 2;

            if !has_normals {
                warn!(
                    "Mesh '{}' is missing normals, computing them from faces.",
                    model.name
                );
            }

            let mut vertices: Vec<Vertex> = (0..num_vertices)
                .map(|i| {
                    let position = Point3::new(
                        mesh.positions[i * 3],
                        mesh.positions[i * 3 + 1],
                        mesh.positions[i * 3 + 2],
                    );
                    let normal = if has_normals {
                        Vector3::new(
                            mesh.normals[i * 3],
                            mesh.normals[i * 3 + 1],
                            mesh.normals[i * 3 + 2],
                        )
                    } else {
                        Vector3::zeros()
                    };
                    let texcoord = if has_texcoords {
                        Vector2::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1])
                    } else {
                        Vector2::zeros()
                    };
                    Vertex::new(position, normal, texcoord)
                })
                .collect();

            if !has_normals {
                compute_vertex_normals(&mut vertices, &mesh.indices);
            }

            let material_id = mesh
                .material_id
                .filter(|&id| id < fallback_material)
                .unwrap_or(fallback_material);
            Mesh::new(vertices, mesh.indices, material_id)
        })
        .collect();

    Ok(Model::new(meshes, materials))
}

/// glTF 2.0 through `gltf`; node transforms are baked into the vertices and the
/// base color factor/texture become the material.
fn load_gltf(path: &Path, filter: TextureFilter) -> Result<Model, String> {
    info!("Loading glTF file: {}", path.display());

    let (document, buffers, images) =
        gltf::import(path).map_err(|e| format!("Failed to load glTF: {}", e))?;

    let textures: Vec<Option<Arc<Texture>>> = images
        .iter()
        .map(|data| gltf_image_to_rgb(data).map(|img| Arc::new(Texture::from_image(img, filter))))
        .collect();

    let mut materials: Vec<Material> = document
        .materials()
        .map(|m| {
            let pbr = m.pbr_metallic_roughness();
            let [r, g, b, _] = pbr.base_color_factor();
            let texture = pbr
                .base_color_texture()
                .and_then(|info| textures.get(info.texture().source().index()).cloned().flatten());
            Material {
                color: Vector3::new(r, g, b),
                texture,
                tex_env: TexEnvMode::Modulate,
            }
        })
        .collect();
    let fallback_material = materials.len();
    materials.push(Material::default());

    let mut meshes = Vec::new();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| "glTF file has no scene".to_string())?;

    let mut pending: Vec<(gltf::Node, Matrix4<f32>)> =
        scene.nodes().map(|n| (n, Matrix4::identity())).collect();

    while let Some((node, parent)) = pending.pop() {
        let local = Matrix4::from(node.transform().matrix());
        let world = parent * local;

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    warn!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
                    continue;
                }
                let material_id = primitive.material().index().unwrap_or(fallback_material);
                if let Some(m) = gltf_primitive_to_mesh(&primitive, &buffers, &world, material_id)
                {
                    meshes.push(m);
                }
            }
        }

        pending.extend(node.children().map(|child| (child, world)));
    }

    Ok(Model::new(meshes, materials))
}

fn gltf_primitive_to_mesh(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    transform: &Matrix4<f32>,
    material_id: usize,
) -> Option<Mesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
    let texcoords: Option<Vec<[f32; 2]>> =
        reader.read_tex_coords(0).map(|tc| tc.into_f32().collect());
    let indices: Vec<u32> = match reader.read_indices() {
        Some(i) => i.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let normal_matrix: Matrix3<f32> = transform
        .fixed_view::<3, 3>(0, 0)
        .into_owned()
        .try_inverse()
        .map(|m| m.transpose())
        .unwrap_or_else(Matrix3::identity);

    let mut vertices: Vec<Vertex> = positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let position = transform.transform_point(&Point3::from(*p));
            let normal = normals
                .as_ref()
                .and_then(|n| n.get(i))
                .map(|n| (normal_matrix * Vector3::from(*n)).normalize())
                .unwrap_or_else(Vector3::zeros);
            // glTF puts the UV origin at the top-left
            let texcoord = texcoords
                .as_ref()
                .and_then(|t| t.get(i))
                .map(|t| Vector2::new(t[0], 1.0 - t[1]))
                .unwrap_or_else(Vector2::zeros);
            Vertex::new(position, normal, texcoord)
        })
        .collect();

    if normals.is_none() {
        compute_vertex_normals(&mut vertices, &indices);
    }

    Some(Mesh::new(vertices, indices, material_id))
}

fn gltf_image_to_rgb(data: &gltf::image::Data) -> Option<RgbImage> {
    use gltf::image::Format;

    if data.width == 0 || data.height == 0 {
        warn!("Empty glTF image ({}x{}), ignoring texture", data.width, data.height);
        return None;
    }

    let rgb: Vec<u8> = match data.format {
        Format::R8G8B8 => data.pixels.clone(),
        Format::R8G8B8A8 => data
            .pixels
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        other => {
            warn!("Unsupported glTF image format {:?}, ignoring texture", other);
            return None;
        }
    };
    RgbImage::from_raw(data.width, data.height, rgb)
}

/// Area-weighted smooth normals for meshes that ship without them.
fn compute_vertex_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for v in vertices.iter_mut() {
        v.normal = Vector3::zeros();
    }
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }
        let face = (vertices[b].position - vertices[a].position)
            .cross(&(vertices[c].position - vertices[a].position));
        for i in [a, b, c] {
            vertices[i].normal += face;
        }
    }
    for v in vertices.iter_mut() {
        v.normal = v.normal.try_normalize(1e-12).unwrap_or_else(Vector3::y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("goal-scene-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    const CUBE_CORNER: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    #[test]
    fn loads_obj_and_fills_in_normals() {
        let path = scratch_file("quad.obj", CUBE_CORNER);
        let model = load_model(&path, TextureFilter::Nearest).unwrap();

        assert_eq!(model.triangle_count(), 2);
        for v in model.meshes.iter().flat_map(|m| m.vertices.iter()) {
            assert!((v.normal - Vector3::z()).norm() < 1e-5);
        }
        // no MTL: every mesh points at the fallback material
        assert!(model.material_for(&model.meshes[0]).is_some());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_model(Path::new("no/such/ball.obj"), TextureFilter::Nearest).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let path = scratch_file("ball.3ds", "not really a 3ds file");
        let err = load_model(&path, TextureFilter::Nearest).unwrap_err();
        assert!(err.contains("Unsupported"));
    }

    #[test]
    fn empty_obj_is_rejected() {
        let path = scratch_file("empty.obj", "# nothing here\n");
        assert!(load_model(&path, TextureFilter::Nearest).is_err());
    }

    #[test]
    fn empty_gltf_image_is_ignored() {
        let empty = gltf::image::Data {
            pixels: Vec::new(),
            format: gltf::image::Format::R8G8B8,
            width: 0,
            height: 0,
        };
        assert!(gltf_image_to_rgb(&empty).is_none());

        let pixel = gltf::image::Data {
            pixels: vec![10, 20, 30, 255],
            format: gltf::image::Format::R8G8B8A8,
            width: 1,
            height: 1,
        };
        let rgb = gltf_image_to_rgb(&pixel).unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }
}
