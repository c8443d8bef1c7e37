//! The mesh/model boundary: imported geometry feeding the device.
//!
//! A [`Model`] is a set of meshes with material parameters. Drawing a
//! mesh publishes its material as uniforms (`material.texture_diffuse0`,
//! `material.color_diffuse`, ... plus `transform.model`) and then hands
//! the vertex array to the device; shaders pick up whichever of those
//! they understand.

use std::path::Path;
use std::sync::Arc;

use fxhash::FxHashMap;
use log::{debug, error, warn};
use vek::{Mat4, Rgba, Vec3, Vec4};

use crate::error::ModelError;
use crate::framebuffer::FrameBuffer;
use crate::pipeline::{RenderDevice, VertexArray};
use crate::sampler::TextureSampler;
use crate::shader::VsIn;
use crate::texture::{Texture, TextureFormat};

/// Attribute slots used by imported meshes.
pub const ATTR_POSITION: usize = 0;
pub const ATTR_TEXCOORD: usize = 1;
pub const ATTR_NORMAL: usize = 2;

/// A texture attached to a mesh together with its material role
/// (`"texture_diffuse"`, `"texture_specular"`, ...).
#[derive(Clone, Debug)]
pub struct ModelTexture {
    pub texture: Arc<Texture>,
    pub kind: String,
}

/// One drawable chunk of a model: geometry plus material parameters.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertex_array: VertexArray,
    pub textures: Vec<ModelTexture>,
    pub material_colors: Vec<(String, Rgba<f32>)>,
}

impl Mesh {
    /// Publish the material uniforms and draw the mesh.
    ///
    /// Textures of the same kind are numbered in order:
    /// `material.texture_diffuse0`, `material.texture_diffuse1`, ...
    pub fn draw(
        &self,
        device: &mut RenderDevice,
        framebuffer: &mut FrameBuffer,
        transform: Mat4<f32>,
    ) {
        let mut kind_counts: FxHashMap<&str, usize> = FxHashMap::default();
        for tex in &self.textures {
            let n = kind_counts.entry(tex.kind.as_str()).or_insert(0);
            device.set_uniform(
                format!("material.{}{}", tex.kind, n),
                TextureSampler::new(tex.texture.clone()),
            );
            *n += 1;
        }
        for (name, color) in &self.material_colors {
            device.set_uniform(format!("material.{}", name), *color);
        }
        device.set_uniform("transform.model", transform);

        device.draw(framebuffer, &self.vertex_array);
    }
}

/// A set of meshes imported from an OBJ file.
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Model-to-world transform applied when drawing.
    pub transform: Mat4<f32>,
    meshes: Vec<Mesh>,
    centroid: Vec3<f32>,
    aabb_min: Vec3<f32>,
    aabb_max: Vec3<f32>,
}

impl Model {
    /// Import an OBJ file (triangulated, one index stream). Referenced
    /// material textures are loaded relative to the model's directory
    /// and shared when several meshes use the same file; a texture that
    /// fails to load is skipped with a warning so the shader falls back
    /// to its default colour.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let (models, materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| {
                error!("failed to load model {}: {}", path.display(), source);
                ModelError::Load { path: path.to_owned(), source }
            })?;
        let materials = materials.unwrap_or_else(|e| {
            warn!("model {} has unusable materials: {}", path.display(), e);
            Vec::new()
        });

        let directory = path.parent().unwrap_or_else(|| Path::new("."));
        let mut texture_cache: FxHashMap<String, Arc<Texture>> = FxHashMap::default();

        let mut meshes = Vec::with_capacity(models.len());
        let mut position_sum = Vec3::<f32>::zero();
        let mut position_count = 0usize;
        let mut aabb_min = Vec3::broadcast(f32::INFINITY);
        let mut aabb_max = Vec3::broadcast(f32::NEG_INFINITY);

        for model in &models {
            let mesh = &model.mesh;
            let vertex_count = mesh.positions.len() / 3;

            let mut vertices = Vec::with_capacity(vertex_count);
            for i in 0..vertex_count {
                let p = Vec3::new(
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                );
                position_sum += p;
                position_count += 1;
                aabb_min = aabb_min.map2(p, f32::min);
                aabb_max = aabb_max.map2(p, f32::max);

                let mut vsin = VsIn::default();
                vsin.attributes[ATTR_POSITION] = Vec4::new(p.x, p.y, p.z, 1.0);
                if mesh.texcoords.len() >= (i + 1) * 2 {
                    vsin.attributes[ATTR_TEXCOORD] =
                        Vec4::new(mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1], 0.0, 1.0);
                }
                if mesh.normals.len() >= (i + 1) * 3 {
                    vsin.attributes[ATTR_NORMAL] = Vec4::new(
                        mesh.normals[i * 3],
                        mesh.normals[i * 3 + 1],
                        mesh.normals[i * 3 + 2],
                        0.0,
                    );
                }
                vertices.push(vsin);
            }
            let indices = mesh.indices.iter().map(|&i| i as usize).collect();

            let mut textures = Vec::new();
            let mut material_colors = Vec::new();
            if let Some(material) = mesh.material_id.and_then(|id| materials.get(id)) {
                let mut attach = |file: &Option<String>, kind: &str| {
                    let Some(file) = file else { return };
                    match load_cached(&mut texture_cache, directory, file) {
                        Some(texture) => {
                            textures.push(ModelTexture { texture, kind: kind.to_owned() })
                        }
                        None => warn!(
                            "model {}: skipping unloadable {} texture `{}`",
                            path.display(),
                            kind,
                            file,
                        ),
                    }
                };
                attach(&material.ambient_texture, "texture_ambient");
                attach(&material.diffuse_texture, "texture_diffuse");
                attach(&material.specular_texture, "texture_specular");

                let mut color = |value: &Option<[f32; 3]>, name: &str| {
                    if let Some([r, g, b]) = value {
                        material_colors.push((name.to_owned(), Rgba::new(*r, *g, *b, 1.0)));
                    }
                };
                color(&material.ambient, "color_ambient");
                color(&material.diffuse, "color_diffuse");
                color(&material.specular, "color_specular");
            }

            meshes.push(Mesh {
                vertex_array: VertexArray::indexed(vertices, indices),
                textures,
                material_colors,
            });
        }

        let centroid = if position_count > 0 {
            position_sum / position_count as f32
        } else {
            Vec3::zero()
        };
        debug!(
            "loaded model {}: {} meshes, {} vertices",
            path.display(),
            meshes.len(),
            position_count,
        );

        Ok(Self { transform: Mat4::identity(), meshes, centroid, aabb_min, aabb_max })
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Mean of every vertex position, handy for centring a model.
    pub fn centroid(&self) -> Vec3<f32> {
        self.centroid
    }

    /// Axis-aligned bounds of the geometry as `(min, max)`.
    pub fn aabb(&self) -> (Vec3<f32>, Vec3<f32>) {
        (self.aabb_min, self.aabb_max)
    }

    /// Draw every mesh with the model transform.
    pub fn draw(&self, device: &mut RenderDevice, framebuffer: &mut FrameBuffer) {
        for mesh in &self.meshes {
            mesh.draw(device, framebuffer, self.transform);
        }
    }
}

fn load_cached(
    cache: &mut FxHashMap<String, Arc<Texture>>,
    directory: &Path,
    file: &str,
) -> Option<Arc<Texture>> {
    if let Some(texture) = cache.get(file) {
        return Some(texture.clone());
    }
    let texture = Texture::load(directory.join(file), true, TextureFormat::LdrRgba).ok()?;
    let texture = Arc::new(texture);
    cache.insert(file.to_owned(), texture.clone());
    Some(texture)
}
