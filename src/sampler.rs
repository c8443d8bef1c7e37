//! Shared texture handles for material parameters.

use std::sync::Arc;

use vek::Rgba;

use crate::math::color;
use crate::texture::Texture;

/// Samples a shared [`Texture`], or yields a fixed fallback colour when
/// no texture is attached.
///
/// Samplers are what shaders receive through the uniform store: cheap to
/// clone, and always safe to sample.
#[derive(Clone, Debug)]
pub struct TextureSampler {
    texture: Option<Arc<Texture>>,
    fallback: Rgba<f32>,
}

impl TextureSampler {
    /// A sampler over a shared texture.
    pub fn new(texture: Arc<Texture>) -> Self {
        Self { texture: Some(texture), fallback: color::TRANSPARENT }
    }

    /// A sampler with no texture that always yields `fallback`.
    pub fn fallback(fallback: Rgba<f32>) -> Self {
        Self { texture: None, fallback }
    }

    /// Whether no texture is attached.
    pub fn is_empty(&self) -> bool {
        self.texture.is_none()
    }

    /// Sample at the normalised coordinates `(u, v)`.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Rgba<f32> {
        match &self.texture {
            Some(texture) => texture.sample(u, v),
            None => self.fallback,
        }
    }
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self::fallback(color::TRANSPARENT)
    }
}
