//! 2D images and the filtering used to sample them.

use std::fmt;

use vek::Rgba;

use crate::math::color;

/// Storage format of a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8 bits per channel RGBA.
    LdrRgba,
    /// f32 per channel RGBA.
    HdrRgba,
}

/// Filtering applied by [`Texture::sample`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SampleMode {
    /// The texel under the sample point.
    Nearest,
    /// Linear blend of the 2×2 neighbourhood.
    Bilinear,
    /// Catmull-Rom blend of the 4×4 neighbourhood.
    Bicubic,
}

/// How out-of-range texel coordinates are brought back into the image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Tile the image.
    Repeat,
    /// Tile the image, mirroring every other repetition.
    MirroredRepeat,
    /// Saturate to the edge texels.
    ClampToEdge,
    /// Out-of-range reads yield transparent black.
    ClampToBorder,
}

/// A 2D RGBA image together with its wrap and filter configuration.
///
/// Textures are typically shared (`Arc<Texture>`) since several meshes
/// may reference the same image; see
/// [`TextureSampler`](crate::sampler::TextureSampler).
#[derive(Clone)]
pub struct Texture {
    width: i32,
    height: i32,
    ldr: Vec<u8>,
    hdr: Vec<f32>,
    format: TextureFormat,
    pub wrap_mode: WrapMode,
    pub sample_mode: SampleMode,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            ldr: Vec::new(),
            hdr: Vec::new(),
            format: TextureFormat::LdrRgba,
            wrap_mode: WrapMode::Repeat,
            sample_mode: SampleMode::Nearest,
        }
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("wrap_mode", &self.wrap_mode)
            .field("sample_mode", &self.sample_mode)
            .finish()
    }
}

/// Catmull-Rom weights for the four taps around a fractional offset `t`.
#[inline]
fn cubic_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (-t + 2.0 * t2 - t3),
        0.5 * (2.0 - 5.0 * t2 + 3.0 * t3),
        0.5 * (t + 4.0 * t2 - 3.0 * t3),
        0.5 * (-t2 + t3),
    ]
}

impl Texture {
    /// A zeroed `width` × `height` image.
    pub fn new(width: i32, height: i32, format: TextureFormat) -> Self {
        let len = (width * height * 4) as usize;
        Self {
            width,
            height,
            ldr: match format {
                TextureFormat::LdrRgba => vec![0; len],
                TextureFormat::HdrRgba => Vec::new(),
            },
            hdr: match format {
                TextureFormat::HdrRgba => vec![0.0; len],
                TextureFormat::LdrRgba => Vec::new(),
            },
            format,
            ..Self::default()
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Whether the texture holds no pixel data.
    pub fn is_empty(&self) -> bool {
        self.ldr.is_empty() && self.hdr.is_empty()
    }

    /// The raw LDR plane (8-bit RGBA, row-major), when the image has one.
    pub fn ldr_data(&self) -> Option<&[u8]> {
        match self.format {
            TextureFormat::LdrRgba => Some(&self.ldr),
            TextureFormat::HdrRgba => None,
        }
    }

    /// The raw HDR plane (f32 RGBA, row-major), when the image has one.
    pub fn hdr_data(&self) -> Option<&[f32]> {
        match self.format {
            TextureFormat::HdrRgba => Some(&self.hdr),
            TextureFormat::LdrRgba => None,
        }
    }

    #[inline]
    pub fn set_color(&mut self, x: i32, y: i32, color: Rgba<f32>) {
        let i = ((y * self.width + x) * 4) as usize;
        match self.format {
            TextureFormat::LdrRgba => {
                self.ldr[i] = (color.r * 255.0).clamp(0.0, 255.0) as u8;
                self.ldr[i + 1] = (color.g * 255.0).clamp(0.0, 255.0) as u8;
                self.ldr[i + 2] = (color.b * 255.0).clamp(0.0, 255.0) as u8;
                self.ldr[i + 3] = (color.a * 255.0).clamp(0.0, 255.0) as u8;
            }
            TextureFormat::HdrRgba => {
                self.hdr[i] = color.r;
                self.hdr[i + 1] = color.g;
                self.hdr[i + 2] = color.b;
                self.hdr[i + 3] = color.a;
            }
        }
    }

    /// Fetch the texel at `(x, y)`, applying the wrap mode when the
    /// coordinates fall outside the image. An empty texture reads as
    /// transparent black.
    pub fn get_color(&self, x: i32, y: i32) -> Rgba<f32> {
        if self.width == 0 || self.height == 0 {
            return color::TRANSPARENT;
        }
        let (w, h) = (self.width, self.height);
        let (mut x, mut y) = (x, y);
        if x < 0 || y < 0 || x >= w || y >= h {
            match self.wrap_mode {
                WrapMode::Repeat => {
                    x = x.rem_euclid(w);
                    y = y.rem_euclid(h);
                }
                WrapMode::MirroredRepeat => {
                    x = x.rem_euclid(2 * w);
                    y = y.rem_euclid(2 * h);
                    if x >= w {
                        x = 2 * w - x - 1;
                    }
                    if y >= h {
                        y = 2 * h - y - 1;
                    }
                }
                WrapMode::ClampToEdge => {
                    x = x.clamp(0, w - 1);
                    y = y.clamp(0, h - 1);
                }
                WrapMode::ClampToBorder => return color::TRANSPARENT,
            }
        }

        let i = ((y * w + x) * 4) as usize;
        match self.format {
            TextureFormat::LdrRgba => Rgba::new(
                self.ldr[i] as f32 / 255.0,
                self.ldr[i + 1] as f32 / 255.0,
                self.ldr[i + 2] as f32 / 255.0,
                self.ldr[i + 3] as f32 / 255.0,
            ),
            TextureFormat::HdrRgba => {
                Rgba::new(self.hdr[i], self.hdr[i + 1], self.hdr[i + 2], self.hdr[i + 3])
            }
        }
    }

    /// Sample the image at the normalised coordinates `(u, v)` using the
    /// configured [`SampleMode`].
    pub fn sample(&self, u: f32, v: f32) -> Rgba<f32> {
        let x = u * self.width as f32;
        let y = v * self.height as f32;

        match self.sample_mode {
            SampleMode::Nearest => self.get_color(x.floor() as i32, y.floor() as i32),
            SampleMode::Bilinear => {
                // Anchor on the texel whose centre sits lower-left of the
                // sample point.
                let lbx = (x - 0.5).floor();
                let lby = (y - 0.5).floor();
                let tx = x - (lbx + 0.5);
                let ty = y - (lby + 0.5);
                let (lbx, lby) = (lbx as i32, lby as i32);

                let c00 = self.get_color(lbx, lby);
                let c10 = self.get_color(lbx + 1, lby);
                let c01 = self.get_color(lbx, lby + 1);
                let c11 = self.get_color(lbx + 1, lby + 1);

                let c0 = c00 + (c10 - c00) * tx;
                let c1 = c01 + (c11 - c01) * tx;
                c0 + (c1 - c0) * ty
            }
            SampleMode::Bicubic => {
                let lbx = (x - 0.5).floor();
                let lby = (y - 0.5).floor();
                let wxs = cubic_weights(x - (lbx + 0.5));
                let wys = cubic_weights(y - (lby + 0.5));
                let (lbx, lby) = (lbx as i32, lby as i32);

                let mut out = color::TRANSPARENT;
                for (i, &wy) in wys.iter().enumerate() {
                    let mut row = color::TRANSPARENT;
                    for (j, &wx) in wxs.iter().enumerate() {
                        row += self.get_color(lbx + j as i32 - 1, lby + i as i32 - 1) * wx;
                    }
                    out += row * wy;
                }
                out
            }
        }
    }
}

#[cfg(feature = "image")]
mod io {
    use std::fs::File;
    use std::io::BufWriter;
    use std::path::Path;

    use log::error;

    use super::{Texture, TextureFormat};
    use crate::error::TextureError;

    impl Texture {
        /// Load an image file into a texture of the requested format.
        ///
        /// `flip` mirrors the image vertically so that the first row ends
        /// up at `v = 0`, matching the lower-left origin used everywhere
        /// else in the crate. Failures are logged and returned.
        pub fn load<P: AsRef<Path>>(
            path: P,
            flip: bool,
            format: TextureFormat,
        ) -> Result<Self, TextureError> {
            let path = path.as_ref();
            let img = image::open(path).map_err(|source| {
                error!("failed to load texture {}: {}", path.display(), source);
                TextureError::Image { path: path.to_owned(), source }
            })?;
            let img = if flip { img.flipv() } else { img };

            let tex = match format {
                TextureFormat::LdrRgba => {
                    let img = img.into_rgba8();
                    let (w, h) = img.dimensions();
                    Texture {
                        width: w as i32,
                        height: h as i32,
                        ldr: img.into_raw(),
                        format,
                        ..Texture::default()
                    }
                }
                TextureFormat::HdrRgba => {
                    let img = img.into_rgba32f();
                    let (w, h) = img.dimensions();
                    Texture {
                        width: w as i32,
                        height: h as i32,
                        hdr: img.into_raw(),
                        format,
                        ..Texture::default()
                    }
                }
            };
            Ok(tex)
        }

        /// Save the texture. LDR images pick their container from the file
        /// extension; HDR images are written as Radiance `.hdr`.
        pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TextureError> {
            let path = path.as_ref();
            if self.is_empty() {
                return Err(TextureError::Empty { path: path.to_owned() });
            }
            match self.format {
                TextureFormat::LdrRgba => image::save_buffer(
                    path,
                    &self.ldr,
                    self.width as u32,
                    self.height as u32,
                    image::ColorType::Rgba8,
                )
                .map_err(|source| {
                    error!("failed to save texture {}: {}", path.display(), source);
                    TextureError::Image { path: path.to_owned(), source }
                }),
                TextureFormat::HdrRgba => {
                    let file = File::create(path).map_err(|source| TextureError::Io {
                        path: path.to_owned(),
                        source,
                    })?;
                    let pixels: Vec<image::Rgb<f32>> = self
                        .hdr
                        .chunks_exact(4)
                        .map(|px| image::Rgb([px[0], px[1], px[2]]))
                        .collect();
                    image::codecs::hdr::HdrEncoder::new(BufWriter::new(file))
                        .encode(&pixels, self.width as usize, self.height as usize)
                        .map_err(|source| {
                            error!("failed to save texture {}: {}", path.display(), source);
                            TextureError::Image { path: path.to_owned(), source }
                        })
                }
            }
        }
    }
}
