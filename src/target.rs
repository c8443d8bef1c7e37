//! Render-target facades over a framebuffer.

use std::fs::File;
use std::io::{self, BufWriter};
use std::ops::{Deref, DerefMut};
use std::path::Path;

use vek::Rgba;

use crate::framebuffer::{ColorFormat, DepthFormat, FrameBuffer};
#[cfg(feature = "obj")]
use crate::model::Model;
use crate::pipeline::{RenderDevice, VertexArray};

/// Owns a framebuffer and forwards draw calls into it.
pub struct RenderTarget {
    framebuffer: FrameBuffer,
}

impl RenderTarget {
    pub fn new(framebuffer: FrameBuffer) -> Self {
        Self { framebuffer }
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    /// Clear the colour plane and reset depth to `+∞`, so that any
    /// rendered depth wins the less-or-equal test.
    pub fn clear(&mut self, color: Rgba<f32>) {
        self.framebuffer.clear_color(color);
        self.framebuffer.clear_depth(f32::INFINITY);
    }

    /// Draw a vertex array into this target through `device`.
    pub fn draw(&mut self, device: &mut RenderDevice, vertices: &VertexArray) {
        device.draw(&mut self.framebuffer, vertices);
    }

    /// Draw every mesh of a model into this target through `device`.
    #[cfg(feature = "obj")]
    pub fn draw_model(&mut self, device: &mut RenderDevice, model: &Model) {
        model.draw(device, &mut self.framebuffer);
    }
}

/// An offline render target that saves frames as plain ASCII PPM.
pub struct PpmTarget {
    target: RenderTarget,
}

impl PpmTarget {
    /// An LDR target with a depth plane, ready for depth-tested draws.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            target: RenderTarget::new(FrameBuffer::new(
                width,
                height,
                ColorFormat::LdrRgb,
                DepthFormat::Float32,
            )),
        }
    }

    /// Write the current frame to `path` as `P3` PPM.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        self.target.framebuffer().write_ppm(BufWriter::new(file))
    }
}

impl Deref for PpmTarget {
    type Target = RenderTarget;

    fn deref(&self) -> &RenderTarget {
        &self.target
    }
}

impl DerefMut for PpmTarget {
    fn deref_mut(&mut self) -> &mut RenderTarget {
        &mut self.target
    }
}
