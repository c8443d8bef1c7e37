//! A software rasterizer: a CPU-only 3D pipeline with programmable
//! vertex and fragment stages.
//!
//! A [`RenderDevice`] carries the fixed-function state, a string-keyed
//! uniform store and a bound [`ShaderProgram`]; each
//! [`draw`](RenderDevice::draw) call runs the full pipeline over a
//! [`VertexArray`]:
//!
//! - vertex shading into clip space
//! - primitive assembly (points, lines, strips, loops, triangles, fans,
//!   quads)
//! - homogeneous clipping against the six frustum planes
//! - perspective divide and viewport mapping
//! - back-face culling
//! - scan conversion with perspective-correct attribute interpolation
//! - optional early-Z, fragment shading, alpha/depth tests and the
//!   masked write-back into a [`FrameBuffer`]
//!
//! ```
//! use rastrum::*;
//! use vek::{Rgba, Vec4};
//!
//! struct Passthrough;
//! impl VertexShader for Passthrough {
//!     fn run(&self, input: &VsIn, output: &mut VsOut) {
//!         output.position = input.attributes[0];
//!     }
//! }
//!
//! struct Red;
//! impl FragmentShader for Red {
//!     fn run(&self, _input: &FsIn, output: &mut FsOut) {
//!         output.color = Rgba::new(1.0, 0.0, 0.0, 1.0);
//!     }
//! }
//!
//! let mut device = RenderDevice::new();
//! device.set_shader_program(ShaderProgram::new(Passthrough, Red, 0));
//!
//! let mut framebuffer = FrameBuffer::new(64, 64, ColorFormat::LdrRgb, DepthFormat::Float32);
//! framebuffer.clear_depth(f32::INFINITY);
//!
//! let triangle = VertexArray::new(vec![
//!     VsIn::new([Vec4::new(-1.0, -1.0, 0.5, 1.0)]),
//!     VsIn::new([Vec4::new(1.0, -1.0, 0.5, 1.0)]),
//!     VsIn::new([Vec4::new(0.0, 1.0, 0.5, 1.0)]),
//! ]);
//! device.draw(&mut framebuffer, &triangle);
//!
//! assert_eq!(framebuffer.get_color(32, 16).r, 1.0);
//! ```

mod clip;
mod primitives;

pub mod error;
pub mod framebuffer;
pub mod math;
#[cfg(feature = "obj")]
pub mod model;
pub mod pipeline;
pub mod rasterizer;
pub mod sampler;
pub mod shader;
pub mod states;
pub mod target;
pub mod texture;
pub mod uniform;

// Re-exports
pub use self::error::{TextureError, UniformTypeError};
pub use self::framebuffer::{ColorFormat, DepthFormat, FrameBuffer};
pub use self::pipeline::{RenderDevice, VertexArray};
pub use self::rasterizer::Fragment;
pub use self::sampler::TextureSampler;
pub use self::shader::{
    FragmentShader, FsIn, FsOut, ShaderProgram, VertexShader, VsIn, VsOut, MAX_VARYINGS,
};
pub use self::states::{
    CullMode, PointStyle, PolygonMode, PrimitiveMode, RenderStates, Viewport, Winding,
};
pub use self::target::{PpmTarget, RenderTarget};
pub use self::texture::{SampleMode, Texture, TextureFormat, WrapMode};
pub use self::uniform::{Uniform, UniformValue, Uniforms};

#[cfg(feature = "obj")]
pub use self::error::ModelError;
#[cfg(feature = "obj")]
pub use self::model::{Mesh, Model, ModelTexture};
