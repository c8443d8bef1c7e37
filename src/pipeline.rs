//! The pipeline driver: from vertex stream to framebuffer writes.
//!
//! A draw call runs the stages strictly in order: vertex shading,
//! primitive assembly, homogeneous clipping, perspective divide and
//! viewport mapping, back-face culling, scan conversion, early-Z,
//! fragment shading, then the fragment tests and write-back. Fragments
//! of lower-indexed primitives are written first and the last colour
//! write wins; there is no blending.

use log::trace;
use vek::Vec2;

use crate::clip;
use crate::framebuffer::{DepthFormat, FrameBuffer};
use crate::math::sign;
use crate::primitives::{self, Line, Point, Triangle};
use crate::rasterizer::{lines, points, triangles, Fragment};
use crate::shader::{FsIn, FsOut, ShaderProgram, VsIn, VsOut, MAX_VARYINGS};
use crate::states::{CullMode, PolygonMode, PrimitiveMode, RenderStates, Viewport, Winding};
use crate::uniform::{UniformValue, Uniforms};

/// A vertex stream plus an optional index stream.
#[derive(Clone, Debug, Default)]
pub struct VertexArray {
    pub vertices: Vec<VsIn>,
    /// Indices into `vertices`; an empty list stands for `0..n`.
    pub indices: Vec<usize>,
}

impl VertexArray {
    /// A non-indexed vertex stream.
    pub fn new(vertices: Vec<VsIn>) -> Self {
        Self { vertices, indices: Vec::new() }
    }

    /// An indexed vertex stream.
    pub fn indexed(vertices: Vec<VsIn>, indices: Vec<usize>) -> Self {
        Self { vertices, indices }
    }
}

/// The rasterization device: fixed-function state, uniform store, bound
/// shader program, and the scratch buffers a draw call flows through.
///
/// Scratch buffers are cleared, not freed, at the start of each draw so
/// repeated draws do not reallocate; a device must not be shared between
/// concurrent draws.
#[derive(Default)]
pub struct RenderDevice {
    states: RenderStates,
    uniforms: Uniforms,
    program: Option<ShaderProgram>,

    vsout_buffer: Vec<VsOut>,
    point_buffer: Vec<Point>,
    line_buffer: Vec<Line>,
    triangle_buffer: Vec<Triangle>,
    fsin_buffer: Vec<FsIn>,
    fragment_buffer: Vec<Fragment>,
    index_buffer: Vec<usize>,
}

impl RenderDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> &RenderStates {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut RenderStates {
        &mut self.states
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut Uniforms {
        &mut self.uniforms
    }

    /// Shorthand for `uniforms_mut().set(..)`.
    pub fn set_uniform<T: UniformValue>(&mut self, name: impl Into<String>, value: T) {
        self.uniforms.set(name, value);
    }

    /// Bind the shader program used by subsequent draws.
    ///
    /// # Panics
    ///
    /// When the program declares more varyings than [`MAX_VARYINGS`].
    pub fn set_shader_program(&mut self, program: ShaderProgram) {
        assert!(
            program.varying_count <= MAX_VARYINGS,
            "shader program declares {} varyings, limit is {}",
            program.varying_count,
            MAX_VARYINGS,
        );
        self.program = Some(program);
    }

    pub fn shader_program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    /// Release the memory retained by the scratch buffers.
    pub fn shrink_buffers(&mut self) {
        self.clear_buffers();
        self.vsout_buffer.shrink_to_fit();
        self.point_buffer.shrink_to_fit();
        self.line_buffer.shrink_to_fit();
        self.triangle_buffer.shrink_to_fit();
        self.fsin_buffer.shrink_to_fit();
        self.fragment_buffer.shrink_to_fit();
        self.index_buffer.shrink_to_fit();
    }

    /// Run the full pipeline for one vertex array.
    ///
    /// # Panics
    ///
    /// When no shader program is bound, or when a depth test is enabled
    /// against a framebuffer without a depth plane.
    pub fn draw(&mut self, framebuffer: &mut FrameBuffer, vertex_array: &VertexArray) {
        assert!(self.program.is_some(), "draw issued with no shader program bound");

        let mut viewport = self.states.viewport;
        if viewport.w == 0 {
            viewport.w = framebuffer.width() as i32;
            viewport.h = framebuffer.height() as i32;
        }

        self.clear_buffers();

        self.index_buffer.clear();
        if vertex_array.indices.is_empty() {
            self.index_buffer.extend(0..vertex_array.vertices.len());
        } else {
            self.index_buffer.extend_from_slice(&vertex_array.indices);
        }

        self.run_vertex_shader(&vertex_array.vertices);

        let varying_count = self.program.as_ref().unwrap().varying_count;
        let mode = self.states.primitive_mode;
        match mode {
            PrimitiveMode::Points => {
                primitives::assemble_points(
                    &self.vsout_buffer,
                    &self.index_buffer,
                    &mut self.point_buffer,
                );
                clip::clip_points(&mut self.point_buffer);
                self.to_viewport(viewport, varying_count);
                self.rasterize_points();
            }
            PrimitiveMode::Lines | PrimitiveMode::LineStrip | PrimitiveMode::LineLoop => {
                primitives::assemble_lines(
                    mode,
                    &self.vsout_buffer,
                    &self.index_buffer,
                    &mut self.line_buffer,
                );
                clip::clip_lines(&mut self.line_buffer, varying_count);
                self.to_viewport(viewport, varying_count);
                self.rasterize_lines(varying_count);
            }
            PrimitiveMode::Triangles
            | PrimitiveMode::TriangleStrip
            | PrimitiveMode::TriangleFan
            | PrimitiveMode::Quads => {
                primitives::assemble_triangles(
                    mode,
                    &self.vsout_buffer,
                    &self.index_buffer,
                    &mut self.triangle_buffer,
                );
                clip::clip_triangles(&mut self.triangle_buffer, varying_count);
                self.to_viewport(viewport, varying_count);
                self.face_culling();
                self.rasterize_triangles(varying_count);
            }
        }

        self.early_z(framebuffer);
        self.run_fragment_shader();
        self.fragment_test(framebuffer);
        self.post_processing(framebuffer);

        trace!(
            "draw: {} vertices -> {} fragments",
            vertex_array.vertices.len(),
            self.fragment_buffer.len(),
        );
    }

    fn clear_buffers(&mut self) {
        self.vsout_buffer.clear();
        self.point_buffer.clear();
        self.line_buffer.clear();
        self.triangle_buffer.clear();
        self.fsin_buffer.clear();
        self.fragment_buffer.clear();
    }

    fn run_vertex_shader(&mut self, vertices: &[VsIn]) {
        let program = self.program.as_mut().unwrap();
        program.vertex.load_uniforms(&self.uniforms);
        for vsin in vertices {
            let mut out = VsOut::default();
            program.vertex.run(vsin, &mut out);
            self.vsout_buffer.push(out);
        }
    }

    /// Perspective divide plus NDC → viewport mapping.
    ///
    /// Varyings come out divided by `w` (perspective-correct
    /// coordinates) and `position.w` is replaced by `1/w`.
    fn to_viewport(&mut self, viewport: Viewport, varying_count: usize) {
        for point in &mut self.point_buffer {
            vsout_to_viewport(&mut point.v, viewport, varying_count);
        }
        for line in &mut self.line_buffer {
            for v in &mut line.v {
                vsout_to_viewport(v, viewport, varying_count);
            }
        }
        for triangle in &mut self.triangle_buffer {
            for v in &mut triangle.v {
                vsout_to_viewport(v, viewport, varying_count);
            }
        }
    }

    fn face_culling(&mut self) {
        if self.states.cull_mode == CullMode::None {
            return;
        }
        // The effective front order; culling front faces is the same as
        // culling back faces with the opposite winding.
        let mut front = self.states.front_winding;
        if self.states.cull_mode == CullMode::Front {
            front = front.flipped();
        }
        for triangle in &mut self.triangle_buffer {
            if triangle.culled {
                continue;
            }
            let [v0, v1, v2] = &triangle.v;
            let d1 = Vec2::new(v1.position.x - v0.position.x, v1.position.y - v0.position.y);
            let d2 = Vec2::new(v2.position.x - v1.position.x, v2.position.y - v1.position.y);
            let s = d1.x * d2.y - d1.y * d2.x;
            let cull = match front {
                Winding::Ccw => sign(s) < 0,
                Winding::Cw => sign(s) > 0,
            };
            if cull {
                triangle.culled = true;
            }
        }
    }

    fn rasterize_points(&mut self) {
        for point in &self.point_buffer {
            if point.culled {
                continue;
            }
            points::emit(
                &point.v,
                self.states.point_size,
                self.states.point_style,
                &mut self.fsin_buffer,
                &mut self.fragment_buffer,
            );
        }
    }

    fn rasterize_lines(&mut self, varying_count: usize) {
        for line in &self.line_buffer {
            if line.culled {
                continue;
            }
            match self.states.polygon_mode {
                PolygonMode::Point => {
                    for v in &line.v {
                        points::emit(
                            v,
                            self.states.point_size,
                            self.states.point_style,
                            &mut self.fsin_buffer,
                            &mut self.fragment_buffer,
                        );
                    }
                }
                _ => lines::emit(
                    &line.v[0],
                    &line.v[1],
                    varying_count,
                    &mut self.fsin_buffer,
                    &mut self.fragment_buffer,
                ),
            }
        }
    }

    fn rasterize_triangles(&mut self, varying_count: usize) {
        for triangle in &self.triangle_buffer {
            if triangle.culled {
                continue;
            }
            let [v0, v1, v2] = &triangle.v;
            match self.states.polygon_mode {
                PolygonMode::Point => {
                    for v in &triangle.v {
                        points::emit(
                            v,
                            self.states.point_size,
                            self.states.point_style,
                            &mut self.fsin_buffer,
                            &mut self.fragment_buffer,
                        );
                    }
                }
                PolygonMode::Wireframe => {
                    for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
                        lines::emit(
                            a,
                            b,
                            varying_count,
                            &mut self.fsin_buffer,
                            &mut self.fragment_buffer,
                        );
                    }
                }
                PolygonMode::Fill => triangles::emit(
                    v0,
                    v1,
                    v2,
                    varying_count,
                    &mut self.fsin_buffer,
                    &mut self.fragment_buffer,
                ),
            }
        }
    }

    /// Depth test ahead of fragment shading; losing fragments are
    /// discarded before their shader ever runs.
    fn early_z(&mut self, framebuffer: &mut FrameBuffer) {
        if !(self.states.depth_test && self.states.early_z_test) {
            return;
        }
        assert!(
            framebuffer.depth_format() != DepthFormat::None,
            "early-Z requires a framebuffer with a depth plane",
        );
        let (w, h) = (framebuffer.width() as i32, framebuffer.height() as i32);
        for fragment in &mut self.fragment_buffer {
            if fragment.x < 0 || fragment.y < 0 || fragment.x >= w || fragment.y >= h {
                continue;
            }
            let (x, y) = (fragment.x as usize, fragment.y as usize);
            if fragment.depth <= framebuffer.get_depth(x, y) {
                if !self.states.depth_mask {
                    framebuffer.set_depth(x, y, fragment.depth);
                }
            } else {
                fragment.discarded = true;
            }
        }
    }

    fn run_fragment_shader(&mut self) {
        let program = self.program.as_mut().unwrap();
        let varying_count = program.varying_count;

        // Multiply the varyings back by w to restore perspective-correct
        // values before shading.
        for (fsin, fragment) in self.fsin_buffer.iter_mut().zip(&self.fragment_buffer) {
            for i in 0..varying_count {
                fsin.varyings[i] /= fragment.inv_w;
            }
        }

        program.fragment.load_uniforms(&self.uniforms);
        for (fsin, fragment) in self.fsin_buffer.iter().zip(&mut self.fragment_buffer) {
            let mut out = FsOut::default();
            program.fragment.run(fsin, &mut out);
            fragment.color = out.color;
            fragment.discarded |= out.discarded;
        }
    }

    /// Alpha test, late depth test, and the masked colour/depth writes.
    fn fragment_test(&mut self, framebuffer: &mut FrameBuffer) {
        let late_depth = self.states.depth_test && !self.states.early_z_test;
        if late_depth {
            assert!(
                framebuffer.depth_format() != DepthFormat::None,
                "depth test requires a framebuffer with a depth plane",
            );
        }
        let (w, h) = (framebuffer.width() as i32, framebuffer.height() as i32);
        for fragment in &self.fragment_buffer {
            if fragment.discarded {
                continue;
            }
            if fragment.x < 0 || fragment.y < 0 || fragment.x >= w || fragment.y >= h {
                continue;
            }
            if self.states.alpha_test && fragment.color.a < self.states.alpha_test_threshold {
                continue;
            }
            let (x, y) = (fragment.x as usize, fragment.y as usize);
            if late_depth {
                if fragment.depth <= framebuffer.get_depth(x, y) {
                    if !self.states.depth_mask {
                        framebuffer.set_depth(x, y, fragment.depth);
                    }
                    if !self.states.color_mask {
                        framebuffer.set_color(x, y, fragment.color);
                    }
                }
            } else if !self.states.color_mask {
                framebuffer.set_color(x, y, fragment.color);
            }
        }
    }

    /// Reserved whole-frame stage; runs after write-back and currently
    /// has no effect.
    fn post_processing(&mut self, _framebuffer: &mut FrameBuffer) {}
}

fn vsout_to_viewport(v: &mut VsOut, viewport: Viewport, varying_count: usize) {
    let w = v.position.w;
    for i in 0..varying_count {
        v.varyings[i] /= w;
    }
    v.position.x /= w;
    v.position.y /= w;
    v.position.z /= w;
    v.position.w = 1.0 / w;

    v.position.x = (v.position.x + 1.0) * viewport.w as f32 * 0.5 + viewport.x as f32;
    v.position.y = (v.position.y + 1.0) * viewport.h as f32 * 0.5 + viewport.y as f32;
}
