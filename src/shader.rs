//! The programmable stages and the data that flows between them.

use vek::{Rgba, Vec4};

use crate::math::color;
use crate::uniform::Uniforms;

/// Maximum number of 4-component attribute/varying slots per vertex.
pub const MAX_VARYINGS: usize = 5;

/// A vertex as fed to the vertex shader: a fixed set of attribute slots
/// whose meaning (position, texcoord, normal, ...) is a convention
/// between the caller and the shader.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VsIn {
    pub attributes: [Vec4<f32>; MAX_VARYINGS],
}

impl VsIn {
    /// Build a vertex from its leading attributes; the rest stay zeroed.
    ///
    /// # Panics
    ///
    /// When more than [`MAX_VARYINGS`] attributes are given.
    pub fn new<const N: usize>(attributes: [Vec4<f32>; N]) -> Self {
        let mut vsin = Self::default();
        vsin.attributes[..N].copy_from_slice(&attributes);
        vsin
    }
}

/// Vertex shader output: a clip-space position plus the varyings carried
/// towards the fragment stage.
///
/// Varyings hold plain per-vertex values up to and including clipping.
/// The viewport stage rescales them by `1/w`, and the fragment stage
/// multiplies them back just before shading.
#[derive(Copy, Clone, Debug, Default)]
pub struct VsOut {
    pub position: Vec4<f32>,
    pub varyings: [Vec4<f32>; MAX_VARYINGS],
}

impl VsOut {
    /// Linear blend of two vertices at ratio `t`; only the first
    /// `varying_count` varyings participate.
    #[inline]
    pub(crate) fn lerp2(a: &VsOut, b: &VsOut, t: f32, varying_count: usize) -> VsOut {
        let mut out = VsOut::default();
        out.position = a.position + (b.position - a.position) * t;
        for i in 0..varying_count {
            out.varyings[i] = a.varyings[i] + (b.varyings[i] - a.varyings[i]) * t;
        }
        out
    }

    /// Barycentric combination of three vertices.
    #[inline]
    pub(crate) fn lerp3(
        a: &VsOut,
        b: &VsOut,
        c: &VsOut,
        ta: f32,
        tb: f32,
        tc: f32,
        varying_count: usize,
    ) -> VsOut {
        let mut out = VsOut::default();
        out.position = a.position * ta + b.position * tb + c.position * tc;
        for i in 0..varying_count {
            out.varyings[i] = a.varyings[i] * ta + b.varyings[i] * tb + c.varyings[i] * tc;
        }
        out
    }
}

/// Fragment shader input: the interpolated varyings for one fragment.
#[derive(Copy, Clone, Debug, Default)]
pub struct FsIn {
    pub varyings: [Vec4<f32>; MAX_VARYINGS],
}

impl FsIn {
    #[inline]
    pub(crate) fn of(v: &VsOut) -> Self {
        Self { varyings: v.varyings }
    }
}

/// Fragment shader output.
#[derive(Copy, Clone, Debug)]
pub struct FsOut {
    pub color: Rgba<f32>,
    /// Raised by the shader to drop the fragment entirely.
    pub discarded: bool,
}

impl Default for FsOut {
    fn default() -> Self {
        Self { color: color::TRANSPARENT, discarded: false }
    }
}

/// The per-vertex programmable stage.
///
/// `load_uniforms` runs once per draw call before any `run`, letting the
/// shader cache whatever it needs from the store. `run` must write
/// `output.position` in clip space along with any varyings it emits.
pub trait VertexShader {
    fn load_uniforms(&mut self, _uniforms: &Uniforms) {}

    fn run(&self, input: &VsIn, output: &mut VsOut);
}

/// The per-fragment programmable stage.
///
/// `run` must either write `output.color` or raise `output.discarded`.
pub trait FragmentShader {
    fn load_uniforms(&mut self, _uniforms: &Uniforms) {}

    fn run(&self, input: &FsIn, output: &mut FsOut);
}

/// A vertex shader, a fragment shader and the number of varying slots
/// they agree to exchange.
pub struct ShaderProgram {
    pub vertex: Box<dyn VertexShader>,
    pub fragment: Box<dyn FragmentShader>,
    pub varying_count: usize,
}

impl ShaderProgram {
    /// # Panics
    ///
    /// When `varying_count` exceeds [`MAX_VARYINGS`].
    pub fn new(
        vertex: impl VertexShader + 'static,
        fragment: impl FragmentShader + 'static,
        varying_count: usize,
    ) -> Self {
        assert!(
            varying_count <= MAX_VARYINGS,
            "shader program declares {} varyings, limit is {}",
            varying_count,
            MAX_VARYINGS,
        );
        Self { vertex: Box::new(vertex), fragment: Box::new(fragment), varying_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct NoopVs;
    impl VertexShader for NoopVs {
        fn run(&self, input: &VsIn, output: &mut VsOut) {
            output.position = input.attributes[0];
        }
    }

    struct NoopFs;
    impl FragmentShader for NoopFs {
        fn run(&self, _input: &FsIn, output: &mut FsOut) {
            output.color = color::WHITE;
        }
    }

    #[test]
    fn lerp2_blends_position_and_active_varyings() {
        let mut a = VsOut::default();
        a.position = Vec4::new(0.0, 0.0, 0.0, 1.0);
        a.varyings[0] = Vec4::new(1.0, 0.0, 0.0, 0.0);
        a.varyings[1] = Vec4::new(9.0, 9.0, 9.0, 9.0);
        let mut b = VsOut::default();
        b.position = Vec4::new(2.0, 4.0, 6.0, 1.0);
        b.varyings[0] = Vec4::new(0.0, 1.0, 0.0, 0.0);
        b.varyings[1] = Vec4::new(-9.0, -9.0, -9.0, -9.0);

        let mid = VsOut::lerp2(&a, &b, 0.5, 1);
        assert_relative_eq!(mid.position.x, 1.0);
        assert_relative_eq!(mid.position.y, 2.0);
        assert_relative_eq!(mid.varyings[0].x, 0.5);
        assert_relative_eq!(mid.varyings[0].y, 0.5);
        // Slot 1 is beyond the active count and must stay untouched.
        assert_relative_eq!(mid.varyings[1].x, 0.0);
    }

    #[test]
    fn lerp3_is_a_barycentric_sum() {
        let mut a = VsOut::default();
        a.position = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let mut b = VsOut::default();
        b.position = Vec4::new(0.0, 1.0, 0.0, 1.0);
        let mut c = VsOut::default();
        c.position = Vec4::new(0.0, 0.0, 1.0, 1.0);

        let p = VsOut::lerp3(&a, &b, &c, 0.25, 0.25, 0.5, 0);
        assert_relative_eq!(p.position.x, 0.25);
        assert_relative_eq!(p.position.y, 0.25);
        assert_relative_eq!(p.position.z, 0.5);
        assert_relative_eq!(p.position.w, 1.0);
    }

    #[test]
    fn vsin_new_fills_leading_slots() {
        let v = VsIn::new([Vec4::new(1.0, 2.0, 3.0, 4.0)]);
        assert_eq!(v.attributes[0], Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(v.attributes[1], Vec4::zero());
    }

    #[test]
    #[should_panic]
    fn program_rejects_too_many_varyings() {
        let _ = ShaderProgram::new(NoopVs, NoopFs, MAX_VARYINGS + 1);
    }
}
