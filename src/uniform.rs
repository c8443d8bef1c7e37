//! Named shader parameters, constant across a draw call.
//!
//! Values live in a closed [`Uniform`] enum rather than a type-erased
//! box, so a read with the wrong type is an ordinary, reportable mismatch
//! instead of undefined behaviour. Shaders are expected to read uniforms
//! once per draw in `load_uniforms` and cache what they need.

use fxhash::FxHashMap;
use log::warn;
use vek::{Mat3, Mat4, Rgba, Vec2, Vec3, Vec4};

use crate::error::UniformTypeError;
use crate::sampler::TextureSampler;

/// A value that can be stored in a [`Uniforms`] store.
#[derive(Clone, Debug)]
pub enum Uniform {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2<f32>),
    Vec3(Vec3<f32>),
    Vec4(Vec4<f32>),
    Rgba(Rgba<f32>),
    Mat3(Mat3<f32>),
    Mat4(Mat4<f32>),
    Sampler(TextureSampler),
}

impl Uniform {
    /// Human-readable kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Uniform::Bool(_) => "bool",
            Uniform::Int(_) => "int",
            Uniform::Float(_) => "float",
            Uniform::Vec2(_) => "vec2",
            Uniform::Vec3(_) => "vec3",
            Uniform::Vec4(_) => "vec4",
            Uniform::Rgba(_) => "rgba",
            Uniform::Mat3(_) => "mat3",
            Uniform::Mat4(_) => "mat4",
            Uniform::Sampler(_) => "sampler",
        }
    }
}

/// Conversion between Rust values and [`Uniform`] slots.
pub trait UniformValue: Sized {
    /// Kind name used in mismatch diagnostics.
    const KIND: &'static str;

    fn into_uniform(self) -> Uniform;

    /// `None` when the slot holds a different kind.
    fn from_uniform(uniform: &Uniform) -> Option<Self>;
}

macro_rules! impl_uniform_value {
    ($t:ty, $variant:ident, $kind:literal) => {
        impl UniformValue for $t {
            const KIND: &'static str = $kind;

            fn into_uniform(self) -> Uniform {
                Uniform::$variant(self)
            }

            fn from_uniform(uniform: &Uniform) -> Option<Self> {
                match uniform {
                    Uniform::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_uniform_value!(bool, Bool, "bool");
impl_uniform_value!(i32, Int, "int");
impl_uniform_value!(f32, Float, "float");
impl_uniform_value!(Vec2<f32>, Vec2, "vec2");
impl_uniform_value!(Vec3<f32>, Vec3, "vec3");
impl_uniform_value!(Vec4<f32>, Vec4, "vec4");
impl_uniform_value!(Rgba<f32>, Rgba, "rgba");
impl_uniform_value!(Mat3<f32>, Mat3, "mat3");
impl_uniform_value!(Mat4<f32>, Mat4, "mat4");
impl_uniform_value!(TextureSampler, Sampler, "sampler");

/// String-keyed uniform storage, queried by shaders during
/// `load_uniforms` and filled by whoever issues the draw.
#[derive(Clone, Debug, Default)]
pub struct Uniforms {
    values: FxHashMap<String, Uniform>,
}

impl Uniforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn set<T: UniformValue>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), value.into_uniform());
    }

    /// Read `name` as a `T`, falling back to `default` when the uniform
    /// is missing. A kind mismatch is logged and also yields the
    /// fallback; use [`Uniforms::try_get`] to observe it as an error.
    pub fn get<T: UniformValue>(&self, name: &str, default: T) -> T {
        match self.values.get(name) {
            None => default,
            Some(uniform) => match T::from_uniform(uniform) {
                Some(value) => value,
                None => {
                    warn!(
                        "uniform `{}` holds a {}, not a {}; using the fallback",
                        name,
                        uniform.kind(),
                        T::KIND,
                    );
                    default
                }
            },
        }
    }

    /// Read `name` as a `T`; `Ok(None)` when absent, an error when the
    /// stored kind differs.
    pub fn try_get<T: UniformValue>(&self, name: &str) -> Result<Option<T>, UniformTypeError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(uniform) => match T::from_uniform(uniform) {
                Some(value) => Ok(Some(value)),
                None => Err(UniformTypeError {
                    name: name.to_owned(),
                    stored: uniform.kind(),
                    requested: T::KIND,
                }),
            },
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Drop one uniform.
    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Drop every uniform.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
