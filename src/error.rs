//! Error types for recoverable failures.
//!
//! Programmer errors (drawing with no shader program bound, enabling
//! early-Z without a depth plane) are not represented here; those fail
//! loudly with a panic at the call site.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or save a [`Texture`](crate::texture::Texture).
#[derive(Debug, Error)]
pub enum TextureError {
    /// The file could not be opened or written.
    #[error("io error on texture `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but its contents could not be decoded or encoded.
    #[cfg(feature = "image")]
    #[error("failed to decode texture `{}`", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The texture holds no pixel data.
    #[error("texture `{}` has no pixel data", path.display())]
    Empty { path: PathBuf },
}

/// Failure to import a [`Model`](crate::model::Model).
#[cfg(feature = "obj")]
#[derive(Debug, Error)]
pub enum ModelError {
    /// The OBJ file (or one of its MTL companions) failed to parse.
    #[error("failed to load model `{}`", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}

/// A uniform was read with a type other than the stored one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("uniform `{name}` holds a {stored}, not a {requested}")]
pub struct UniformTypeError {
    /// Name the uniform was stored under.
    pub name: String,
    /// Kind of the stored value.
    pub stored: &'static str,
    /// Kind the caller asked for.
    pub requested: &'static str,
}
