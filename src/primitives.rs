//! Primitive records assembled from the index stream.
//!
//! Assembly copies shaded vertices out of the vertex-shader output
//! buffer into per-primitive records that clipping can cull, split and
//! extend without touching the originals.

use crate::shader::VsOut;
use crate::states::PrimitiveMode;

/// A point primitive in flight through the pipeline.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Point {
    pub v: VsOut,
    pub culled: bool,
}

/// A line primitive in flight through the pipeline.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Line {
    pub v: [VsOut; 2],
    pub culled: bool,
}

/// A triangle primitive in flight through the pipeline.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Triangle {
    pub v: [VsOut; 3],
    pub culled: bool,
}

impl Triangle {
    /// Swap the leading vertices, flipping the winding.
    pub fn reverse_winding(&mut self) {
        self.v.swap(0, 1);
    }
}

pub(crate) fn assemble_points(vsout: &[VsOut], indices: &[usize], out: &mut Vec<Point>) {
    for &i in indices {
        out.push(Point { v: vsout[i], culled: false });
    }
}

pub(crate) fn assemble_lines(
    mode: PrimitiveMode,
    vsout: &[VsOut],
    indices: &[usize],
    out: &mut Vec<Line>,
) {
    let mut push = |a: usize, b: usize| {
        out.push(Line { v: [vsout[a], vsout[b]], culled: false });
    };
    match mode {
        PrimitiveMode::Lines => {
            for pair in indices.chunks_exact(2) {
                push(pair[0], pair[1]);
            }
        }
        PrimitiveMode::LineStrip => {
            for i in 1..indices.len() {
                push(indices[i - 1], indices[i]);
            }
        }
        PrimitiveMode::LineLoop => {
            if indices.len() >= 2 {
                for i in 0..indices.len() {
                    push(indices[i], indices[(i + 1) % indices.len()]);
                }
            }
        }
        _ => unreachable!("not a line mode: {:?}", mode),
    }
}

pub(crate) fn assemble_triangles(
    mode: PrimitiveMode,
    vsout: &[VsOut],
    indices: &[usize],
    out: &mut Vec<Triangle>,
) {
    let tri = |a: usize, b: usize, c: usize| Triangle {
        v: [vsout[a], vsout[b], vsout[c]],
        culled: false,
    };
    match mode {
        PrimitiveMode::Triangles => {
            for chunk in indices.chunks_exact(3) {
                out.push(tri(chunk[0], chunk[1], chunk[2]));
            }
        }
        PrimitiveMode::TriangleStrip => {
            for i in 2..indices.len() {
                let mut triangle = tri(indices[i - 2], indices[i - 1], indices[i]);
                // Every other strip triangle has reversed winding.
                if i & 1 == 1 {
                    triangle.reverse_winding();
                }
                out.push(triangle);
            }
        }
        PrimitiveMode::TriangleFan => {
            let mut i = 0;
            while i + 2 < indices.len() {
                out.push(tri(indices[0], indices[i + 1], indices[i + 2]));
                i += 1;
            }
        }
        PrimitiveMode::Quads => {
            for chunk in indices.chunks_exact(4) {
                out.push(tri(chunk[0], chunk[1], chunk[2]));
                out.push(tri(chunk[0], chunk[2], chunk[3]));
            }
        }
        _ => unreachable!("not a triangle mode: {:?}", mode),
    }
}
