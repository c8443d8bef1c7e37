//! Homogeneous clipping against the six frustum planes.
//!
//! Clipping runs in clip space, before the perspective divide, so the
//! plane tests and intersection ratios are all expressed against `w`.
//! Culled primitives stay in their buffers with the `culled` flag set;
//! split primitives are appended at the end.

use vek::Vec4;

use crate::math::EPS;
use crate::primitives::{Line, Point, Triangle};
use crate::shader::VsOut;

/// One of the six clip-space planes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ClipPlane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Whether `p` lies on the visible side of the plane.
    ///
    /// The near test rejects at `z < ε` rather than `z < -w`, which
    /// pushes the effective near boundary to where clip z crosses zero
    /// and keeps `1/w` finite for everything that survives.
    #[inline]
    pub fn contains(self, p: Vec4<f32>) -> bool {
        match self {
            ClipPlane::Left => p.x >= -p.w,
            ClipPlane::Right => p.x <= p.w,
            ClipPlane::Bottom => p.y >= -p.w,
            ClipPlane::Top => p.y <= p.w,
            ClipPlane::Near => {
                if p.w > 0.0 {
                    p.z >= EPS
                } else {
                    p.z <= EPS
                }
            }
            ClipPlane::Far => {
                if p.w > 0.0 {
                    p.z <= p.w
                } else {
                    p.z >= p.w
                }
            }
        }
    }

    /// Ratio along `a → b` at which the segment crosses the plane.
    #[inline]
    pub fn intersection(self, a: Vec4<f32>, b: Vec4<f32>) -> f32 {
        match self {
            ClipPlane::Left => (a.x + a.w) / (a.x + a.w - b.x - b.w),
            ClipPlane::Right => (a.x - a.w) / (a.x - a.w - b.x + b.w),
            ClipPlane::Bottom => (a.y + a.w) / (a.y + a.w - b.y - b.w),
            ClipPlane::Top => (a.y - a.w) / (a.y - a.w - b.y + b.w),
            ClipPlane::Near => (a.z - EPS) / (a.z - b.z),
            ClipPlane::Far => (a.z - a.w) / (a.z - a.w - b.z + b.w),
        }
    }
}

/// Cull every point lying outside any plane.
pub(crate) fn clip_points(points: &mut [Point]) {
    for point in points {
        if ClipPlane::ALL.iter().any(|plane| !plane.contains(point.v.position)) {
            point.culled = true;
        }
    }
}

/// Clip lines plane by plane, replacing crossing lines with their inside
/// portion.
pub(crate) fn clip_lines(lines: &mut Vec<Line>, varying_count: usize) {
    for plane in ClipPlane::ALL {
        let n = lines.len();
        for i in 0..n {
            if lines[i].culled {
                continue;
            }
            let [a, b] = lines[i].v;
            let a_in = plane.contains(a.position);
            let b_in = plane.contains(b.position);

            if !a_in && !b_in {
                lines[i].culled = true;
            } else if a_in != b_in {
                lines[i].culled = true;
                let t = plane.intersection(a.position, b.position);
                let v = VsOut::lerp2(&a, &b, t, varying_count);
                lines.push(if a_in {
                    Line { v: [a, v], culled: false }
                } else {
                    Line { v: [v, b], culled: false }
                });
            }
        }
    }
}

/// Clip triangles plane by plane. A crossing triangle is culled and
/// replaced by one or two triangles covering its inside portion, with
/// the vertex order adjusted so the winding is preserved.
pub(crate) fn clip_triangles(triangles: &mut Vec<Triangle>, varying_count: usize) {
    for plane in ClipPlane::ALL {
        let n = triangles.len();
        for i in 0..n {
            if triangles[i].culled {
                continue;
            }
            let v = triangles[i].v;

            let mut inside = [0usize; 3];
            let mut in_count = 0;
            let mut outside = [0usize; 3];
            let mut out_count = 0;
            for (j, vert) in v.iter().enumerate() {
                if plane.contains(vert.position) {
                    inside[in_count] = j;
                    in_count += 1;
                } else {
                    outside[out_count] = j;
                    out_count += 1;
                }
            }

            match out_count {
                0 => {}
                3 => triangles[i].culled = true,
                // One survivor: a single smaller triangle.
                2 => {
                    triangles[i].culled = true;
                    let keep = v[inside[0]];
                    let t0 = plane.intersection(keep.position, v[outside[0]].position);
                    let t1 = plane.intersection(keep.position, v[outside[1]].position);
                    let a = VsOut::lerp2(&keep, &v[outside[0]], t0, varying_count);
                    let b = VsOut::lerp2(&keep, &v[outside[1]], t1, varying_count);

                    let mut triangle = Triangle { v: [keep, a, b], culled: false };
                    if inside[0] == 1 {
                        triangle.reverse_winding();
                    }
                    triangles.push(triangle);
                }
                // One ejected: the surviving quad splits into two.
                1 => {
                    triangles[i].culled = true;
                    let out_v = v[outside[0]];
                    let t0 = plane.intersection(v[inside[0]].position, out_v.position);
                    let t1 = plane.intersection(v[inside[1]].position, out_v.position);
                    let a = VsOut::lerp2(&v[inside[0]], &out_v, t0, varying_count);
                    let b = VsOut::lerp2(&v[inside[1]], &out_v, t1, varying_count);

                    let mut first = Triangle { v: [v[inside[0]], v[inside[1]], a], culled: false };
                    let mut second = Triangle { v: [v[inside[1]], b, a], culled: false };
                    if outside[0] == 1 {
                        first.reverse_winding();
                        second.reverse_winding();
                    }
                    triangles.push(first);
                    triangles.push(second);
                }
                _ => unreachable!(),
            }
        }
    }
}
