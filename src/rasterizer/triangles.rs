//! Triangle scan conversion.

use vek::Vec2;

use crate::math::area;
use crate::shader::{FsIn, VsOut};

use super::Fragment;

/// Barycentric fill over the triangle's screen bounding box.
///
/// Every attribute, position included, is combined with the same screen
/// barycentrics; the varyings are already divided by `w` at this stage,
/// so the combination is the perspective-correct `attr/w` and the
/// fragment stage divides by the interpolated `1/w` to restore them.
pub(crate) fn emit(
    v0: &VsOut,
    v1: &VsOut,
    v2: &VsOut,
    varying_count: usize,
    fsin: &mut Vec<FsIn>,
    fragments: &mut Vec<Fragment>,
) {
    let p0 = Vec2::new(v0.position.x, v0.position.y);
    let p1 = Vec2::new(v1.position.x, v1.position.y);
    let p2 = Vec2::new(v2.position.x, v2.position.y);

    let s = area(p0, p1, p2);
    if s == 0.0 {
        // Degenerate triangles cover nothing.
        return;
    }

    let sx = p0.x.min(p1.x).min(p2.x).floor() as i32;
    let tx = p0.x.max(p1.x).max(p2.x).floor() as i32;
    let sy = p0.y.min(p1.y).min(p2.y).floor() as i32;
    let ty = p0.y.max(p1.y).max(p2.y).floor() as i32;

    for y in sy..=ty {
        for x in sx..=tx {
            let pt = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            let t0 = area(pt, p1, p2) / s;
            let t1 = area(pt, p2, p0) / s;
            let t2 = area(pt, p0, p1) / s;
            if t0 < 0.0 || t1 < 0.0 || t2 < 0.0 {
                continue;
            }

            let v = VsOut::lerp3(v0, v1, v2, t0, t1, t2, varying_count);

            fsin.push(FsIn::of(&v));
            fragments.push(Fragment::at(x, y, &v));
        }
    }
}
