//! Line scan conversion.

use std::mem;

use crate::shader::{FsIn, VsOut};

use super::Fragment;

/// Bresenham scan conversion, interpolating attributes along the major
/// axis.
///
/// The span is normalised by swapping axes when it is steep and swapping
/// endpoints when it runs right-to-left; interpolation undoes the
/// endpoint swap so attributes always flow `vs → vt`.
pub(crate) fn emit(
    vs: &VsOut,
    vt: &VsOut,
    varying_count: usize,
    fsin: &mut Vec<FsIn>,
    fragments: &mut Vec<Fragment>,
) {
    let mut sx = vs.position.x.floor() as i32;
    let mut tx = vt.position.x.floor() as i32;
    let mut sy = vs.position.y.floor() as i32;
    let mut ty = vt.position.y.floor() as i32;

    let steep = (ty - sy).abs() > (tx - sx).abs();
    if steep {
        mem::swap(&mut sx, &mut sy);
        mem::swap(&mut tx, &mut ty);
    }
    let reverse = sx > tx;
    if reverse {
        mem::swap(&mut sx, &mut tx);
        mem::swap(&mut sy, &mut ty);
    }

    let dx = tx - sx;
    let dy = (ty - sy).abs();
    let mut error = dx / 2;
    let step_y = if ty < sy { -1 } else { 1 };

    let mut y = sy;
    for x in sx..=tx {
        // A zero-length span still yields its single fragment.
        let t = if dx == 0 { 0.0 } else { (x - sx) as f32 / dx as f32 };
        let v = VsOut::lerp2(vs, vt, if reverse { 1.0 - t } else { t }, varying_count);

        let (px, py) = if steep { (y, x) } else { (x, y) };
        fsin.push(FsIn::of(&v));
        fragments.push(Fragment::at(px, py, &v));

        error -= dy;
        if error < 0 {
            y += step_y;
            error += dx;
        }
    }
}
