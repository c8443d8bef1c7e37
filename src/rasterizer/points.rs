//! Point scan conversion.

use crate::shader::{FsIn, VsOut};
use crate::states::PointStyle;

use super::Fragment;

/// Emit the square (or inscribed disc) of pixels covering a point of
/// side `size` centred on the vertex.
pub(crate) fn emit(
    v: &VsOut,
    size: f32,
    style: PointStyle,
    fsin: &mut Vec<FsIn>,
    fragments: &mut Vec<Fragment>,
) {
    let sx = (v.position.x - size * 0.5).ceil() as i32;
    let tx = (v.position.x + size * 0.5).floor() as i32;
    let sy = (v.position.y - size * 0.5).ceil() as i32;
    let ty = (v.position.y + size * 0.5).floor() as i32;

    for x in sx..=tx {
        for y in sy..=ty {
            if let PointStyle::Circle = style {
                let dx = x as f32 + 0.5 - v.position.x;
                let dy = y as f32 + 0.5 - v.position.y;
                if dx * dx + dy * dy > size * size * 0.25 {
                    continue;
                }
            }

            fsin.push(FsIn::of(v));
            fragments.push(Fragment::at(x, y, v));
        }
    }
}
