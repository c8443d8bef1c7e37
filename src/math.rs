//! Mathematical support for the pipeline.
//!
//! The vector and matrix types come from [`vek`]; this module adds the
//! transform constructors and the couple of scalar helpers the rasterizer
//! needs. Matrices follow the column-vector convention throughout: a clip
//! position is `projection * view * model * position`.

pub use vek::{Mat3, Mat4, Rgba, Vec2, Vec3, Vec4};

/// Tolerance used by the near-plane clip test and sign comparisons.
pub const EPS: f32 = 1e-4;

/// Commonly used colours.
pub mod color {
    use vek::Rgba;

    pub const WHITE: Rgba<f32> = Rgba { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Rgba<f32> = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const RED: Rgba<f32> = Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const GREEN: Rgba<f32> = Rgba { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
    pub const BLUE: Rgba<f32> = Rgba { r: 0.0, g: 0.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Rgba<f32> = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
}

/// Sign of `x` with a small dead zone: `-1`, `0` or `1`.
#[inline]
pub fn sign(x: f32) -> i32 {
    if x < -EPS {
        -1
    } else {
        (x > EPS) as i32
    }
}

/// Signed doubled area of the triangle `a b c`. Positive when the
/// vertices wind counter-clockwise in a y-up plane.
#[inline]
pub fn area(a: Vec2<f32>, b: Vec2<f32>, c: Vec2<f32>) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Translation by `v`.
pub fn translate(v: Vec3<f32>) -> Mat4<f32> {
    Mat4::new(
        1.0, 0.0, 0.0, v.x,
        0.0, 1.0, 0.0, v.y,
        0.0, 0.0, 1.0, v.z,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Rotation of `rad` radians about `axis` (Rodrigues form; the axis is
/// normalised first).
pub fn rotate(rad: f32, axis: Vec3<f32>) -> Mat4<f32> {
    let a = axis.normalized();
    let (s, c) = rad.sin_cos();
    let omc = 1.0 - c;
    let (x, y, z) = (a.x, a.y, a.z);
    Mat4::new(
        x * x * omc + c,     x * y * omc - z * s, x * z * omc + y * s, 0.0,
        y * x * omc + z * s, y * y * omc + c,     y * z * omc - x * s, 0.0,
        z * x * omc - y * s, z * y * omc + x * s, z * z * omc + c,     0.0,
        0.0,                 0.0,                 0.0,                 1.0,
    )
}

/// Non-uniform scale by `v`.
pub fn scale(v: Vec3<f32>) -> Mat4<f32> {
    Mat4::new(
        v.x, 0.0, 0.0, 0.0,
        0.0, v.y, 0.0, 0.0,
        0.0, 0.0, v.z, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Right-handed view matrix looking from `eye` towards `center`.
pub fn look_at(eye: Vec3<f32>, center: Vec3<f32>, up: Vec3<f32>) -> Mat4<f32> {
    let f = (center - eye).normalized();
    let s = f.cross(up.normalized()).normalized();
    let u = s.cross(f);
    Mat4::new(
        s.x, s.y, s.z, -s.dot(eye),
        u.x, u.y, u.z, -u.dot(eye),
        -f.x, -f.y, -f.z, f.dot(eye),
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Right-handed perspective projection.
///
/// `fov` is the full vertical field of view in radians. Eye-space depth
/// `[-near, -far]` maps to clip `z ∈ [-w, +w]`; the pipeline's near clip
/// test rejects at `z < ε`, so the effective near boundary sits where
/// clip z crosses zero.
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Mat4<f32> {
    let f = 1.0 / (fov * 0.5).tan();
    Mat4::new(
        f / aspect, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, (far + near) / (near - far), 2.0 * far * near / (near - far),
        0.0, 0.0, -1.0, 0.0,
    )
}

/// Right-handed orthographic projection onto the given box.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4<f32> {
    Mat4::new(
        2.0 / (right - left), 0.0, 0.0, -(right + left) / (right - left),
        0.0, 2.0 / (top - bottom), 0.0, -(top + bottom) / (top - bottom),
        0.0, 0.0, -2.0 / (far - near), -(far + near) / (far - near),
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Matrix that carries normals through `modelview`: the inverse transpose
/// of its upper-left 3×3.
pub fn normal_matrix(modelview: &Mat4<f32>) -> Mat3<f32> {
    let m = modelview.into_row_array();
    let (a, b, c) = (m[0], m[1], m[2]);
    let (d, e, f) = (m[4], m[5], m[6]);
    let (g, h, i) = (m[8], m[9], m[10]);

    // Cofactor matrix; dividing it by the determinant yields the inverse
    // transpose directly.
    let ca = e * i - f * h;
    let cb = f * g - d * i;
    let cc = d * h - e * g;
    let det = a * ca + b * cb + c * cc;
    let rec_det = if det != 0.0 { 1.0 / det } else { 1.0 };

    Mat3::from_row_arrays([
        [ca, cb, cc],
        [c * h - b * i, a * i - c * g, b * g - a * h],
        [b * f - c * e, c * d - a * f, a * e - b * d],
    ]) * rec_det
}
