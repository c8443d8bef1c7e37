//! End-to-end pipeline scenarios: whole draws checked against expected
//! framebuffer contents.

use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;
use rastrum::*;
use vek::{Mat4, Rgba, Vec4};

/// Passthrough vertex shader: attribute 0 is the clip-space position,
/// attribute 1 feeds varying 0.
struct Passthrough;

impl VertexShader for Passthrough {
    fn run(&self, input: &VsIn, output: &mut VsOut) {
        output.position = input.attributes[0];
        output.varyings[0] = input.attributes[1];
    }
}

/// Fragment shader returning a constant colour.
struct Flat(Rgba<f32>);

impl FragmentShader for Flat {
    fn run(&self, _input: &FsIn, output: &mut FsOut) {
        output.color = self.0;
    }
}

const RED: Rgba<f32> = Rgba { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
const GREEN: Rgba<f32> = Rgba { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
const BLACK: Rgba<f32> = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

fn vertex(position: Vec4<f32>) -> VsIn {
    VsIn::new([position])
}

fn flat_device(color: Rgba<f32>) -> RenderDevice {
    let mut device = RenderDevice::new();
    device.set_shader_program(ShaderProgram::new(Passthrough, Flat(color), 0));
    device
}

/// A triangle large enough to cover any viewport after clipping.
fn fullscreen_triangle(z: f32) -> VertexArray {
    VertexArray::new(vec![
        vertex(Vec4::new(-4.0, -4.0, z, 1.0)),
        vertex(Vec4::new(4.0, -4.0, z, 1.0)),
        vertex(Vec4::new(0.0, 4.0, z, 1.0)),
    ])
}

fn is_red(fb: &FrameBuffer, x: usize, y: usize) -> bool {
    let c = fb.get_color(x, y);
    c.r > 0.5 && c.g < 0.5
}

fn count_lit(fb: &FrameBuffer) -> usize {
    let mut lit = 0;
    for y in 0..fb.height() {
        for x in 0..fb.width() {
            if fb.get_color(x, y).r > 0.5 {
                lit += 1;
            }
        }
    }
    lit
}

#[test]
fn flat_triangle_covers_the_centre() {
    let mut device = flat_device(RED);
    let mut fb = FrameBuffer::new(4, 4, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);

    let triangle = VertexArray::new(vec![
        vertex(Vec4::new(-1.0, -1.0, 0.5, 1.0)),
        vertex(Vec4::new(1.0, -1.0, 0.5, 1.0)),
        vertex(Vec4::new(0.0, 1.0, 0.5, 1.0)),
    ]);
    device.draw(&mut fb, &triangle);

    assert!(is_red(&fb, 2, 1));
    assert_eq!(fb.get_color(0, 3), BLACK);
    assert_eq!(fb.get_color(3, 3), BLACK);
}

#[test]
fn depth_test_is_order_independent() {
    let near = fullscreen_triangle(0.1);
    let far = fullscreen_triangle(0.5);

    for order in [[&near, &far], [&far, &near]] {
        let mut fb = FrameBuffer::new(2, 2, ColorFormat::LdrRgb, DepthFormat::Float32);
        fb.clear_color(BLACK);
        fb.clear_depth(f32::INFINITY);

        let mut device = flat_device(RED);
        device.states_mut().depth_test = true;

        let colors = if std::ptr::eq(order[0], &near) { [RED, GREEN] } else { [GREEN, RED] };
        for (va, color) in order.iter().zip(colors) {
            device.set_shader_program(ShaderProgram::new(Passthrough, Flat(color), 0));
            device.draw(&mut fb, va);
        }

        // The nearer (red) triangle must win at every pixel.
        for y in 0..2 {
            for x in 0..2 {
                assert!(is_red(&fb, x, y), "pixel ({}, {}) lost to the far triangle", x, y);
            }
        }
    }
}

#[test]
fn alpha_test_gates_on_the_threshold() {
    let translucent = Rgba::new(0.0, 0.0, 1.0, 0.4);

    let mut fb = FrameBuffer::new(2, 2, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);
    let mut device = flat_device(translucent);
    device.states_mut().alpha_test = true;
    device.states_mut().alpha_test_threshold = 0.5;
    device.draw(&mut fb, &fullscreen_triangle(0.5));
    assert_eq!(fb.get_color(0, 0), BLACK);
    assert_eq!(fb.get_color(1, 1), BLACK);

    device.states_mut().alpha_test_threshold = 0.3;
    device.draw(&mut fb, &fullscreen_triangle(0.5));
    assert!(fb.get_color(0, 0).b > 0.5);
    assert!(fb.get_color(1, 1).b > 0.5);
}

#[test]
fn ndc_points_land_on_the_expected_pixels() {
    let mut device = flat_device(RED);
    device.states_mut().primitive_mode = PrimitiveMode::Points;

    let mut fb = FrameBuffer::new(4, 4, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);

    let points = VertexArray::new(vec![
        vertex(Vec4::new(0.0, 0.0, 0.5, 1.0)),   // centre -> (2, 2)
        vertex(Vec4::new(-1.0, -1.0, 0.5, 1.0)), // corner -> (0, 0)
        vertex(Vec4::new(1.0, 1.0, 0.5, 1.0)),   // corner -> (4, 4), off the buffer
    ]);
    device.draw(&mut fb, &points);

    assert!(is_red(&fb, 2, 2));
    assert!(is_red(&fb, 0, 0));
    assert_eq!(count_lit(&fb), 2);
}

#[test]
fn cull_symmetry_under_winding_flip() {
    let ccw = VertexArray::new(vec![
        vertex(Vec4::new(-1.0, -1.0, 0.5, 1.0)),
        vertex(Vec4::new(1.0, -1.0, 0.5, 1.0)),
        vertex(Vec4::new(0.0, 1.0, 0.5, 1.0)),
    ]);
    let cw = VertexArray::new(vec![
        vertex(Vec4::new(-1.0, -1.0, 0.5, 1.0)),
        vertex(Vec4::new(0.0, 1.0, 0.5, 1.0)),
        vertex(Vec4::new(1.0, -1.0, 0.5, 1.0)),
    ]);

    let render = |va: &VertexArray, cull: CullMode| {
        let mut device = flat_device(RED);
        device.states_mut().cull_mode = cull;
        let mut fb = FrameBuffer::new(8, 8, ColorFormat::LdrRgb, DepthFormat::None);
        fb.clear_color(BLACK);
        device.draw(&mut fb, va);
        fb
    };

    let a = render(&ccw, CullMode::Back);
    let b = render(&cw, CullMode::Front);
    assert_eq!(a.ldr_data(), b.ldr_data());
    assert!(count_lit(&a) > 0, "the front face was culled");

    let c = render(&ccw, CullMode::Front);
    let d = render(&cw, CullMode::Back);
    assert_eq!(c.ldr_data(), d.ldr_data());
    assert_eq!(count_lit(&c), 0, "the back face survived");
}

/// Fragment shader forwarding varying 0 into the red channel.
struct VaryingToRed;

impl FragmentShader for VaryingToRed {
    fn run(&self, input: &FsIn, output: &mut FsOut) {
        output.color = Rgba::new(input.varyings[0].x, 0.0, 0.0, 1.0);
    }
}

#[test]
fn attribute_interpolation_is_perspective_correct() {
    let mut device = RenderDevice::new();
    device.set_shader_program(ShaderProgram::new(Passthrough, VaryingToRed, 1));

    let mut fb = FrameBuffer::new(8, 8, ColorFormat::HdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);

    // Two vertices sit twice as deep (w = 2) as the first.
    let triangle = VertexArray::new(vec![
        VsIn::new([Vec4::new(-1.0, -1.0, 0.5, 1.0), Vec4::zero()]),
        VsIn::new([Vec4::new(2.0, -2.0, 1.0, 2.0), Vec4::new(1.0, 0.0, 0.0, 0.0)]),
        VsIn::new([Vec4::new(0.0, 2.0, 1.0, 2.0), Vec4::zero()]),
    ]);
    device.draw(&mut fb, &triangle);

    // Screen barycentrics at pixel (4, 2) are (0.28125, 0.40625, 0.3125);
    // the perspective-correct value is (Σ tᵢ·uᵢ/wᵢ) / (Σ tᵢ/wᵢ).
    let expected = (0.40625 * 0.5) / (0.28125 + 0.40625 * 0.5 + 0.3125 * 0.5);
    assert_relative_eq!(fb.get_color(4, 2).r, expected, epsilon = 1e-4);

    // A plain screen-space lerp would give a noticeably different value.
    let screen_lerp = 0.40625;
    assert!((fb.get_color(4, 2).r - screen_lerp).abs() > 0.05);
}

/// Fragment shader that counts how many times it ran.
struct Counting(Rc<Cell<usize>>, Rgba<f32>);

impl FragmentShader for Counting {
    fn run(&self, _input: &FsIn, output: &mut FsOut) {
        self.0.set(self.0.get() + 1);
        output.color = self.1;
    }
}

#[test]
fn early_z_skips_occluded_fragment_shading() {
    let mut fb = FrameBuffer::new(2, 2, ColorFormat::LdrRgb, DepthFormat::Float32);
    fb.clear_color(BLACK);
    fb.clear_depth(f32::INFINITY);

    let mut device = RenderDevice::new();
    device.states_mut().depth_test = true;
    device.states_mut().early_z_test = true;

    let near_runs = Rc::new(Cell::new(0));
    device.set_shader_program(ShaderProgram::new(Passthrough, Counting(near_runs.clone(), RED), 0));
    device.draw(&mut fb, &fullscreen_triangle(0.1));
    assert!(near_runs.get() >= 4);

    let far_runs = Rc::new(Cell::new(0));
    device.set_shader_program(ShaderProgram::new(Passthrough, Counting(far_runs.clone(), GREEN), 0));
    device.draw(&mut fb, &fullscreen_triangle(0.5));

    // Every far fragment lost the early depth test, so its shader never ran.
    assert_eq!(far_runs.get(), 0);
    for y in 0..2 {
        for x in 0..2 {
            assert!(is_red(&fb, x, y));
        }
    }
}

#[test]
#[should_panic]
fn early_z_without_a_depth_plane_is_a_programmer_error() {
    let mut fb = FrameBuffer::new(2, 2, ColorFormat::LdrRgb, DepthFormat::None);
    let mut device = flat_device(RED);
    device.states_mut().depth_test = true;
    device.states_mut().early_z_test = true;
    device.draw(&mut fb, &fullscreen_triangle(0.5));
}

#[test]
#[should_panic]
fn drawing_without_a_program_is_a_programmer_error() {
    let mut fb = FrameBuffer::new(2, 2, ColorFormat::LdrRgb, DepthFormat::None);
    let mut device = RenderDevice::new();
    device.draw(&mut fb, &fullscreen_triangle(0.5));
}

#[test]
fn wireframe_touches_edges_but_not_the_interior() {
    let mut device = flat_device(RED);
    device.states_mut().polygon_mode = PolygonMode::Wireframe;

    let mut fb = FrameBuffer::new(8, 8, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);
    let triangle = VertexArray::new(vec![
        vertex(Vec4::new(-1.0, -1.0, 0.5, 1.0)),
        vertex(Vec4::new(1.0, -1.0, 0.5, 1.0)),
        vertex(Vec4::new(0.0, 1.0, 0.5, 1.0)),
    ]);
    device.draw(&mut fb, &triangle);

    assert!(is_red(&fb, 4, 0), "bottom edge missing");
    assert_eq!(fb.get_color(4, 3), BLACK, "interior was filled");

    let outline = count_lit(&fb);
    device.states_mut().polygon_mode = PolygonMode::Fill;
    fb.clear_color(BLACK);
    device.draw(&mut fb, &triangle);
    assert!(count_lit(&fb) > outline, "fill should cover more than the outline");
}

#[test]
fn lines_walk_their_row() {
    let mut device = flat_device(RED);
    device.states_mut().primitive_mode = PrimitiveMode::Lines;

    let mut fb = FrameBuffer::new(8, 8, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);
    let line = VertexArray::new(vec![
        vertex(Vec4::new(-1.0, -0.25, 0.5, 1.0)),
        vertex(Vec4::new(1.0, -0.25, 0.5, 1.0)),
    ]);
    device.draw(&mut fb, &line);

    // y = -0.25 maps to screen y = 3; the span runs the full width.
    for x in 0..8 {
        assert!(is_red(&fb, x, 3), "pixel ({}, 3) missing", x);
    }
    assert_eq!(count_lit(&fb), 8);
}

#[test]
fn circle_points_drop_their_corners() {
    let draw_with_style = |style: PointStyle| {
        let mut device = flat_device(RED);
        device.states_mut().primitive_mode = PrimitiveMode::Points;
        device.states_mut().point_size = 4.0;
        device.states_mut().point_style = style;
        let mut fb = FrameBuffer::new(8, 8, ColorFormat::LdrRgb, DepthFormat::None);
        fb.clear_color(BLACK);
        device.draw(&mut fb, &VertexArray::new(vec![vertex(Vec4::new(0.0, 0.0, 0.5, 1.0))]));
        fb
    };

    let rect = draw_with_style(PointStyle::Rect);
    let circle = draw_with_style(PointStyle::Circle);

    assert!(is_red(&rect, 2, 2));
    assert!(!is_red(&circle, 2, 2), "disc should exclude the corner");
    assert!(is_red(&circle, 4, 4));
    assert!(count_lit(&circle) < count_lit(&rect));
}

#[test]
fn quads_fill_both_halves() {
    let mut device = flat_device(RED);
    device.states_mut().primitive_mode = PrimitiveMode::Quads;

    let mut fb = FrameBuffer::new(8, 8, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);
    let quad = VertexArray::new(vec![
        vertex(Vec4::new(-0.5, -0.5, 0.5, 1.0)),
        vertex(Vec4::new(0.5, -0.5, 0.5, 1.0)),
        vertex(Vec4::new(0.5, 0.5, 0.5, 1.0)),
        vertex(Vec4::new(-0.5, 0.5, 0.5, 1.0)),
    ]);
    device.draw(&mut fb, &quad);

    // Both triangle halves of the quad: below and above the diagonal.
    assert!(is_red(&fb, 4, 2));
    assert!(is_red(&fb, 3, 5));
    assert_eq!(fb.get_color(0, 0), BLACK);
}

/// Vertex shader applying a cached model transform to attribute 0.
struct Transformed {
    model: Mat4<f32>,
}

impl VertexShader for Transformed {
    fn load_uniforms(&mut self, uniforms: &Uniforms) {
        self.model = uniforms.get("transform.model", Mat4::identity());
    }

    fn run(&self, input: &VsIn, output: &mut VsOut) {
        output.position = self.model * input.attributes[0];
    }
}

#[test]
fn uniforms_reach_the_vertex_shader_each_draw() {
    let mut device = RenderDevice::new();
    device.states_mut().primitive_mode = PrimitiveMode::Points;
    device.set_shader_program(ShaderProgram::new(
        Transformed { model: Mat4::identity() },
        Flat(RED),
        0,
    ));

    let mut fb = FrameBuffer::new(8, 8, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);
    let origin = VertexArray::new(vec![vertex(Vec4::new(0.0, 0.0, 0.5, 1.0))]);

    device.set_uniform("transform.model", math::translate(vek::Vec3::new(0.5, 0.5, 0.0)));
    device.draw(&mut fb, &origin);
    assert!(is_red(&fb, 6, 6));
    assert!(!is_red(&fb, 4, 4));

    // Re-publishing the uniform moves the next draw.
    device.set_uniform("transform.model", Mat4::<f32>::identity());
    device.draw(&mut fb, &origin);
    assert!(is_red(&fb, 4, 4));
}

#[test]
fn viewport_offset_shifts_the_image() {
    let mut device = flat_device(RED);
    device.states_mut().primitive_mode = PrimitiveMode::Points;
    device.states_mut().viewport = Viewport::new(2, 2, 4, 4);

    let mut fb = FrameBuffer::new(8, 8, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);
    let points = VertexArray::new(vec![
        vertex(Vec4::new(0.0, 0.0, 0.5, 1.0)),
        vertex(Vec4::new(-1.0, -1.0, 0.5, 1.0)),
    ]);
    device.draw(&mut fb, &points);

    assert!(is_red(&fb, 4, 4), "centre should map to the viewport centre");
    assert!(is_red(&fb, 2, 2), "NDC corner should map to the viewport origin");
    assert!(!is_red(&fb, 0, 0));
}

#[test]
fn masks_suppress_writes() {
    let mut fb = FrameBuffer::new(2, 2, ColorFormat::LdrRgb, DepthFormat::Float32);
    fb.clear_color(BLACK);
    fb.clear_depth(f32::INFINITY);

    let mut device = flat_device(RED);
    device.states_mut().depth_test = true;
    device.states_mut().color_mask = true; // true = writes disabled
    device.draw(&mut fb, &fullscreen_triangle(0.5));
    assert_eq!(count_lit(&fb), 0);
    // Depth still updated (depth_mask is false).
    assert_relative_eq!(fb.get_depth(0, 0), 0.5, epsilon = 1e-5);

    device.states_mut().color_mask = false;
    device.states_mut().depth_mask = true; // true = writes disabled
    device.draw(&mut fb, &fullscreen_triangle(0.25));
    assert_eq!(count_lit(&fb), 4);
    assert_relative_eq!(fb.get_depth(0, 0), 0.5, epsilon = 1e-5);
}

#[test]
fn degenerate_triangles_emit_nothing() {
    let mut device = flat_device(RED);
    let mut fb = FrameBuffer::new(8, 8, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);

    let collinear = VertexArray::new(vec![
        vertex(Vec4::new(-0.5, -0.5, 0.5, 1.0)),
        vertex(Vec4::new(0.0, 0.0, 0.5, 1.0)),
        vertex(Vec4::new(0.5, 0.5, 0.5, 1.0)),
    ]);
    device.draw(&mut fb, &collinear);
    assert_eq!(count_lit(&fb), 0);
}

/// Fragment shader that discards everything.
struct DiscardAll;

impl FragmentShader for DiscardAll {
    fn run(&self, _input: &FsIn, output: &mut FsOut) {
        output.color = RED;
        output.discarded = true;
    }
}

#[test]
fn discarded_fragments_never_reach_the_framebuffer() {
    let mut device = RenderDevice::new();
    device.set_shader_program(ShaderProgram::new(Passthrough, DiscardAll, 0));
    let mut fb = FrameBuffer::new(4, 4, ColorFormat::LdrRgb, DepthFormat::None);
    fb.clear_color(BLACK);
    device.draw(&mut fb, &fullscreen_triangle(0.5));
    assert_eq!(count_lit(&fb), 0);
}

#[test]
fn render_target_clear_resets_depth_to_infinity() {
    let mut target = RenderTarget::new(FrameBuffer::new(
        2,
        2,
        ColorFormat::LdrRgb,
        DepthFormat::Float32,
    ));
    target.framebuffer_mut().set_depth(1, 1, 0.5);
    target.clear(Rgba::new(0.25, 0.5, 0.75, 1.0));

    assert_eq!(target.framebuffer().get_depth(1, 1), f32::INFINITY);
    let c = target.framebuffer().get_color(0, 0);
    assert!((c.r - 0.25).abs() <= 1.0 / 255.0);

    let mut device = flat_device(RED);
    device.states_mut().depth_test = true;
    target.draw(&mut device, &fullscreen_triangle(0.5));
    assert!(is_red(target.framebuffer(), 0, 0));
}
