//! Renders a single colour-interpolated triangle and saves it as
//! `triangle.ppm`.

use rastrum::*;
use vek::{Rgba, Vec4};

struct TriangleVs;

impl VertexShader for TriangleVs {
    fn run(&self, input: &VsIn, output: &mut VsOut) {
        output.position = input.attributes[0];
        output.varyings[0] = input.attributes[1];
    }
}

struct TriangleFs;

impl FragmentShader for TriangleFs {
    fn run(&self, input: &FsIn, output: &mut FsOut) {
        let c = input.varyings[0];
        output.color = Rgba::new(c.x, c.y, c.z, 1.0);
    }
}

const W: usize = 640;
const H: usize = 480;

fn main() {
    let mut device = RenderDevice::new();
    device.set_shader_program(ShaderProgram::new(TriangleVs, TriangleFs, 1));

    let triangle = VertexArray::new(vec![
        VsIn::new([Vec4::new(-0.8, -0.8, 0.5, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0)]),
        VsIn::new([Vec4::new(0.8, -0.8, 0.5, 1.0), Vec4::new(0.0, 1.0, 0.0, 1.0)]),
        VsIn::new([Vec4::new(0.0, 0.8, 0.5, 1.0), Vec4::new(0.0, 0.0, 1.0, 1.0)]),
    ]);

    let mut target = PpmTarget::new(W, H);
    target.clear(Rgba::new(0.08, 0.08, 0.1, 1.0));
    target.draw(&mut device, &triangle);
    target.save("triangle.ppm").expect("failed to write triangle.ppm");

    println!("wrote triangle.ppm ({}x{})", W, H);
}
