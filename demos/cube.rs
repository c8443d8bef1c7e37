//! Renders a textured cube with depth testing and back-face culling,
//! saving the frame as `cube.ppm`.

use std::sync::Arc;

use rastrum::*;
use vek::{Mat4, Rgba, Vec2, Vec3, Vec4};

struct CubeVs {
    mvp: Mat4<f32>,
}

impl VertexShader for CubeVs {
    fn load_uniforms(&mut self, uniforms: &Uniforms) {
        let model = uniforms.get("transform.model", Mat4::identity());
        let view = uniforms.get("transform.view", Mat4::identity());
        let projection = uniforms.get("transform.projection", Mat4::identity());
        self.mvp = projection * view * model;
    }

    fn run(&self, input: &VsIn, output: &mut VsOut) {
        output.position = self.mvp * input.attributes[0];
        output.varyings[0] = input.attributes[1];
    }
}

struct CubeFs {
    diffuse: TextureSampler,
}

impl FragmentShader for CubeFs {
    fn load_uniforms(&mut self, uniforms: &Uniforms) {
        self.diffuse = uniforms.get(
            "material.texture_diffuse0",
            TextureSampler::fallback(Rgba::new(1.0, 0.0, 1.0, 1.0)),
        );
    }

    fn run(&self, input: &FsIn, output: &mut FsOut) {
        let uv = Vec2::new(input.varyings[0].x, input.varyings[0].y);
        output.color = self.diffuse.sample(uv.x, uv.y);
    }
}

/// A unit cube as quads, one face at a time.
fn cube() -> VertexArray {
    let positions = [
        // +x, -x, +y, -y, +z, -z faces by corner index
        [1, 3, 7, 5],
        [0, 4, 6, 2],
        [2, 6, 7, 3],
        [0, 1, 5, 4],
        [4, 5, 7, 6],
        [0, 2, 3, 1],
    ];
    let uvs = [Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)];

    let mut vertices = Vec::new();
    for face in positions {
        for (corner, uv) in face.into_iter().zip(uvs) {
            let p = Vec3::new(
                (corner & 1) as f32 - 0.5,
                ((corner >> 1) & 1) as f32 - 0.5,
                ((corner >> 2) & 1) as f32 - 0.5,
            );
            vertices.push(VsIn::new([
                Vec4::new(p.x, p.y, p.z, 1.0),
                Vec4::new(uv.x, uv.y, 0.0, 1.0),
            ]));
        }
    }
    VertexArray::new(vertices)
}

/// A procedural checkerboard so the demo needs no asset files.
fn checkerboard() -> Texture {
    let mut tex = Texture::new(128, 128, TextureFormat::LdrRgba);
    for y in 0..128 {
        for x in 0..128 {
            let lit = ((x / 16) ^ (y / 16)) & 1 == 1;
            let c = if lit { 0.9 } else { 0.2 };
            tex.set_color(x, y, Rgba::new(c, c, c, 1.0));
        }
    }
    tex.wrap_mode = WrapMode::ClampToEdge;
    tex.sample_mode = SampleMode::Bilinear;
    tex
}

const W: usize = 500;
const H: usize = 500;

fn main() {
    let mut device = RenderDevice::new();
    device.set_shader_program(ShaderProgram::new(
        CubeVs { mvp: Mat4::identity() },
        CubeFs { diffuse: TextureSampler::default() },
        1,
    ));
    device.states_mut().primitive_mode = PrimitiveMode::Quads;
    device.states_mut().depth_test = true;
    device.states_mut().cull_mode = CullMode::Back;

    device.set_uniform("material.texture_diffuse0", TextureSampler::new(Arc::new(checkerboard())));
    device.set_uniform(
        "transform.model",
        math::rotate(0.6, Vec3::new(0.0, 1.0, 0.0)) * math::rotate(0.4, Vec3::unit_x()),
    );
    device.set_uniform(
        "transform.view",
        math::look_at(Vec3::new(0.0, 0.0, 2.5), Vec3::zero(), Vec3::unit_y()),
    );
    device.set_uniform(
        "transform.projection",
        math::perspective(std::f32::consts::PI * 0.25, W as f32 / H as f32, 0.1, 100.0),
    );

    let mut target = PpmTarget::new(W, H);
    target.clear(Rgba::new(0.08, 0.08, 0.1, 1.0));
    target.draw(&mut device, &cube());
    target.save("cube.ppm").expect("failed to write cube.ppm");

    println!("wrote cube.ppm ({}x{})", W, H);
}
