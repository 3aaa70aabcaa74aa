//! A spinning textured cube. WASD/arrows move, the mouse looks around and the
//! scroll wheel zooms.

use std::time::Duration;

use snake_gl::{
    app::{self, Scene},
    cgmath::{Deg, InnerSpace, Vector3},
    config::{CameraConfig, WindowConfig},
    context::Context,
    data_structures::{
        mesh::{GpuMesh, MeshData},
        transform::Transform,
    },
    resources::texture::load_texture_or_blank,
    shader::{ShaderProgram, Uniforms},
    wgpu,
};

const DEGREES_PER_SECOND: f32 = 50.0;

struct Cube {
    program: ShaderProgram,
    mesh: GpuMesh,
    uniforms: Uniforms,
    texture: wgpu::BindGroup,
    transform: Transform,
}

impl Cube {
    fn new(ctx: &mut Context) -> anyhow::Result<Self> {
        let program = ShaderProgram::from_files(
            &ctx.device,
            ctx.targets(),
            "shaders/basic.vert.wgsl",
            "shaders/textured.frag.wgsl",
            true,
        )?;
        let mesh = GpuMesh::new(&ctx.device, "cube", &MeshData::cube(1.0, 1.0));

        let mut uniforms = program.uniforms(&ctx.device);
        uniforms.set_use_texture(true);
        uniforms.set_mix(1.0);

        let texture = load_texture_or_blank("textures/checker.png", true, &ctx.device, &ctx.queue);
        let layout = program
            .texture_layout()
            .ok_or_else(|| anyhow::anyhow!("{} has no texture slot", program.label))?;
        let texture = texture.bind_group(&ctx.device, layout);

        Ok(Self {
            program,
            mesh,
            uniforms,
            texture,
            transform: Transform::new(),
        })
    }
}

impl Scene for Cube {
    fn on_update(&mut self, ctx: &Context, dt: Duration) {
        self.transform.rotate(
            Vector3::new(0.5, 1.0, 0.0).normalize(),
            Deg(DEGREES_PER_SECOND * dt.as_secs_f32()),
        );
        self.uniforms.set_model(self.transform.to_matrix());
        self.uniforms.flush(&ctx.queue);
    }

    fn on_render(&self, ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>) {
        self.program
            .use_program(render_pass, &ctx.camera.bind_group, &self.uniforms);
        self.program.bind_texture(render_pass, &self.texture);
        self.mesh.draw(render_pass);
    }
}

fn main() -> anyhow::Result<()> {
    app::run(
        WindowConfig::from_env()
            .with_title("SnakeGL - cube")
            .with_grab_cursor(true),
        CameraConfig::default(),
        Cube::new,
    )
}
