//! A coloured triangle next to a textured quad, seen by a fixed camera.

use std::time::Duration;

use snake_gl::{
    app::{self, Scene},
    cgmath::Vector3,
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

struct Shapes {
    colour_program: ShaderProgram,
    texture_program: ShaderProgram,
    triangle: GpuMesh,
    triangle_uniforms: Uniforms,
    quad: GpuMesh,
    quad_uniforms: Uniforms,
    quad_texture: wgpu::BindGroup,
    elapsed: Duration,
}

impl Shapes {
    fn new(ctx: &mut Context) -> anyhow::Result<Self> {
        let colour_program = ShaderProgram::from_files(
            &ctx.device,
            ctx.targets(),
            "shaders/colour.vert.wgsl",
            "shaders/colour.frag.wgsl",
            false,
        )?;
        let texture_program = ShaderProgram::from_files(
            &ctx.device,
            ctx.targets(),
            "shaders/basic.vert.wgsl",
            "shaders/textured.frag.wgsl",
            true,
        )?;

        let triangle = GpuMesh::new(
            &ctx.device,
            "triangle",
            &MeshData::triangle_coloured(0.5, 0.5, [1.0, 0.5, 0.2]),
        );
        let mut triangle_uniforms = colour_program.uniforms(&ctx.device);
        triangle_uniforms.set_model(Transform::from(Vector3::new(-0.6, 0.0, 0.0)).to_matrix());

        let quad = GpuMesh::new(&ctx.device, "quad", &MeshData::quad(0.5, 0.5));
        let mut quad_uniforms = texture_program.uniforms(&ctx.device);
        quad_uniforms.set_model(Transform::from(Vector3::new(0.6, 0.0, 0.0)).to_matrix());
        quad_uniforms.set_use_texture(true);
        quad_uniforms.set_mix(1.0);

        let texture = load_texture_or_blank("textures/checker.png", true, &ctx.device, &ctx.queue);
        let texture_layout = texture_program
            .texture_layout()
            .ok_or_else(|| anyhow::anyhow!("{} has no texture slot", texture_program.label))?;
        let quad_texture = texture.bind_group(&ctx.device, texture_layout);

        Ok(Self {
            colour_program,
            texture_program,
            triangle,
            triangle_uniforms,
            quad,
            quad_uniforms,
            quad_texture,
            elapsed: Duration::ZERO,
        })
    }
}

impl Scene for Shapes {
    fn on_update(&mut self, ctx: &Context, dt: Duration) {
        self.elapsed += dt;
        // Fade between the plain vertex colour and the texture
        let mix = 0.5 + 0.5 * self.elapsed.as_secs_f32().sin();
        self.quad_uniforms.set_mix(mix);
        self.quad_uniforms.set_time(self.elapsed.as_secs_f32());
        self.triangle_uniforms.flush(&ctx.queue);
        self.quad_uniforms.flush(&ctx.queue);
    }

    fn on_render(&self, ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>) {
        self.colour_program
            .use_program(render_pass, &ctx.camera.bind_group, &self.triangle_uniforms);
        self.triangle.draw(render_pass);

        self.texture_program
            .use_program(render_pass, &ctx.camera.bind_group, &self.quad_uniforms);
        self.texture_program.bind_texture(render_pass, &self.quad_texture);
        self.quad.draw(render_pass);
    }
}

fn main() -> anyhow::Result<()> {
    app::run(
        WindowConfig::from_env().with_title("SnakeGL - shapes"),
        CameraConfig::default().fixed(true),
        Shapes::new,
    )
}
