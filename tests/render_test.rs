#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
use common::test_utils::{Gpu, centre, corner, to_pixel};
#[cfg(feature = "integration-tests")]
use snake_gl::{
    data_structures::{
        mesh::{GpuMesh, MeshData},
        texture::Texture,
    },
    shader::ShaderProgram,
};
#[cfg(feature = "integration-tests")]
use wgpu::Color;

#[cfg(feature = "integration-tests")]
const BLUE: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 1.0,
    a: 1.0,
};

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    let gpu = Gpu::new();
    let img = gpu.render(Color::WHITE, |_| {});
    let desired_pixel = to_pixel(Color::WHITE);
    for pixel in img.pixels() {
        assert_eq!(*pixel, desired_pixel);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_coloured_quad_in_front_of_camera() {
    let gpu = Gpu::new();
    let program = ShaderProgram::from_files(
        &gpu.device,
        gpu.targets(),
        "shaders/colour.vert.wgsl",
        "shaders/colour.frag.wgsl",
        false,
    )
    .unwrap();
    let quad = GpuMesh::new(&gpu.device, "quad", &MeshData::quad_coloured(0.5, 0.5, [1.0, 0.0, 0.0]));
    let uniforms = program.uniforms(&gpu.device);

    let img = gpu.render(BLUE, |render_pass| {
        program.use_program(render_pass, &gpu.camera.bind_group, &uniforms);
        quad.draw(render_pass);
    });

    assert_eq!(centre(&img), image::Rgba([255, 0, 0, 255]));
    assert_eq!(corner(&img), to_pixel(BLUE));
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_tint_with_uniform_colour() {
    let gpu = Gpu::new();
    let program = ShaderProgram::from_files(
        &gpu.device,
        gpu.targets(),
        "shaders/colour.vert.wgsl",
        "shaders/colour.frag.wgsl",
        false,
    )
    .unwrap();
    let triangle = GpuMesh::new(&gpu.device, "triangle", &MeshData::triangle(0.5, 0.5));
    let mut uniforms = program.uniforms(&gpu.device);
    uniforms.set_colour(0.0, 1.0, 0.0);
    assert!(uniforms.flush(&gpu.queue));
    assert!(!uniforms.flush(&gpu.queue));

    let img = gpu.render(BLUE, |render_pass| {
        program.use_program(render_pass, &gpu.camera.bind_group, &uniforms);
        triangle.draw(render_pass);
    });

    assert_eq!(centre(&img), image::Rgba([0, 255, 0, 255]));
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_textured_cube_with_blank_texture() {
    let gpu = Gpu::new();
    let program = ShaderProgram::from_files(
        &gpu.device,
        gpu.targets(),
        "shaders/basic.vert.wgsl",
        "shaders/textured.frag.wgsl",
        true,
    )
    .unwrap();
    let cube = GpuMesh::new(&gpu.device, "cube", &MeshData::cube(0.5, 0.5));
    let mut uniforms = program.uniforms(&gpu.device);
    uniforms.set_use_texture(true);
    uniforms.set_mix(1.0);
    uniforms.flush(&gpu.queue);

    let texture = Texture::create_blank(&gpu.device, &gpu.queue);
    let texture = texture.bind_group(&gpu.device, program.texture_layout().unwrap());

    let img = gpu.render(BLUE, |render_pass| {
        program.use_program(render_pass, &gpu.camera.bind_group, &uniforms);
        program.bind_texture(render_pass, &texture);
        cube.draw(render_pass);
    });

    // A white texture leaves the white vertex colour as it is
    assert_eq!(centre(&img), to_pixel(Color::WHITE));
    assert_eq!(corner(&img), to_pixel(BLUE));
}
