use crate::data_structures::texture::Texture;

/// Pipeline layout for a program: camera, per-object uniforms and, for
/// textured programs, a texture/sampler pair.
pub fn mk_pipeline_layout(
    device: &wgpu::Device,
    label: &str,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    uniform_bind_group_layout: &wgpu::BindGroupLayout,
    texture_bind_group_layout: Option<&wgpu::BindGroupLayout>,
) -> wgpu::PipelineLayout {
    let mut bind_group_layouts = vec![camera_bind_group_layout, uniform_bind_group_layout];
    bind_group_layouts.extend(texture_bind_group_layout);
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Pipeline Layout")),
        bind_group_layouts: &bind_group_layouts,
        push_constant_ranges: &[],
    })
}

/// Builds a triangle-list pipeline from separately compiled vertex and
/// fragment modules. Faces are not culled since the generated quads and cubes
/// don't share a consistent winding.
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// Alpha blending with depth testing against the standard depth format.
pub fn default_targets() -> (Option<wgpu::BlendState>, Option<wgpu::TextureFormat>) {
    (Some(wgpu::BlendState::ALPHA_BLENDING), Some(Texture::DEPTH_FORMAT))
}
