//! Shader programs.
//!
//! A [`ShaderProgram`] is built from a vertex and a fragment WGSL source, each
//! in its own file. Both sources are compiled up front with `naga` so that
//! syntax and validation errors come back as a [`ShaderError`] carrying the
//! formatted diagnostic instead of surfacing later as a device error. The two
//! stages are then linked: the entry points must exist, the fragment stage may
//! only read what the vertex stage writes, and every resource binding has to
//! fit the program's pipeline layout.
//!
//! Uniforms live in a per-object [`Uniforms`] block so several objects can be
//! drawn with the same program in one render pass.

use std::{
    collections::BTreeMap,
    fmt,
    path::PathBuf,
};

use cgmath::{Matrix4, SquareMatrix, Vector3};
use naga::{
    AddressSpace, Binding, GlobalVariable, Handle, ImageClass, ImageDimension, Interpolation,
    ResourceBinding, Sampling, ScalarKind, Type, TypeInner,
};
use wgpu::util::DeviceExt;

use crate::{
    camera::CameraUniform,
    data_structures::{mesh::Vertex, texture::texture_bind_group_layout},
    pipelines::basic::{mk_pipeline_layout, mk_render_pipeline},
    resources::asset_path,
};

pub const CAMERA_GROUP: u32 = 0;
pub const UNIFORM_GROUP: u32 = 1;
pub const TEXTURE_GROUP: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("could not read shader file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader compilation failed\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program linking failed\n{log}")]
    Link { log: String },
}

/// A single stage that parsed and validated.
#[derive(Debug)]
pub struct CompiledShader {
    pub stage: ShaderStage,
    pub source: String,
    module: naga::Module,
    entry_point: usize,
}

/// Parses and validates `source`, and checks that it has the stage's entry point.
pub fn compile(stage: ShaderStage, source: &str) -> Result<CompiledShader, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    // Only what a device opened without extra features can run
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    let entry_point = module
        .entry_points
        .iter()
        .position(|ep| ep.name == stage.entry_point() && ep.stage == stage.naga_stage())
        .ok_or_else(|| ShaderError::Compile {
            stage,
            log: format!("no {stage} entry point named `{}`", stage.entry_point()),
        })?;

    Ok(CompiledShader {
        stage,
        source: source.to_string(),
        module,
        entry_point,
    })
}

impl CompiledShader {
    fn entry_point(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_point]
    }

    /// Locations the stage reads.
    fn inputs(&self) -> BTreeMap<u32, Varying> {
        let mut locations = BTreeMap::new();
        for argument in &self.entry_point().function.arguments {
            collect_locations(&self.module, argument.ty, argument.binding.as_ref(), &mut locations);
        }
        locations
    }

    /// Locations the stage writes.
    fn outputs(&self) -> BTreeMap<u32, Varying> {
        let mut locations = BTreeMap::new();
        if let Some(result) = &self.entry_point().function.result {
            collect_locations(&self.module, result.ty, result.binding.as_ref(), &mut locations);
        }
        locations
    }

    /// Every global declared with `@group(g) @binding(b)`.
    fn resources(&self) -> impl Iterator<Item = (&ResourceBinding, &GlobalVariable)> + '_ {
        self.module
            .global_variables
            .iter()
            .filter_map(|(_, var)| Some((var.binding.as_ref()?, var)))
    }
}

/// A user-defined location as one stage declares it.
#[derive(Clone, Debug, PartialEq)]
struct Varying {
    ty: TypeInner,
    interpolation: Interpolation,
    sampling: Option<Sampling>,
}

fn collect_locations(
    module: &naga::Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    locations: &mut BTreeMap<u32, Varying>,
) {
    match binding {
        Some(Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        }) => {
            let ty = module.types[ty].inner.clone();
            // WGSL defaults: floats are perspective-correct at the pixel centre
            let interpolation = interpolation.unwrap_or(match scalar_kind(&ty) {
                Some(ScalarKind::Float) => Interpolation::Perspective,
                _ => Interpolation::Flat,
            });
            let sampling = match interpolation {
                Interpolation::Flat => *sampling,
                _ => Some(sampling.unwrap_or(Sampling::Center)),
            };
            locations.insert(
                *location,
                Varying {
                    ty,
                    interpolation,
                    sampling,
                },
            );
        }
        Some(Binding::BuiltIn(_)) => (),
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), locations);
                }
            }
        }
    }
}

fn scalar_kind(ty: &TypeInner) -> Option<ScalarKind> {
    match ty {
        TypeInner::Scalar(scalar) | TypeInner::Vector { scalar, .. } => Some(scalar.kind),
        _ => None,
    }
}

/// Scalar kind a vertex attribute arrives as in the shader.
fn format_kind(format: wgpu::VertexFormat) -> ScalarKind {
    use wgpu::VertexFormat as F;
    match format {
        F::Uint8x2
        | F::Uint8x4
        | F::Uint16x2
        | F::Uint16x4
        | F::Uint32
        | F::Uint32x2
        | F::Uint32x3
        | F::Uint32x4 => ScalarKind::Uint,
        F::Sint8x2
        | F::Sint8x4
        | F::Sint16x2
        | F::Sint16x4
        | F::Sint32
        | F::Sint32x2
        | F::Sint32x3
        | F::Sint32x4 => ScalarKind::Sint,
        _ => ScalarKind::Float,
    }
}

/// Checks that the two stages fit together and fit the pipeline layout.
pub fn link(
    vertex: &CompiledShader,
    fragment: &CompiledShader,
    textured: bool,
) -> Result<(), ShaderError> {
    let mut problems = Vec::new();

    let provided = Vertex::desc(textured);
    for (location, input) in vertex.inputs() {
        match provided.attributes.iter().find(|a| a.shader_location == location) {
            None => problems.push(format!(
                "vertex input at location {location} is not provided by the vertex buffer"
            )),
            Some(attribute) if scalar_kind(&input.ty) != Some(format_kind(attribute.format)) => {
                problems.push(format!(
                    "vertex input at location {location} is declared as {:?} but the vertex buffer provides {:?}",
                    input.ty, attribute.format
                ))
            }
            Some(_) => (),
        }
    }

    let written = vertex.outputs();
    for (location, read) in fragment.inputs() {
        match written.get(&location) {
            None => problems.push(format!(
                "fragment input at location {location} is not written by the vertex stage"
            )),
            Some(out) if out.ty != read.ty => problems.push(format!(
                "location {location} is written as {:?} but read as {:?}",
                out.ty, read.ty
            )),
            Some(out) if out.interpolation != read.interpolation || out.sampling != read.sampling => {
                problems.push(format!(
                    "location {location} is interpolated {:?}/{:?} by the vertex stage but {:?}/{:?} by the fragment stage",
                    out.interpolation, out.sampling, read.interpolation, read.sampling
                ))
            }
            Some(_) => (),
        }
    }

    for shader in [vertex, fragment] {
        for (binding, var) in shader.resources() {
            if let Err(problem) = check_resource(&shader.module, binding, var, textured) {
                problems.push(format!(
                    "{} stage binds @group({}) @binding({}) {problem}",
                    shader.stage, binding.group, binding.binding
                ));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ShaderError::Link {
            log: problems.join("\n"),
        })
    }
}

/// Compares a resource against what the program layout has in that slot.
fn check_resource(
    module: &naga::Module,
    binding: &ResourceBinding,
    var: &GlobalVariable,
    textured: bool,
) -> Result<(), String> {
    let inner = &module.types[var.ty].inner;
    match (binding.group, binding.binding) {
        (CAMERA_GROUP, 0) => uniform_block(module, var, size_of::<CameraUniform>() as u32),
        (UNIFORM_GROUP, 0) => uniform_block(module, var, size_of::<UniformData>() as u32),
        (TEXTURE_GROUP, 0) if textured => match inner {
            TypeInner::Image {
                dim: ImageDimension::D2,
                arrayed: false,
                class:
                    ImageClass::Sampled {
                        kind: ScalarKind::Float,
                        multi: false,
                    },
            } => Ok(()),
            other => Err(format!(
                "as {other:?} but the layout has a filterable 2D float texture there"
            )),
        },
        (TEXTURE_GROUP, 1) if textured => match inner {
            TypeInner::Sampler { comparison: false } => Ok(()),
            other => Err(format!("as {other:?} but the layout has a filtering sampler there")),
        },
        _ => Err("which the program layout doesn't have".to_string()),
    }
}

fn uniform_block(module: &naga::Module, var: &GlobalVariable, size: u32) -> Result<(), String> {
    if var.space != AddressSpace::Uniform {
        return Err(format!(
            "in {:?} space but the layout has a uniform buffer there",
            var.space
        ));
    }
    let needed = module.types[var.ty].inner.size(module.to_ctx());
    if needed > size {
        return Err(format!(
            "as a {needed} byte uniform but the buffer only holds {size} bytes"
        ));
    }
    Ok(())
}

/// Per-object values as laid out in the uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UniformData {
    model: [[f32; 4]; 4],
    colour: [f32; 3],
    mix_amount: f32,
    use_texture: u32,
    time: f32,
    // Uniform structs are padded to 16 bytes
    _padding: [u32; 2],
}

impl Default for UniformData {
    fn default() -> Self {
        Self {
            model: Matrix4::identity().into(),
            colour: [1.0, 1.0, 1.0],
            mix_amount: 0.0,
            use_texture: 0,
            time: 0.0,
            _padding: [0; 2],
        }
    }
}

/// A uniform block bound at group 1 of a [`ShaderProgram`].
///
/// Setters only touch the CPU copy; [`Uniforms::flush`] uploads it.
#[derive(Debug)]
pub struct Uniforms {
    data: UniformData,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    dirty: bool,
}

impl Uniforms {
    pub fn set_model(&mut self, model: Matrix4<f32>) {
        self.update(|data| data.model = model.into());
    }

    pub fn set_colour(&mut self, x: f32, y: f32, z: f32) {
        self.update(|data| data.colour = [x, y, z]);
    }

    pub fn set_colour_vec(&mut self, colour: Vector3<f32>) {
        self.set_colour(colour.x, colour.y, colour.z);
    }

    /// Blend factor between vertex colour (0.0) and texture colour (1.0).
    pub fn set_mix(&mut self, mix_amount: f32) {
        self.update(|data| data.mix_amount = mix_amount);
    }

    pub fn set_use_texture(&mut self, use_texture: bool) {
        self.update(|data| data.use_texture = use_texture as u32);
    }

    pub fn set_time(&mut self, time: f32) {
        self.update(|data| data.time = time);
    }

    pub fn data(&self) -> &UniformData {
        &self.data
    }

    /// Uploads pending changes. Returns whether anything was written.
    pub fn flush(&mut self, queue: &wgpu::Queue) -> bool {
        if !self.dirty {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.data]));
        self.dirty = false;
        true
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    fn update(&mut self, f: impl FnOnce(&mut UniformData)) {
        let before = self.data;
        f(&mut self.data);
        self.dirty |= before != self.data;
    }
}

/// Pipeline targets a program renders into.
#[derive(Clone, Copy, Debug)]
pub struct ProgramTargets<'a> {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub blend: Option<wgpu::BlendState>,
    pub camera_layout: &'a wgpu::BindGroupLayout,
}

#[derive(Debug)]
pub struct ShaderProgram {
    pub label: String,
    pub textured: bool,
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: Option<wgpu::BindGroupLayout>,
}

impl ShaderProgram {
    /// Reads both stages from the asset root and builds the program.
    pub fn from_files(
        device: &wgpu::Device,
        targets: ProgramTargets<'_>,
        vertex_path: &str,
        fragment_path: &str,
        textured: bool,
    ) -> Result<Self, ShaderError> {
        let vertex_source = read_source(vertex_path)?;
        let fragment_source = read_source(fragment_path)?;
        let label = format!("{vertex_path} + {fragment_path}");
        Self::from_sources(device, targets, &label, &vertex_source, &fragment_source, textured)
    }

    pub fn from_sources(
        device: &wgpu::Device,
        targets: ProgramTargets<'_>,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
        textured: bool,
    ) -> Result<Self, ShaderError> {
        let (vertex, fragment) = compile_and_link(vertex_source, fragment_source, textured)
            .inspect_err(|e| log::error!("{label}: {e}"))?;

        let uniform_layout = uniform_bind_group_layout(device);
        let texture_layout = textured.then(|| texture_bind_group_layout(device));
        let layout = mk_pipeline_layout(
            device,
            label,
            targets.camera_layout,
            &uniform_layout,
            texture_layout.as_ref(),
        );

        let vertex_module = create_module(device, label, &vertex);
        let fragment_module = create_module(device, label, &fragment);
        let pipeline = mk_render_pipeline(
            device,
            label,
            &layout,
            targets.color_format,
            targets.blend,
            targets.depth_format,
            &[Vertex::desc(textured)],
            &vertex_module,
            &fragment_module,
        );
        log::info!("Built shader program {label}");

        Ok(Self {
            label: label.to_string(),
            textured,
            pipeline,
            uniform_layout,
            texture_layout,
        })
    }

    /// A fresh uniform block for one object drawn with this program.
    pub fn uniforms(&self, device: &wgpu::Device) -> Uniforms {
        let data = UniformData::default();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Uniform Buffer", self.label)),
            contents: bytemuck::cast_slice(&[data]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });
        Uniforms {
            data,
            buffer,
            bind_group,
            dirty: false,
        }
    }

    /// Layout textures have to be bound with, `None` for untextured programs.
    pub fn texture_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.texture_layout.as_ref()
    }

    /// Makes this the active program for the following draws.
    pub fn use_program(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        camera: &wgpu::BindGroup,
        uniforms: &Uniforms,
    ) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(CAMERA_GROUP, camera, &[]);
        render_pass.set_bind_group(UNIFORM_GROUP, uniforms.bind_group(), &[]);
    }

    pub fn bind_texture(&self, render_pass: &mut wgpu::RenderPass<'_>, texture: &wgpu::BindGroup) {
        if self.textured {
            render_pass.set_bind_group(TEXTURE_GROUP, texture, &[]);
        } else {
            log::warn!("{} has no texture slot, ignoring bound texture", self.label);
        }
    }
}

/// Compiles both stages and links them, without touching the GPU.
pub fn compile_and_link(
    vertex_source: &str,
    fragment_source: &str,
    textured: bool,
) -> Result<(CompiledShader, CompiledShader), ShaderError> {
    let vertex = compile(ShaderStage::Vertex, vertex_source)?;
    let fragment = compile(ShaderStage::Fragment, fragment_source)?;
    link(&vertex, &fragment, textured)?;
    Ok((vertex, fragment))
}

fn read_source(file_name: &str) -> Result<String, ShaderError> {
    let path = asset_path(file_name);
    std::fs::read_to_string(&path).map_err(|source| {
        log::error!("Could not read shader file {}: {source}", path.display());
        ShaderError::Read { path, source }
    })
}

fn create_module(device: &wgpu::Device, label: &str, shader: &CompiledShader) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label} ({} stage)", shader.stage)),
        source: wgpu::ShaderSource::Wgsl(shader.source.as_str().into()),
    })
}

pub fn uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("uniform_bind_group_layout"),
    })
}
