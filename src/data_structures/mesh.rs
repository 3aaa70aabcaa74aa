//! Procedural primitive meshes.
//!
//! [`MeshData`] holds CPU-side vertices (and indices where the shape needs
//! them) for triangles, quads and cubes. [`GpuMesh`] uploads that data into
//! vertex/index buffers and knows how to draw it.

use std::ops::Range;

use wgpu::util::DeviceExt;

/// White, the colour every generator uses unless told otherwise.
pub const DEFAULT_COLOUR: [f32; 3] = [1.0, 1.0, 1.0];

/// Cube faces sit at `z = +-CUBE_HALF_DEPTH` whatever the width and height.
pub const CUBE_HALF_DEPTH: f32 = 0.5;

const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub colour: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    const UNTEXTURED_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn new(position: [f32; 3], colour: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            colour,
            tex_coords,
        }
    }

    /// Buffer layout for shaders. Untextured layouts keep the same stride but
    /// don't expose the texture coordinates at location 2.
    pub fn desc(textured: bool) -> wgpu::VertexBufferLayout<'static> {
        let attributes: &'static [wgpu::VertexAttribute] = if textured {
            &Self::ATTRIBUTES
        } else {
            &Self::UNTEXTURED_ATTRIBUTES
        };
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    /// `None` for shapes drawn straight from the vertex list.
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn triangle(w: f32, h: f32) -> Self {
        Self::triangle_coloured(w, h, DEFAULT_COLOUR)
    }

    /// A triangle pointing up, `w` and `h` being half extents.
    pub fn triangle_coloured(w: f32, h: f32, colour: [f32; 3]) -> Self {
        Self {
            vertices: vec![
                Vertex::new([0.0, h, 0.0], colour, [1.0, 0.0]),
                Vertex::new([w, -h, 0.0], colour, [1.0, 1.0]),
                Vertex::new([-w, -h, 0.0], colour, [0.0, 1.0]),
            ],
            indices: None,
        }
    }

    pub fn quad(w: f32, h: f32) -> Self {
        Self::quad_coloured(w, h, DEFAULT_COLOUR)
    }

    /// An axis-aligned rectangle in the z = 0 plane made of two triangles.
    pub fn quad_coloured(w: f32, h: f32, colour: [f32; 3]) -> Self {
        let corners = [[w, h, 0.0], [w, -h, 0.0], [-w, -h, 0.0], [-w, h, 0.0]];
        Self {
            vertices: face(corners, colour).to_vec(),
            indices: Some(QUAD_INDICES.to_vec()),
        }
    }

    pub fn cube(w: f32, h: f32) -> Self {
        Self::cube_coloured(w, h, DEFAULT_COLOUR)
    }

    /// Six independent quads so every face gets its own texture coordinates.
    pub fn cube_coloured(w: f32, h: f32, colour: [f32; 3]) -> Self {
        let d = CUBE_HALF_DEPTH;
        let faces = [
            // back
            [[w, h, -d], [w, -h, -d], [-w, -h, -d], [-w, h, -d]],
            // front
            [[w, h, d], [w, -h, d], [-w, -h, d], [-w, h, d]],
            // bottom
            [[w, -h, -d], [w, -h, d], [-w, -h, d], [-w, -h, -d]],
            // top
            [[w, h, -d], [w, h, d], [-w, h, d], [-w, h, -d]],
            // right
            [[w, h, -d], [w, -h, -d], [w, -h, d], [w, h, d]],
            // left
            [[-w, h, d], [-w, -h, d], [-w, -h, -d], [-w, h, -d]],
        ];

        let vertices = faces
            .into_iter()
            .flat_map(|corners| face(corners, colour))
            .collect();
        let indices = (0..faces.len() as u32)
            .flat_map(|f| QUAD_INDICES.map(|i| 4 * f + i))
            .collect();

        Self {
            vertices,
            indices: Some(indices),
        }
    }

    /// Number of vertices a draw call has to process.
    pub fn num_elements(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertices.len() as u32,
        }
    }
}

fn face(corners: [[f32; 3]; 4], colour: [f32; 3]) -> [Vertex; 4] {
    let mut vertices = [Vertex::new([0.0; 3], colour, [0.0; 2]); 4];
    for ((vertex, position), tex_coords) in vertices.iter_mut().zip(corners).zip(QUAD_TEX_COORDS) {
        vertex.position = position;
        vertex.tex_coords = tex_coords;
    }
    vertices
}

/// Mesh data living in GPU buffers.
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub num_elements: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, name: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = data.indices.as_ref().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name} Index Buffer")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: data.num_elements(),
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        self.draw_instanced(render_pass, 0..1);
    }

    pub fn draw_instanced(&self, render_pass: &mut wgpu::RenderPass<'_>, instances: Range<u32>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.num_elements, 0, instances);
            }
            None => render_pass.draw(0..self.num_elements, instances),
        }
    }
}
