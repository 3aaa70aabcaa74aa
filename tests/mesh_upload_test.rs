#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
use common::test_utils::Gpu;
#[cfg(feature = "integration-tests")]
use snake_gl::data_structures::mesh::{GpuMesh, MeshData, Vertex};

#[test]
#[cfg(feature = "integration-tests")]
fn buffers_match_generated_data() {
    let gpu = Gpu::new();
    let vertex_size = std::mem::size_of::<Vertex>() as u64;

    let triangle = GpuMesh::new(&gpu.device, "triangle", &MeshData::triangle(0.5, 0.5));
    assert_eq!(triangle.vertex_buffer.size(), 3 * vertex_size);
    assert!(triangle.index_buffer.is_none());
    assert_eq!(triangle.num_elements, 3);

    let cube = GpuMesh::new(&gpu.device, "cube", &MeshData::cube(0.5, 0.5));
    assert_eq!(cube.vertex_buffer.size(), 24 * vertex_size);
    assert_eq!(cube.index_buffer.as_ref().map(|b| b.size()), Some(36 * 4));
    assert_eq!(cube.num_elements, 36);
    assert_eq!(cube.name, "cube");
}
