use crate::data_structures::texture::Texture;

use super::load_binary;

/// Reads `file_name` from the asset root and uploads it.
pub fn load_texture(
    file_name: &str,
    alpha: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(file_name)?;
    Texture::from_bytes(device, queue, &data, file_name, alpha)
}

/// Like [`load_texture`] but never fails: problems are logged and a blank
/// white texture is used instead so rendering can carry on.
pub fn load_texture_or_blank(
    file_name: &str,
    alpha: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Texture {
    match load_texture(file_name, alpha, device, queue) {
        Ok(texture) => texture,
        Err(e) => {
            log::error!("Failed to load texture {file_name}: {e:#}");
            Texture::create_blank(device, queue)
        }
    }
}
