/**
 * This module contains all logic for loading shaders/textures/etc. from external files.
 *
 * Paths are relative to the asset root: `SNAKEGL_ASSETS` if set, otherwise `./assets`,
 * otherwise the copy of the crate's assets made at build time.
 */
pub mod texture;

use std::path::PathBuf;

use anyhow::Context;

pub const ASSETS_ENV: &str = "SNAKEGL_ASSETS";

pub fn asset_root() -> PathBuf {
    if let Some(root) = std::env::var_os(ASSETS_ENV) {
        return PathBuf::from(root);
    }
    let local = PathBuf::from("./assets");
    match option_env!("SNAKEGL_BUNDLED_ASSETS") {
        Some(bundled) if !local.is_dir() => PathBuf::from(bundled),
        _ => local,
    }
}

pub fn asset_path(file_name: &str) -> PathBuf {
    asset_root().join(file_name)
}

pub fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = asset_path(file_name);
    std::fs::read(&path).with_context(|| format!("reading {}", path.display()))
}
