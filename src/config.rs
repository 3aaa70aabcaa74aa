//! Window and camera settings.
//!
//! Both structs carry sensible defaults for a small square window and
//! can be adjusted through builder methods before being handed to
//! [`crate::app::run`]. [`WindowConfig::from_env`] additionally honours a few
//! `SNAKEGL_*` environment variables so demos can be resized without a rebuild.

use std::str::FromStr;

use cgmath::{Deg, Point3, Vector3};

use crate::camera::{PITCH, SENSITIVITY, SPEED, YAW, ZOOM};

pub const DEFAULT_TITLE: &str = "SnakeGL";
pub const DEFAULT_WIDTH: u32 = 750;
pub const DEFAULT_HEIGHT: u32 = 750;

/// The grey the scaffold clears to.
pub const DEFAULT_CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.138,
    g: 0.138,
    b: 0.138,
    a: 1.0,
};

/// Window creation and per-frame presentation settings.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_colour: wgpu::Color,
    /// Hide the cursor and lock it to the window so mouse motion drives the camera.
    pub grab_cursor: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            clear_colour: DEFAULT_CLEAR_COLOUR,
            grab_cursor: true,
            vsync: true,
        }
    }
}

impl WindowConfig {
    /// Defaults overridden by `SNAKEGL_TITLE`, `SNAKEGL_WIDTH` and `SNAKEGL_HEIGHT`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`. Values that don't parse
    /// (or sizes of zero) are reported and skipped.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(title) = lookup("SNAKEGL_TITLE") {
            self.title = title;
        }
        if let Some(width) = parse_size(&lookup, "SNAKEGL_WIDTH") {
            self.width = width;
        }
        if let Some(height) = parse_size(&lookup, "SNAKEGL_HEIGHT") {
            self.height = height;
        }
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: wgpu::Color) -> Self {
        self.clear_colour = clear_colour;
        self
    }

    pub fn with_grab_cursor(mut self, grab_cursor: bool) -> Self {
        self.grab_cursor = grab_cursor;
        self
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

fn parse_size<F>(lookup: &F, key: &str) -> Option<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match u32::from_str(raw.trim()) {
        Ok(0) => {
            log::warn!("Ignoring {key}=0, a window needs a non-zero size");
            None
        }
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring {key}={raw:?}: {e}");
            None
        }
    }
}

/// Initial camera placement and tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    pub world_up: Vector3<f32>,
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
    /// A fixed camera ignores every kind of input.
    pub fixed: bool,
    pub speed: f32,
    pub sensitivity: f32,
    pub fov: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 3.0),
            world_up: Vector3::unit_y(),
            yaw: Deg(YAW),
            pitch: Deg(PITCH),
            fixed: false,
            speed: SPEED,
            sensitivity: SENSITIVITY,
            fov: Deg(ZOOM),
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl CameraConfig {
    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn at(mut self, position: impl Into<Point3<f32>>) -> Self {
        self.position = position.into();
        self
    }

    pub fn looking(mut self, yaw: Deg<f32>, pitch: Deg<f32>) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_snake_window() {
        let config = WindowConfig::default();
        assert_eq!(config.title, "SnakeGL");
        assert_eq!((config.width, config.height), (750, 750));
        assert_eq!(config.clear_colour, DEFAULT_CLEAR_COLOUR);
        assert!(config.grab_cursor);
        assert_eq!(config.aspect(), 1.0);
    }

    #[test]
    fn overrides_are_applied() {
        let config = WindowConfig::default().with_overrides(lookup(&[
            ("SNAKEGL_TITLE", "Cube"),
            ("SNAKEGL_WIDTH", "1024"),
            ("SNAKEGL_HEIGHT", " 512 "),
        ]));
        assert_eq!(config.title, "Cube");
        assert_eq!((config.width, config.height), (1024, 512));
        assert_eq!(config.aspect(), 2.0);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let config = WindowConfig::default().with_overrides(lookup(&[
            ("SNAKEGL_WIDTH", "wide"),
            ("SNAKEGL_HEIGHT", "0"),
        ]));
        assert_eq!((config.width, config.height), (750, 750));
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let config = WindowConfig::default().with_size(100, 0);
        assert_eq!(config.aspect(), 100.0);
    }

    #[test]
    fn camera_defaults() {
        let config = CameraConfig::default();
        assert_eq!(config.position, Point3::new(0.0, 0.0, 3.0));
        assert_eq!(config.yaw, Deg(-90.0));
        assert_eq!(config.pitch, Deg(0.0));
        assert_eq!(config.fov, Deg(45.0));
        assert!(!config.fixed);
    }
}
