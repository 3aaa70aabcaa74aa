use snake_gl::{
    app::{self, EmptyScene},
    config::{CameraConfig, WindowConfig},
};

fn main() -> anyhow::Result<()> {
    app::run(
        WindowConfig::from_env(),
        CameraConfig::default().fixed(true),
        |_| Ok(EmptyScene),
    )
}
