use anyhow::Result;
use cyberspace::{Engine, SceneManager, TitleScene, Vec2};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn main() -> Result<()> {
    // GPU backends are chatty at info; RUST_LOG still wins.
    let default = "info,wgpu_hal=off,wgpu_core=off,wgpu=off,naga=off";
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .try_init();

    log::info!("starting Lost in Cyberspace");
    let screen = Vec2::new(WIDTH as f32, HEIGHT as f32);
    Engine::new()
        .with_title("Lost in Cyberspace")
        .with_size(WIDTH, HEIGHT)
        .with_vsync(true)
        .with_asset_root("assets")
        .run(SceneManager::new(TitleScene::new(screen)))
}
