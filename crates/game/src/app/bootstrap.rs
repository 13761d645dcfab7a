use std::sync::Arc;

use engine::tiled::{FsMapSource, MapSource};
use engine::{resolve_app_paths, AssetCache, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, GameConfig};
use super::gameplay::{self, SurvivalScene};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) assets: AssetCache,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Survivor Startup ===");

    let paths = resolve_app_paths()?;
    let game = GameConfig::load(&paths.root)?;
    info!(
        root = %paths.root.display(),
        start_map = %game.start_map,
        fetch_mode = ?game.fetch_mode,
        "config_loaded"
    );

    let mut assets = AssetCache::new(paths.assets_dir.clone());
    for path in gameplay::sprite_preload_paths() {
        assets.queue_download(path);
    }
    assets.download_all();

    let source: Arc<dyn MapSource> = Arc::new(FsMapSource::new(paths.assets_dir));
    let scene = SurvivalScene::new(game.to_world_settings(), source);
    let config = LoopConfig {
        window_title: "Survivor".to_string(),
        window_width: game.window_width,
        window_height: game.window_height,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: Box::new(scene),
        assets,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
