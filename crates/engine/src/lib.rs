use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod assets;
pub mod tiled;

pub use app::{
    run_app, world_to_screen, world_to_screen_px, Animator, AppError,
    Camera2D, DrawCommand, Entity, EntityId, InputAction, InputSnapshot, LoopConfig,
    RecordingSurface, Rect, RenderSurface, Scene, SceneCommand, SceneWorld, Vec2, Viewport,
};
pub use assets::{fetch_asset, AssetCache, AssetProvider, AssetStatus, ImageAsset};

pub const ROOT_ENV_VAR: &str = "SURVIVOR_ROOT";
pub const ASSETS_DIR_NAME: &str = "assets";

#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory every map and image path is relative to.
    pub root: PathBuf,
    pub assets_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error(
        "{env_var} is set but does not point to a directory containing assets/: {path}"
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error(
        "Could not find an assets/ directory in {start_dir} or any parent.\n\
Run from the project directory or set {env_var}, for example:\n\
export {env_var}=\"/path/to/survivor\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let env_root = match env::var(ROOT_ENV_VAR) {
        Ok(value) => Some(PathBuf::from(value)),
        Err(env::VarError::NotPresent) => None,
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: ROOT_ENV_VAR,
                source,
            })
        }
    };
    let cwd = env::current_dir().map_err(StartupError::CurrentDir)?;
    let root = resolve_root(env_root.as_deref(), &cwd)?;
    Ok(AppPaths {
        assets_dir: root.join(ASSETS_DIR_NAME),
        root,
    })
}

fn resolve_root(env_root: Option<&Path>, cwd: &Path) -> Result<PathBuf, StartupError> {
    if let Some(raw) = env_root {
        let normalized = normalize_path(raw);
        return if is_root_marker(&normalized) {
            Ok(normalized)
        } else {
            Err(StartupError::InvalidEnvRoot {
                path: normalized,
                env_var: ROOT_ENV_VAR,
            })
        };
    }

    cwd.ancestors()
        .find(|candidate| is_root_marker(candidate))
        .map(normalize_path)
        .ok_or_else(|| StartupError::RootNotFound {
            start_dir: normalize_path(cwd),
            env_var: ROOT_ENV_VAR,
        })
}

fn is_root_marker(path: &Path) -> bool {
    path.join(ASSETS_DIR_NAME).is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn root_is_found_by_walking_up_from_cwd() {
        let temp = TempDir::new().expect("temp dir");
        fs::create_dir_all(temp.path().join("assets")).expect("assets dir");
        let nested = temp.path().join("target").join("debug");
        fs::create_dir_all(&nested).expect("nested dir");

        let root = resolve_root(None, &nested).expect("root");
        assert_eq!(root, normalize_path(temp.path()));
    }

    #[test]
    fn env_root_must_contain_assets() {
        let temp = TempDir::new().expect("temp dir");
        let error = resolve_root(Some(temp.path()), temp.path()).expect_err("no assets dir");
        assert!(matches!(error, StartupError::InvalidEnvRoot { .. }));

        fs::create_dir_all(temp.path().join("assets")).expect("assets dir");
        assert!(resolve_root(Some(temp.path()), Path::new("/")).is_ok());
    }
}
