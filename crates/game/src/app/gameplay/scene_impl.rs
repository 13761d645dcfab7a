use std::sync::Arc;

use engine::tiled::MapSource;
use engine::{AssetProvider, InputAction, InputSnapshot, RenderSurface, Scene, SceneCommand};
use tracing::info;

use super::presentation::TracingPresentation;
use super::world::{GameWorld, WorldSettings};

/// The survival game as an engine scene. The world is built on `load` so the
/// first map's images can be requested from the provider up front.
pub(crate) struct SurvivalScene {
    settings: WorldSettings,
    source: Arc<dyn MapSource>,
    world: Option<GameWorld>,
}

impl SurvivalScene {
    pub(crate) fn new(settings: WorldSettings, source: Arc<dyn MapSource>) -> Self {
        Self {
            settings,
            source,
            world: None,
        }
    }
}

impl Scene for SurvivalScene {
    fn load(&mut self, assets: &mut dyn AssetProvider) {
        let world = GameWorld::new(
            self.settings.clone(),
            Arc::clone(&self.source),
            Box::new(TracingPresentation),
        );
        let mut requested = 0;
        if let Some(manager) = world.map_manager() {
            for path in manager.image_paths() {
                assets.request_asset(&path);
                requested += 1;
            }
        }
        info!(
            map = %self.settings.start_map,
            images = requested,
            entities = world.entities().entity_count(),
            "scene_loaded"
        );
        self.world = Some(world);
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        let Some(world) = self.world.as_mut() else {
            return SceneCommand::None;
        };
        if world.is_game_over() {
            if input.was_pressed(InputAction::Restart) {
                world.restart();
            }
            return SceneCommand::None;
        }
        world.tick(fixed_dt_seconds, input);
        SceneCommand::None
    }

    fn render(&mut self, surface: &mut dyn RenderSurface, assets: &mut dyn AssetProvider) {
        if let Some(world) = self.world.as_mut() {
            world.render(surface, assets);
        }
    }

    fn unload(&mut self) {
        if self.world.take().is_some() {
            info!("scene_unloaded");
        }
    }

    fn entity_count(&self) -> usize {
        self.world
            .as_ref()
            .map_or(0, |world| world.entities().entity_count())
    }

    fn debug_title(&self) -> Option<String> {
        let world = self.world.as_ref()?;
        let map = world
            .map_manager()
            .map_or("(no map)", |manager| manager.map_path());
        let health = world.player().map_or(0, |player| player.health());
        Some(format!("{map} | hp {health}"))
    }
}
