use std::sync::Arc;

use engine::app::{text_width_px, TEXT_HEIGHT_PX};
use engine::tiled::{MapData, MapSource};
use engine::{
    world_to_screen_px, AssetProvider, EntityId, InputSnapshot, Rect, RenderSurface, SceneWorld,
    Vec2,
};
use tracing::{error, info};

use super::entity::{find_player, EntityBody, EntityKind};
use super::map_manager::{FetchMode, MapEvent, MapManager};
use super::pickup::ItemPickup;
use super::player::Player;
use super::presentation::PresentationHooks;
use super::session::{SessionState, Terrain, TickContext};
use super::spawners::{pickup_spawns, zombie_spawns, zombies_enabled};
use super::zombie::Zombie;

pub(crate) const FALLBACK_PLAYER_POSITION: Vec2 = Vec2::new(400.0, 300.0);

const BUBBLE_PADDING: f32 = 6.0;
const BUBBLE_HEIGHT: f32 = 20.0;
const BUBBLE_OFFSET: f32 = 28.0;
const BUBBLE_FILL: [u8; 4] = [255, 255, 255, 230];
const BUBBLE_STROKE: [u8; 4] = [0, 0, 0, 255];
const BUBBLE_TEXT: [u8; 4] = [0, 0, 0, 255];
const GAME_OVER_TEXT: &str = "GAME OVER - PRESS R";
const GAME_OVER_COLOR: [u8; 4] = [220, 40, 40, 255];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WorldSettings {
    pub(crate) start_map: String,
    pub(crate) start_spawn: Option<String>,
    pub(crate) map_scale: f32,
    pub(crate) player_speed: f32,
    pub(crate) viewport: (u32, u32),
    pub(crate) fetch_mode: FetchMode,
}

/// Entity list, session state and the orchestration that ties them together.
pub(crate) struct GameWorld {
    settings: WorldSettings,
    source: Arc<dyn MapSource>,
    hooks: Box<dyn PresentationHooks>,
    entities: SceneWorld<EntityBody>,
    session: SessionState,
    map_id: Option<EntityId>,
    viewport: (u32, u32),
}

fn viewport_size(viewport: (u32, u32)) -> Vec2 {
    Vec2::new(viewport.0 as f32, viewport.1 as f32)
}

impl GameWorld {
    pub(crate) fn new(
        settings: WorldSettings,
        source: Arc<dyn MapSource>,
        hooks: Box<dyn PresentationHooks>,
    ) -> Self {
        let viewport = settings.viewport;
        let mut world = Self {
            session: SessionState::new(Terrain::open(viewport_size(viewport))),
            settings,
            source,
            hooks,
            entities: SceneWorld::default(),
            map_id: None,
            viewport,
        };
        world.setup();
        world
    }

    /// Builds the session from the start map. The first load is synchronous.
    fn setup(&mut self) {
        self.entities.clear();
        self.session = SessionState::new(Terrain::open(viewport_size(self.viewport)));
        self.map_id = None;

        let loaded = MapManager::load(
            Arc::clone(&self.source),
            self.settings.fetch_mode,
            self.settings.map_scale,
            &self.settings.start_map,
        );
        match loaded {
            Ok(manager) => {
                let spawn = manager.spawn_point(self.settings.start_spawn.as_deref());
                let path = manager.map_path().to_string();
                let map = manager.map();
                self.session.terrain = manager.terrain().clone();
                self.entities
                    .spawn(EntityBody::Player(Player::new(spawn, self.settings.player_speed)));
                self.map_id = Some(self.entities.spawn(EntityBody::Map(manager)));
                self.populate_map(&path, &map);
            }
            Err(load_error) => {
                error!(
                    map = %self.settings.start_map,
                    error = %load_error,
                    "initial_map_load_failed"
                );
                self.entities.spawn(EntityBody::Player(Player::new(
                    FALLBACK_PLAYER_POSITION,
                    self.settings.player_speed,
                )));
                self.session.zombies_enabled = false;
            }
        }
        self.finish_pass();
        info!(
            map = %self.settings.start_map,
            entities = self.entities.entity_count(),
            zombies_enabled = self.session.zombies_enabled,
            "world_ready"
        );
    }

    pub(crate) fn restart(&mut self) {
        info!("world_restart");
        self.setup();
    }

    /// Replaces zombies and pickups with the ones the installed map places.
    fn populate_map(&mut self, path: &str, map: &MapData) {
        let stale: Vec<EntityId> = self
            .entities
            .entities()
            .iter()
            .filter(|entity| {
                matches!(
                    entity.body().map(EntityBody::kind),
                    Some(EntityKind::Zombie | EntityKind::Pickup)
                )
            })
            .map(|entity| entity.id)
            .collect();
        for id in stale {
            self.entities.despawn(id);
        }

        self.session.zombies_enabled = zombies_enabled(path, map);
        let scale = self.settings.map_scale;
        let mut zombies = 0;
        if self.session.zombies_enabled {
            for spawn in zombie_spawns(map, scale) {
                self.entities.spawn(EntityBody::Zombie(Zombie::new(
                    spawn.position,
                    spawn.variant,
                    spawn.facing,
                )));
                zombies += 1;
            }
        }
        let pickups = pickup_spawns(path, map, scale, &self.session.collected);
        let pickup_count = pickups.len();
        for spawn in pickups {
            self.entities.spawn(EntityBody::Pickup(ItemPickup::new(
                spawn.bounds,
                &spawn.item_id,
                spawn.collected_key,
                spawn.auto_collect,
            )));
        }
        info!(
            map = path,
            zombies,
            pickups = pickup_count,
            zombies_enabled = self.session.zombies_enabled,
            "map_populated"
        );
    }

    /// Applies deferred list changes, keeps the map drawing first and
    /// recentres the camera.
    fn finish_pass(&mut self) {
        self.entities.apply_pending();
        if let Some(map_id) = self.map_id {
            self.entities.move_to_back(map_id);
        }
        let world_size = self.session.terrain.world_size;
        if let Some(bounds) = find_player(&self.entities).map(Player::bounds) {
            let viewport = self.viewport;
            self.entities
                .camera_mut()
                .follow(&bounds, viewport, world_size);
        }
    }

    pub(crate) fn tick(&mut self, dt: f32, input: &InputSnapshot) {
        let (width, height) = input.window_size();
        if width > 0 && height > 0 {
            self.viewport = (width, height);
        }
        if self.session.game_over {
            return;
        }

        for index in 0..self.entities.entity_count() {
            let entity = &self.entities.entities()[index];
            if entity.remove_from_world {
                continue;
            }
            let id = entity.id;
            let Some(mut body) = self.entities.take_body(index) else {
                continue;
            };
            let mut ctx = TickContext {
                dt,
                input,
                entities: &mut self.entities,
                session: &mut self.session,
                hooks: self.hooks.as_mut(),
            };
            body.update(id, &mut ctx);
            self.entities.restore_body(index, body);
        }

        for event in std::mem::take(&mut self.session.events) {
            match event {
                MapEvent::MapChanged { path, map } => self.populate_map(&path, &map),
            }
        }
        self.finish_pass();
        self.session.tick_dialogue(dt);
    }

    pub(crate) fn render(&mut self, surface: &mut dyn RenderSurface, assets: &mut dyn AssetProvider) {
        let camera = self.entities.camera().position;
        let view = self.entities.camera().visible_rect(self.viewport);

        surface.save();
        surface.translate(-camera.x, -camera.y);
        for entity in self.entities.entities_mut().iter_mut().rev() {
            if let Some(body) = entity.body_mut() {
                body.draw(surface, assets, view);
            }
        }
        surface.restore();

        self.draw_dialogue_bubble(surface);
        if self.session.game_over {
            let (width, height) = surface.size();
            let text_width = text_width_px(GAME_OVER_TEXT);
            surface.fill_text(
                GAME_OVER_TEXT,
                (width as f32 - text_width) / 2.0,
                height as f32 / 2.0,
                GAME_OVER_COLOR,
            );
        }
    }

    /// Screen-space bubble centred above the player, snapped to whole pixels.
    fn draw_dialogue_bubble(&self, surface: &mut dyn RenderSurface) {
        let Some(bubble) = &self.session.dialogue else {
            return;
        };
        let Some(player) = find_player(&self.entities) else {
            return;
        };
        let bounds = player.bounds();
        let width = text_width_px(&bubble.text) + BUBBLE_PADDING * 2.0;
        let anchor = Vec2::new(bounds.center().x, bounds.y - BUBBLE_OFFSET);
        let (anchor_x, anchor_y) = world_to_screen_px(anchor, self.entities.camera());
        let x = anchor_x as f32 - width / 2.0;
        let y = anchor_y as f32;
        let rect = Rect::new(x, y, width, BUBBLE_HEIGHT);
        surface.fill_rect(rect, BUBBLE_FILL);
        surface.stroke_rect(rect, 2.0, BUBBLE_STROKE);
        surface.fill_text(
            &bubble.text,
            x + BUBBLE_PADDING,
            y + (BUBBLE_HEIGHT - TEXT_HEIGHT_PX as f32) / 2.0,
            BUBBLE_TEXT,
        );
    }

    pub(crate) fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub(crate) fn entities(&self) -> &SceneWorld<EntityBody> {
        &self.entities
    }

    pub(crate) fn session(&self) -> &SessionState {
        &self.session
    }

    pub(crate) fn is_game_over(&self) -> bool {
        self.session.game_over
    }

    pub(crate) fn player(&self) -> Option<&Player> {
        find_player(&self.entities)
    }

    pub(crate) fn map_manager(&self) -> Option<&MapManager> {
        let entity = self.entities.find_entity(self.map_id?)?;
        match entity.body() {
            Some(EntityBody::Map(manager)) => Some(manager),
            _ => None,
        }
    }

    pub(crate) fn zombies(&self) -> impl Iterator<Item = &Zombie> {
        self.entities
            .entities()
            .iter()
            .filter_map(|entity| match entity.body() {
                Some(EntityBody::Zombie(zombie)) => Some(zombie),
                _ => None,
            })
    }

    pub(crate) fn pickups(&self) -> impl Iterator<Item = &ItemPickup> {
        self.entities
            .entities()
            .iter()
            .filter_map(|entity| match entity.body() {
                Some(EntityBody::Pickup(pickup)) => Some(pickup),
                _ => None,
            })
    }

    #[cfg(test)]
    pub(crate) fn entities_mut(&mut self) -> &mut SceneWorld<EntityBody> {
        &mut self.entities
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }
}
