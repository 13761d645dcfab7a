//! Active map ownership, portal and dialogue detection, and map swaps.
//!
//! A swap is requested when the player steps onto a portal. The target map is
//! fetched off the simulation path and delivered through a channel; the old
//! map stays authoritative until a later `update` installs the result.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use engine::tiled::{
    collect_dialogue_triggers, collect_portals, load_map, resolve_map_path, resolve_spawn,
    underscore_fallback, CollisionGrid, DialogueTrigger, MapData, MapLoadError, MapSource,
    Portal, TiledMapRenderer,
};
use engine::{AssetProvider, Rect, RenderSurface, Vec2};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::entity::{find_player, find_player_mut};
use super::presentation::SoundCue;
use super::session::{Terrain, TickContext};

pub(crate) const PORTAL_COOLDOWN_SECONDS: f32 = 0.5;
pub(crate) const DIALOGUE_SECONDS: f32 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MapState {
    Idle,
    Transitioning,
}

/// Where the portal fetch runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FetchMode {
    /// A named worker thread reads and parses the map.
    #[default]
    Background,
    /// The fetch completes inside the request; the install still waits for
    /// the next update.
    Inline,
}

#[derive(Debug, Clone)]
pub(crate) enum MapEvent {
    MapChanged { path: String, map: Arc<MapData> },
}

#[derive(Debug, Error)]
pub(crate) enum TransitionError {
    #[error(transparent)]
    Load(#[from] MapLoadError),
    #[error("map fetch for {path} ended without a result")]
    WorkerLost { path: String },
}

type FetchResult = Result<(String, MapData), MapLoadError>;

/// Reads `primary`; on failure tries `fallback` once when one is given.
/// Returns the path that actually loaded.
pub(crate) fn fetch_with_fallback(
    source: &dyn MapSource,
    primary: &str,
    fallback: Option<&str>,
) -> FetchResult {
    match load_map(source, primary) {
        Ok(map) => Ok((primary.to_string(), map)),
        Err(first) => {
            let Some(alternate) = fallback else {
                return Err(first);
            };
            warn!(
                path = primary,
                alternate,
                error = %first,
                "map_fetch_retrying_with_spaces"
            );
            load_map(source, alternate).map(|map| (alternate.to_string(), map))
        }
    }
}

struct PendingTransition {
    portal_id: u32,
    target_path: String,
    target_spawn: Option<String>,
    receiver: Receiver<FetchResult>,
}

struct InstalledMap {
    path: String,
    map: Arc<MapData>,
    terrain: Terrain,
    renderer: TiledMapRenderer,
    portals: Vec<Portal>,
    dialogue_triggers: Vec<DialogueTrigger>,
}

impl InstalledMap {
    fn build(path: String, map: Arc<MapData>, scale: f32) -> Self {
        let (world_w, world_h) = map.pixel_size(scale);
        let terrain = Terrain {
            grid: Arc::new(CollisionGrid::from_map(&map, scale)),
            world_size: Vec2::new(world_w, world_h),
        };
        Self {
            renderer: TiledMapRenderer::new(Arc::clone(&map), &path, scale),
            portals: collect_portals(&map, scale),
            dialogue_triggers: collect_dialogue_triggers(&map, scale),
            terrain,
            path,
            map,
        }
    }
}

pub(crate) struct MapManager {
    source: Arc<dyn MapSource>,
    fetch_mode: FetchMode,
    scale: f32,
    current: InstalledMap,
    state: MapState,
    pending: Option<PendingTransition>,
    portal_cooldown: f32,
    active_portal: Option<u32>,
    dialogue_inside: HashSet<usize>,
    /// Spent once-groups as (map path, group); survives map swaps.
    dialogue_used: HashSet<(String, String)>,
}

impl MapManager {
    /// Loads the first map synchronously.
    pub(crate) fn load(
        source: Arc<dyn MapSource>,
        fetch_mode: FetchMode,
        scale: f32,
        path: &str,
    ) -> Result<Self, MapLoadError> {
        let map = load_map(source.as_ref(), path)?;
        info!(path, width = map.width, height = map.height, "map_loaded");
        Ok(Self {
            source,
            fetch_mode,
            scale,
            current: InstalledMap::build(path.to_string(), Arc::new(map), scale),
            state: MapState::Idle,
            pending: None,
            portal_cooldown: 0.0,
            active_portal: None,
            dialogue_inside: HashSet::new(),
            dialogue_used: HashSet::new(),
        })
    }

    pub(crate) fn map_path(&self) -> &str {
        &self.current.path
    }

    pub(crate) fn map(&self) -> Arc<MapData> {
        Arc::clone(&self.current.map)
    }

    pub(crate) fn terrain(&self) -> &Terrain {
        &self.current.terrain
    }

    pub(crate) fn portals(&self) -> &[Portal] {
        &self.current.portals
    }

    pub(crate) fn spawn_point(&self, name: Option<&str>) -> Vec2 {
        resolve_spawn(&self.current.map, self.scale, name)
    }

    pub(crate) fn image_paths(&self) -> Vec<String> {
        self.current.renderer.image_paths()
    }

    pub(crate) fn state(&self) -> MapState {
        self.state
    }

    pub(crate) fn active_portal(&self) -> Option<u32> {
        self.active_portal
    }

    pub(crate) fn portal_cooldown(&self) -> f32 {
        self.portal_cooldown
    }

    /// Starts fetching the portal's target. Dropped while another swap is in
    /// flight or when the portal has no target.
    pub(crate) fn request_transition(&mut self, portal: &Portal) -> bool {
        if self.state == MapState::Transitioning {
            return false;
        }
        let Some(target) = portal.target_map.as_deref() else {
            return false;
        };
        let primary = resolve_map_path(&self.current.path, target);
        let fallback =
            underscore_fallback(target).map(|alternate| resolve_map_path(&self.current.path, &alternate));
        info!(
            portal_id = portal.id,
            portal = %portal.name,
            map = %primary,
            spawn = portal.target_spawn.as_deref().unwrap_or("-"),
            "map_transition_started"
        );

        let (sender, receiver) = mpsc::channel();
        match self.fetch_mode {
            FetchMode::Inline => {
                let result = fetch_with_fallback(self.source.as_ref(), &primary, fallback.as_deref());
                // The receiver is held below, so this cannot fail.
                let _ = sender.send(result);
            }
            FetchMode::Background => {
                let source = Arc::clone(&self.source);
                let thread_primary = primary.clone();
                let spawned = thread::Builder::new()
                    .name("map-fetch".to_string())
                    .spawn(move || {
                        let result =
                            fetch_with_fallback(source.as_ref(), &thread_primary, fallback.as_deref());
                        let _ = sender.send(result);
                    });
                if let Err(error) = spawned {
                    warn!(map = %primary, error = %error, "map_fetch_thread_spawn_failed");
                    return false;
                }
            }
        }

        self.state = MapState::Transitioning;
        self.pending = Some(PendingTransition {
            portal_id: portal.id,
            target_path: primary,
            target_spawn: portal.target_spawn.clone(),
            receiver,
        });
        true
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.poll_transition(ctx);

        if self.portal_cooldown > 0.0 {
            self.portal_cooldown -= ctx.dt;
        }
        let Some(player_bounds) = find_player(ctx.entities).map(|player| player.bounds()) else {
            return;
        };
        self.scan_portals(player_bounds);
        self.scan_dialogue(player_bounds, ctx);
    }

    fn poll_transition(&mut self, ctx: &mut TickContext<'_>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let outcome = match pending.receiver.try_recv() {
            Ok(result) => result.map_err(TransitionError::from),
            Err(TryRecvError::Empty) => {
                self.pending = Some(pending);
                return;
            }
            Err(TryRecvError::Disconnected) => Err(TransitionError::WorkerLost {
                path: pending.target_path.clone(),
            }),
        };

        self.state = MapState::Idle;
        self.portal_cooldown = PORTAL_COOLDOWN_SECONDS;
        match outcome {
            Ok((path, map)) => self.install(path, map, &pending, ctx),
            Err(error) => {
                warn!(
                    portal_id = pending.portal_id,
                    map = %pending.target_path,
                    error = %error,
                    "map_transition_failed"
                );
                self.active_portal = Some(pending.portal_id);
            }
        }
    }

    fn install(
        &mut self,
        path: String,
        map: MapData,
        pending: &PendingTransition,
        ctx: &mut TickContext<'_>,
    ) {
        let map = Arc::new(map);
        self.current = InstalledMap::build(path, Arc::clone(&map), self.scale);
        self.dialogue_inside.clear();
        ctx.session.terrain = self.current.terrain.clone();

        let spawn = self.spawn_point(pending.target_spawn.as_deref());
        let landed = find_player_mut(ctx.entities).map(|player| {
            player.set_position(spawn);
            player.bounds()
        });

        self.active_portal = landed
            .and_then(|bounds| {
                self.current
                    .portals
                    .iter()
                    .find(|portal| portal.rect.overlaps(&bounds))
                    .map(|portal| portal.id)
            })
            .or(Some(pending.portal_id));

        ctx.session.events.push(MapEvent::MapChanged {
            path: self.current.path.clone(),
            map,
        });
        ctx.hooks.play_cue(SoundCue::MapChanged);
        info!(
            path = %self.current.path,
            spawn = pending.target_spawn.as_deref().unwrap_or("PlayerSpawn"),
            x = spawn.x,
            y = spawn.y,
            "map_transition_completed"
        );
    }

    fn scan_portals(&mut self, player: Rect) {
        let mut fire = None;
        for portal in &self.current.portals {
            let overlap = portal.rect.overlaps(&player);
            if !overlap && self.active_portal == Some(portal.id) {
                self.active_portal = None;
            }
            if overlap
                && self.portal_cooldown <= 0.0
                && self.active_portal != Some(portal.id)
                && portal.target_map.is_some()
            {
                fire = Some(portal.clone());
                break;
            }
        }
        if let Some(portal) = fire {
            debug!(portal_id = portal.id, "portal_entered");
            self.request_transition(&portal);
        }
    }

    /// Fires the first trigger the player has just walked into.
    fn scan_dialogue(&mut self, player: Rect, ctx: &mut TickContext<'_>) {
        for (index, trigger) in self.current.dialogue_triggers.iter().enumerate() {
            let key = (self.current.path.clone(), trigger.group.clone());
            if trigger.once && self.dialogue_used.contains(&key) {
                continue;
            }
            if !trigger.rect.overlaps(&player) {
                self.dialogue_inside.remove(&index);
                continue;
            }
            if !self.dialogue_inside.insert(index) {
                continue;
            }
            ctx.session.show_dialogue(&trigger.text, DIALOGUE_SECONDS);
            ctx.hooks
                .show_dialogue(&trigger.text, (DIALOGUE_SECONDS * 1000.0) as u32);
            if trigger.once {
                self.dialogue_used.insert(key);
            }
            debug!(group = %trigger.group, "dialogue_triggered");
            break;
        }
    }

    pub(crate) fn draw(
        &self,
        surface: &mut dyn RenderSurface,
        assets: &mut dyn AssetProvider,
        view: Rect,
    ) -> usize {
        self.current.renderer.draw(surface, assets, view)
    }
}
