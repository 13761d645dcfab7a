use std::collections::HashSet;
use std::sync::Arc;

use engine::tiled::CollisionGrid;
use engine::{InputSnapshot, Rect, SceneWorld, Vec2};

use super::entity::EntityBody;
use super::map_manager::MapEvent;
use super::presentation::PresentationHooks;

/// Walkable space shared by every mover: the collision grid and the world extent.
#[derive(Debug, Clone)]
pub(crate) struct Terrain {
    pub(crate) grid: Arc<CollisionGrid>,
    pub(crate) world_size: Vec2,
}

impl Terrain {
    /// No collision layer; only the world edges stop movement.
    pub(crate) fn open(world_size: Vec2) -> Self {
        Self {
            grid: Arc::new(CollisionGrid::empty()),
            world_size,
        }
    }

    pub(crate) fn clamp(&self, bounds: Rect) -> Rect {
        let max_x = (self.world_size.x - bounds.width).max(0.0);
        let max_y = (self.world_size.y - bounds.height).max(0.0);
        Rect::new(
            bounds.x.clamp(0.0, max_x),
            bounds.y.clamp(0.0, max_y),
            bounds.width,
            bounds.height,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DialogueBubble {
    pub(crate) text: String,
    pub(crate) remaining: f32,
}

/// Per-session state that outlives any single map.
pub(crate) struct SessionState {
    pub(crate) terrain: Terrain,
    pub(crate) game_over: bool,
    pub(crate) zombies_enabled: bool,
    pub(crate) collected: HashSet<String>,
    pub(crate) dialogue: Option<DialogueBubble>,
    pub(crate) events: Vec<MapEvent>,
}

impl SessionState {
    pub(crate) fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            game_over: false,
            zombies_enabled: false,
            collected: HashSet::new(),
            dialogue: None,
            events: Vec::new(),
        }
    }

    pub(crate) fn show_dialogue(&mut self, text: &str, seconds: f32) {
        self.dialogue = Some(DialogueBubble {
            text: text.to_string(),
            remaining: seconds,
        });
    }

    pub(crate) fn tick_dialogue(&mut self, dt: f32) {
        if let Some(bubble) = &mut self.dialogue {
            bubble.remaining -= dt;
            if bubble.remaining <= 0.0 {
                self.dialogue = None;
            }
        }
    }
}

/// Everything an entity may touch while its body is lent out of the list.
pub(crate) struct TickContext<'a> {
    pub(crate) dt: f32,
    pub(crate) input: &'a InputSnapshot,
    pub(crate) entities: &'a mut SceneWorld<EntityBody>,
    pub(crate) session: &'a mut SessionState,
    pub(crate) hooks: &'a mut dyn PresentationHooks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_bounds_inside_the_world() {
        let terrain = Terrain::open(Vec2::new(800.0, 600.0));
        let clamped = terrain.clamp(Rect::new(790.0, -5.0, 40.0, 40.0));
        assert_eq!(clamped, Rect::new(760.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn clamp_pins_oversized_bounds_to_the_origin() {
        let terrain = Terrain::open(Vec2::new(30.0, 30.0));
        let clamped = terrain.clamp(Rect::new(10.0, 10.0, 40.0, 40.0));
        assert_eq!((clamped.x, clamped.y), (0.0, 0.0));
    }

    #[test]
    fn dialogue_expires_after_its_countdown() {
        let mut session = SessionState::new(Terrain::open(Vec2::new(800.0, 600.0)));
        session.show_dialogue("hello", 2.5);

        session.tick_dialogue(2.0);
        assert!(session.dialogue.is_some());
        session.tick_dialogue(0.5);
        assert!(session.dialogue.is_none());
    }
}
