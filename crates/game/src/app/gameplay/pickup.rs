use engine::{AssetProvider, EntityId, Rect, RenderSurface};
use tracing::info;

use super::entity::find_player_mut;
use super::presentation::SoundCue;
use super::session::TickContext;
use super::sprites::{draw_frame, note_missing_sprite, SpriteSheet};

pub(crate) const PICKUP_RADIUS: f32 = 42.0;
pub(crate) const HINT_TEXT: &str = "Press E";

const PLACEHOLDER_FILL: [u8; 4] = [0xdd, 0xb8, 0x5b, 255];
const PLACEHOLDER_STROKE: [u8; 4] = [0x4a, 0x3a, 0x15, 255];
const HINT_COLOR: [u8; 4] = [255, 255, 255, 255];

const BAT_SPRITE: SpriteSheet =
    SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Objects/Pickable/Bat.png", 1);
const KNIFE_SPRITE: SpriteSheet =
    SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Objects/Pickable/Knife.png", 1);

pub(crate) fn pickup_sprite(item_id: &str) -> Option<SpriteSheet> {
    match item_id {
        "bat" => Some(BAT_SPRITE),
        "knife" => Some(KNIFE_SPRITE),
        _ => None,
    }
}

pub(crate) fn pickup_sprite_paths() -> Vec<&'static str> {
    vec![BAT_SPRITE.path, KNIFE_SPRITE.path]
}

#[derive(Debug, Clone)]
pub(crate) struct ItemPickup {
    bounds: Rect,
    item_id: String,
    sprite: Option<SpriteSheet>,
    collected_key: String,
    auto_collect: bool,
    show_hint: bool,
}

impl ItemPickup {
    pub(crate) fn new(bounds: Rect, item_id: &str, collected_key: String, auto_collect: bool) -> Self {
        Self {
            bounds,
            item_id: item_id.to_string(),
            sprite: pickup_sprite(item_id),
            collected_key,
            auto_collect,
            show_hint: false,
        }
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    pub(crate) fn item_id(&self) -> &str {
        &self.item_id
    }

    pub(crate) fn collected_key(&self) -> &str {
        &self.collected_key
    }

    pub(crate) fn hint_visible(&self) -> bool {
        self.show_hint
    }

    pub(crate) fn update(&mut self, id: EntityId, ctx: &mut TickContext<'_>) {
        if ctx.session.collected.contains(&self.collected_key) {
            ctx.entities.despawn(id);
            return;
        }
        let center = self.bounds.center();
        let Some(player) = find_player_mut(ctx.entities) else {
            self.show_hint = false;
            return;
        };
        if player.is_dead() {
            self.show_hint = false;
            return;
        }
        self.show_hint = player.bounds().center().distance(center) <= PICKUP_RADIUS;
        if !self.show_hint || !(self.auto_collect || player.interact_pressed()) {
            return;
        }

        player.add_item(&self.item_id);
        ctx.session.collected.insert(self.collected_key.clone());
        ctx.hooks.play_cue(SoundCue::Pickup);
        info!(item = %self.item_id, key = %self.collected_key, "item_collected");
        ctx.entities.despawn(id);
    }

    pub(crate) fn draw(&mut self, surface: &mut dyn RenderSurface, assets: &mut dyn AssetProvider) {
        let dst = self.bounds;
        let drawn = match &self.sprite {
            Some(sheet) => {
                let drawn = draw_frame(surface, assets, sheet, 0, |_| dst);
                if !drawn {
                    note_missing_sprite(assets, "pickup", sheet.path);
                }
                drawn
            }
            None => false,
        };
        if !drawn {
            surface.fill_rect(self.bounds, PLACEHOLDER_FILL);
            surface.stroke_rect(self.bounds, 2.0, PLACEHOLDER_STROKE);
        }
        if self.show_hint {
            surface.fill_text(HINT_TEXT, self.bounds.x - 6.0, self.bounds.y - 8.0, HINT_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::entity::{find_player, EntityBody};
    use crate::app::gameplay::player::Player;
    use crate::app::gameplay::presentation::recording::RecordingPresentation;
    use crate::app::gameplay::session::{SessionState, Terrain};
    use engine::{InputAction, InputSnapshot, RecordingSurface, SceneWorld, Vec2};

    struct Fixture {
        entities: SceneWorld<EntityBody>,
        session: SessionState,
        hooks: RecordingPresentation,
        pickup_id: EntityId,
    }

    impl Fixture {
        fn new(player_at: Vec2, auto_collect: bool) -> Self {
            let mut entities = SceneWorld::default();
            entities.spawn(EntityBody::Player(Player::new(player_at, 140.0)));
            let pickup_id = entities.spawn(EntityBody::Pickup(ItemPickup::new(
                Rect::new(100.0, 100.0, 30.0, 30.0),
                "bat",
                "./maps/bedroom.tmj:bat".to_string(),
                auto_collect,
            )));
            entities.apply_pending();
            Self {
                entities,
                session: SessionState::new(Terrain::open(Vec2::new(800.0, 600.0))),
                hooks: RecordingPresentation::default(),
                pickup_id,
            }
        }

        /// Updates the player then the pickup, the way the world orders them.
        fn tick(&mut self, input: &InputSnapshot) {
            for index in 0..self.entities.entity_count() {
                let id = self.entities.entities()[index].id;
                let Some(mut body) = self.entities.take_body(index) else {
                    continue;
                };
                let mut ctx = TickContext {
                    dt: 1.0 / 60.0,
                    input,
                    entities: &mut self.entities,
                    session: &mut self.session,
                    hooks: &mut self.hooks,
                };
                body.update(id, &mut ctx);
                self.entities.restore_body(index, body);
            }
            self.entities.apply_pending();
        }

        fn pickup_present(&self) -> bool {
            self.entities.find_entity(self.pickup_id).is_some()
        }
    }

    #[test]
    fn auto_pickup_collects_inside_the_radius() {
        let mut fixture = Fixture::new(Vec2::new(90.0, 85.0), true);
        fixture.tick(&InputSnapshot::empty());

        assert!(!fixture.pickup_present());
        let player = find_player(&fixture.entities).expect("player");
        assert!(player.has_item("bat"));
        assert_eq!(player.equipped(), Some("bat"));
        assert!(fixture.session.collected.contains("./maps/bedroom.tmj:bat"));
        assert_eq!(fixture.hooks.cue_count(SoundCue::Pickup), 1);
    }

    #[test]
    fn manual_pickup_waits_for_interact() {
        let mut fixture = Fixture::new(Vec2::new(90.0, 85.0), false);
        fixture.tick(&InputSnapshot::empty());
        assert!(fixture.pickup_present());

        fixture.tick(&InputSnapshot::empty().with_action_pressed(InputAction::Interact));
        assert!(!fixture.pickup_present());
    }

    #[test]
    fn distant_player_sees_no_hint() {
        let mut fixture = Fixture::new(Vec2::new(400.0, 400.0), true);
        fixture.tick(&InputSnapshot::empty());
        assert!(fixture.pickup_present());
        let hint = fixture
            .entities
            .find_entity(fixture.pickup_id)
            .and_then(|entity| match entity.body() {
                Some(EntityBody::Pickup(pickup)) => Some(pickup.hint_visible()),
                _ => None,
            });
        assert_eq!(hint, Some(false));
    }

    #[test]
    fn already_collected_pickup_removes_itself() {
        let mut fixture = Fixture::new(Vec2::new(400.0, 400.0), true);
        fixture
            .session
            .collected
            .insert("./maps/bedroom.tmj:bat".to_string());
        fixture.tick(&InputSnapshot::empty());
        assert!(!fixture.pickup_present());
        assert_eq!(fixture.hooks.cue_count(SoundCue::Pickup), 0);
    }

    #[test]
    fn near_pickup_draws_the_hint() {
        let mut pickup = ItemPickup::new(
            Rect::new(10.0, 10.0, 30.0, 30.0),
            "medkit",
            "x:medkit".to_string(),
            false,
        );
        pickup.show_hint = true;
        let mut surface = RecordingSurface::new(800, 600);
        let mut assets = engine::AssetCache::new(std::env::temp_dir().join("survivor-no-assets"));

        pickup.draw(&mut surface, &mut assets);

        assert_eq!(surface.texts(), vec![HINT_TEXT]);
        assert_eq!(surface.fill_draws().count(), 1);
    }
}
