use std::collections::BTreeSet;

use engine::tiled::slide_move;
use engine::{
    Animator, AssetProvider, InputAction, InputSnapshot, Rect, RenderSurface, SceneWorld, Vec2,
};
use tracing::{debug, info};

use super::combat::{
    in_attack_range, tick_down, weapon_profile, Attacker, DirectionTable, Facing, HitSet,
    HostileRoster, WeaponProfile, BARE_HANDS,
};
use super::entity::EntityBody;
use super::presentation::{PresentationHooks, SoundCue};
use super::session::{Terrain, TickContext};
use super::sprites::{draw_frame, note_missing_sprite, SpriteSheet};

pub(crate) const PLAYER_SCALE: f32 = 4.0;
pub(crate) const PLAYER_WIDTH: f32 = 14.0 * PLAYER_SCALE;
pub(crate) const PLAYER_HEIGHT: f32 = 17.0 * PLAYER_SCALE;
pub(crate) const PLAYER_MAX_HEALTH: u32 = 100;
pub(crate) const INVINCIBILITY_SECONDS: f32 = 0.75;

const RUN_FRAME_SECONDS: f32 = 0.10;
const PLACEHOLDER_COLOR: [u8; 4] = [66, 135, 196, 255];

const RUN_SHEETS: DirectionTable<SpriteSheet> = DirectionTable::new(
    SpriteSheet::new("./sprites/character/run/Character_up_run-Sheet6.png", 6),
    SpriteSheet::new("./sprites/character/run/Character_down_run-Sheet6.png", 6),
    SpriteSheet::new("./sprites/character/run/Character_side-left_run-Sheet6.png", 6),
    SpriteSheet::new("./sprites/character/run/Character_side_run-Sheet6.png", 6),
);

const PUNCH_SHEETS: DirectionTable<SpriteSheet> = DirectionTable::new(
    SpriteSheet::new("./sprites/character/punch/Character_up_punch-Sheet4.png", 4),
    SpriteSheet::new("./sprites/character/punch/Character_down_punch-Sheet4.png", 4),
    SpriteSheet::new("./sprites/character/punch/Character_side-left_punch-Sheet4.png", 4),
    SpriteSheet::new("./sprites/character/punch/Character_side_punch-Sheet4.png", 4),
);

const BAT_RUN_SHEETS: DirectionTable<SpriteSheet> = DirectionTable::new(
    SpriteSheet::new(
        "./PostApocalypse_AssetPack_v1.1.2/Character/Bat/Bat_up_idle-and-run-Sheet6.png",
        6,
    ),
    SpriteSheet::new(
        "./PostApocalypse_AssetPack_v1.1.2/Character/Bat/Bat_down_idle-and-run-Sheet6.png",
        6,
    ),
    SpriteSheet::new(
        "./PostApocalypse_AssetPack_v1.1.2/Character/Bat/Bat_side-left_idle-and-run-Sheet6.png",
        6,
    ),
    SpriteSheet::new(
        "./PostApocalypse_AssetPack_v1.1.2/Character/Bat/Bat_side_idle-and-run-Sheet6.png",
        6,
    ),
);

const BAT_ATTACK_SHEETS: DirectionTable<SpriteSheet> = DirectionTable::new(
    SpriteSheet::new(
        "./PostApocalypse_AssetPack_v1.1.2/Character/Bat/Bat_up_attack-Sheet4.png",
        4,
    ),
    SpriteSheet::new(
        "./PostApocalypse_AssetPack_v1.1.2/Character/Bat/Bat_down_attack-Sheet4.png",
        4,
    ),
    SpriteSheet::new(
        "./PostApocalypse_AssetPack_v1.1.2/Character/Bat/Bat_side-left_attack-Sheet4.png",
        4,
    ),
    SpriteSheet::new(
        "./PostApocalypse_AssetPack_v1.1.2/Character/Bat/Bat_side_attack-Sheet4.png",
        4,
    ),
);

/// Every sheet the player can draw, for the preload phase.
pub(crate) fn player_sprite_paths() -> Vec<&'static str> {
    let tables: [&'static DirectionTable<SpriteSheet>; 4] =
        [&RUN_SHEETS, &PUNCH_SHEETS, &BAT_RUN_SHEETS, &BAT_ATTACK_SHEETS];
    tables
        .into_iter()
        .flat_map(|table| table.iter())
        .map(|sheet| sheet.path)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Idle,
    Moving,
    Attacking,
    Dead,
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    bounds: Rect,
    speed: f32,
    facing: Facing,
    state: PlayerState,
    health: u32,
    max_health: u32,
    invincibility: f32,
    attack_cooldown: f32,
    swing_elapsed: f32,
    swing_weapon: WeaponProfile,
    hit_set: HitSet,
    inventory: BTreeSet<String>,
    equipped: Option<String>,
    interact_pressed: bool,
    run_anim: Animator,
    swing_anim: Animator,
}

impl Player {
    pub(crate) fn new(position: Vec2, speed: f32) -> Self {
        Self {
            bounds: Rect::new(position.x, position.y, PLAYER_WIDTH, PLAYER_HEIGHT),
            speed,
            facing: Facing::Down,
            state: PlayerState::Idle,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            invincibility: 0.0,
            attack_cooldown: 0.0,
            swing_elapsed: 0.0,
            swing_weapon: BARE_HANDS,
            hit_set: HitSet::default(),
            inventory: BTreeSet::new(),
            equipped: None,
            interact_pressed: false,
            run_anim: Animator::new(6, RUN_FRAME_SECONDS, true),
            swing_anim: swing_animator(&BARE_HANDS),
        }
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.bounds.x = position.x;
        self.bounds.y = position.y;
    }

    pub(crate) fn state(&self) -> PlayerState {
        self.state
    }

    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.state == PlayerState::Dead
    }

    pub(crate) fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }

    pub(crate) fn equipped(&self) -> Option<&str> {
        self.equipped.as_deref()
    }

    pub(crate) fn has_item(&self, item_id: &str) -> bool {
        self.inventory.contains(item_id)
    }

    /// Bare hands unless an item with combat stats is equipped.
    pub(crate) fn weapon(&self) -> &'static WeaponProfile {
        self.equipped
            .as_deref()
            .and_then(weapon_profile)
            .unwrap_or(&BARE_HANDS)
    }

    pub(crate) fn add_item(&mut self, item_id: &str) {
        self.inventory.insert(item_id.to_string());
        if self.equipped.is_none() && weapon_profile(item_id).is_some() {
            self.equipped = Some(item_id.to_string());
            info!(item = item_id, "weapon_equipped");
        }
    }

    pub(crate) fn remove_item(&mut self, item_id: &str) {
        self.inventory.remove(item_id);
        if self.equipped.as_deref() == Some(item_id) {
            self.equipped = None;
        }
    }

    /// Applies a hit from a live hostile. Returns whether health changed.
    pub(crate) fn take_damage(
        &mut self,
        amount: u32,
        attacker: &Attacker,
        roster: &HostileRoster,
    ) -> bool {
        if self.is_dead() || self.invincibility > 0.0 || roster.is_empty() {
            return false;
        }
        if !attacker.kind.is_hostile() || !roster.contains(attacker.id) {
            return false;
        }

        self.health = self.health.saturating_sub(amount).min(self.max_health);
        self.invincibility = INVINCIBILITY_SECONDS;
        if self.health == 0 {
            self.state = PlayerState::Dead;
            info!(attacker = attacker.id.0, "player_died");
        }
        true
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>) {
        if self.is_dead() {
            return;
        }
        let dt = ctx.dt;
        tick_down(&mut self.invincibility, dt);
        tick_down(&mut self.attack_cooldown, dt);
        self.interact_pressed = ctx.input.was_pressed(InputAction::Interact);

        if ctx.input.was_pressed(InputAction::Attack) {
            self.try_start_swing(ctx.hooks);
        }
        if self.state == PlayerState::Attacking {
            self.advance_swing(dt, ctx.entities, ctx.hooks);
            return;
        }

        let intent = movement_intent(ctx.input);
        self.apply_movement(intent, dt, &ctx.session.terrain);
    }

    /// Starts a swing on a fresh press when no swing or cooldown is running.
    pub(crate) fn try_start_swing(&mut self, hooks: &mut dyn PresentationHooks) -> bool {
        if self.state == PlayerState::Attacking || self.attack_cooldown > 0.0 {
            return false;
        }
        let weapon = *self.weapon();
        self.state = PlayerState::Attacking;
        self.swing_elapsed = 0.0;
        self.swing_weapon = weapon;
        self.hit_set.clear();
        self.attack_cooldown = weapon.cooldown;
        self.swing_anim = swing_animator(&weapon);
        hooks.play_cue(SoundCue::Swing);
        debug!(weapon = weapon.id, facing = ?self.facing, "swing_started");
        true
    }

    fn advance_swing(
        &mut self,
        dt: f32,
        entities: &mut SceneWorld<EntityBody>,
        hooks: &mut dyn PresentationHooks,
    ) {
        self.swing_elapsed += dt;
        self.swing_anim.advance(dt);
        let swing = self.swing_weapon.swing;
        if swing.in_hit_window(self.swing_elapsed) {
            self.strike_targets(entities, hooks);
        }
        if swing.is_finished(self.swing_elapsed) {
            self.state = PlayerState::Idle;
        }
    }

    /// Damages every zombie in reach that this swing has not struck yet.
    pub(crate) fn strike_targets(
        &mut self,
        entities: &mut SceneWorld<EntityBody>,
        hooks: &mut dyn PresentationHooks,
    ) -> usize {
        let weapon = self.swing_weapon;
        let mut landed = 0;
        for entity in entities.entities_mut() {
            if entity.remove_from_world || self.hit_set.contains(entity.id) {
                continue;
            }
            let id = entity.id;
            let Some(EntityBody::Zombie(zombie)) = entity.body_mut() else {
                continue;
            };
            if zombie.is_dead()
                || !in_attack_range(&self.bounds, self.facing, &zombie.bounds(), weapon.range)
            {
                continue;
            }
            if zombie.take_damage(weapon.damage) {
                self.hit_set.insert(id);
                landed += 1;
                let cue = if zombie.is_dead() {
                    SoundCue::ZombieDeath
                } else {
                    SoundCue::Hit
                };
                hooks.play_cue(cue);
                debug!(
                    zombie = id.0,
                    weapon = weapon.id,
                    health = zombie.health(),
                    "zombie_hit"
                );
            }
        }
        landed
    }

    fn apply_movement(&mut self, intent: Vec2, dt: f32, terrain: &Terrain) {
        if let Some(facing) = Facing::from_intent(intent.x, intent.y) {
            self.facing = facing;
        }
        let moving = intent.x != 0.0 || intent.y != 0.0;
        self.bounds = resolve_movement(self.bounds, intent, self.speed, dt, terrain);
        if moving {
            self.state = PlayerState::Moving;
            self.run_anim.advance(dt);
        } else {
            self.state = PlayerState::Idle;
        }
    }

    pub(crate) fn draw(&mut self, surface: &mut dyn RenderSurface, assets: &mut dyn AssetProvider) {
        let bat = self.weapon().id == "bat";
        let (sheet, frame) = match self.state {
            PlayerState::Attacking => {
                let table = if self.swing_weapon.id == "bat" {
                    &BAT_ATTACK_SHEETS
                } else {
                    &PUNCH_SHEETS
                };
                (table.get(self.facing), self.swing_anim.frame_index())
            }
            PlayerState::Moving => {
                let table = if bat { &BAT_RUN_SHEETS } else { &RUN_SHEETS };
                (table.get(self.facing), self.run_anim.frame_index())
            }
            PlayerState::Idle | PlayerState::Dead => {
                let table = if bat { &BAT_RUN_SHEETS } else { &RUN_SHEETS };
                (table.get(self.facing), 0)
            }
        };

        let origin = self.bounds;
        let drawn = draw_frame(surface, assets, sheet, frame, |src| {
            Rect::new(
                origin.x,
                origin.y,
                src.width * PLAYER_SCALE,
                src.height * PLAYER_SCALE,
            )
        });
        if !drawn {
            note_missing_sprite(assets, "player", sheet.path);
            surface.fill_rect(self.bounds, PLACEHOLDER_COLOR);
        }
    }
}

fn swing_animator(weapon: &WeaponProfile) -> Animator {
    Animator::new(4, weapon.swing.duration / 4.0, false)
}

/// Four-way key state as an unnormalized intent vector.
pub(crate) fn movement_intent(input: &InputSnapshot) -> Vec2 {
    let mut intent = Vec2::default();
    if input.is_down(InputAction::MoveUp) {
        intent.y -= 1.0;
    }
    if input.is_down(InputAction::MoveDown) {
        intent.y += 1.0;
    }
    if input.is_down(InputAction::MoveLeft) {
        intent.x -= 1.0;
    }
    if input.is_down(InputAction::MoveRight) {
        intent.x += 1.0;
    }
    intent
}

/// Normalizes the intent, slides per axis against the grid, then clamps to the world.
pub(crate) fn resolve_movement(
    bounds: Rect,
    intent: Vec2,
    speed: f32,
    dt: f32,
    terrain: &Terrain,
) -> Rect {
    let length = intent.x.hypot(intent.y);
    if length == 0.0 {
        return terrain.clamp(bounds);
    }
    let dx = intent.x / length * speed * dt;
    let dy = intent.y / length * speed * dt;
    terrain.clamp(slide_move(&terrain.grid, bounds, dx, dy))
}
