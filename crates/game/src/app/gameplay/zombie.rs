use engine::{Animator, AssetProvider, Rect, RenderSurface, Vec2};
use tracing::debug;

use super::combat::{tick_down, DirectionTable, Facing};
use super::session::Terrain;
use super::sprites::{draw_frame, note_missing_sprite, SpriteSheet};

pub(crate) const CORPSE_SECONDS: f32 = 3.0;

const WALK_FRAME_SECONDS: f32 = 0.12;
const ATTACK_FRAME_SECONDS: f32 = 0.10;
const DEATH_FRAME_SECONDS: f32 = 0.12;

const HEALTH_BAR_WIDTH: f32 = 30.0;
const HEALTH_BAR_HEIGHT: f32 = 4.0;
const HEALTH_BAR_OFFSET: f32 = 8.0;
const FALLBACK_FILL: [u8; 4] = [0x5d, 0x8f, 0x3e, 255];
const FALLBACK_STROKE: [u8; 4] = [0x1e, 0x38, 0x11, 255];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ZombieConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) max_health: u32,
    pub(crate) attack_range: f32,
    pub(crate) attack_cooldown: f32,
    pub(crate) aggro_radius: f32,
    pub(crate) stop_radius: f32,
    pub(crate) walk_frames: u32,
    pub(crate) attack_frames: u32,
    pub(crate) death_frames: u32,
}

impl Default for ZombieConfig {
    fn default() -> Self {
        Self {
            width: 52.0,
            height: 68.0,
            speed: 70.0,
            damage: 10,
            max_health: 45,
            attack_range: 24.0,
            attack_cooldown: 0.8,
            aggro_radius: 220.0,
            stop_radius: 18.0,
            walk_frames: 8,
            attack_frames: 6,
            death_frames: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZombieVariant {
    Small,
    Axe,
    Big,
}

struct ZombieSkin {
    walk: DirectionTable<SpriteSheet>,
    attack: DirectionTable<SpriteSheet>,
    /// Only side-on death strips exist; up and down reuse them.
    death: DirectionTable<SpriteSheet>,
}

const SMALL_SKIN: ZombieSkin = ZombieSkin {
    walk: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Up_Walk-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Down_walk-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Side-left_Walk-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Side_Walk-Sheet6.png", 6),
    ),
    attack: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Up_First-Attack-Sheet4.png", 4),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Down_First-Attack-Sheet4.png", 4),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Side-left_First-Attack-Sheet4.png", 4),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Side_First-Attack-Sheet4.png", 4),
    ),
    death: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Side_First-Death-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Side-left_First-Death-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Side-left_First-Death-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Small/Zombie_Small_Side_First-Death-Sheet6.png", 6),
    ),
};

const AXE_SKIN: ZombieSkin = ZombieSkin {
    walk: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Up_Walk-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Down_Walk-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Side-left_Walk-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Side_Walk-Sheet8.png", 8),
    ),
    attack: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Up_First-Attack-Sheet7.png", 7),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Down_First-Attack-Sheet7.png", 7),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Side-left_First-Attack-Sheet7.png", 7),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Side_First-Attack-Sheet7.png", 7),
    ),
    death: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Side_First-Death-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Side-left_First-Death-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Side-left_First-Death-Sheet6.png", 6),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Axe/Zombie_Axe_Side_First-Death-Sheet6.png", 6),
    ),
};

const BIG_SKIN: ZombieSkin = ZombieSkin {
    walk: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Up_Walk-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Down_Walk-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Side-left_Walk-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Side_Walk-Sheet8.png", 8),
    ),
    attack: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Up_First-Attack-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Down_First-Attack-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Side-left_First-Attack-Sheet8.png", 8),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Side_First-Attack-Sheet8.png", 8),
    ),
    death: DirectionTable::new(
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Side_First-Death-Sheet7.png", 7),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Side-left_First-Death-Sheet7.png", 7),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Side-left_First-Death-Sheet7.png", 7),
        SpriteSheet::new("./PostApocalypse_AssetPack_v1.1.2/Enemies/Zombie_Big/Zombie_Big_Side_First-Death-Sheet7.png", 7),
    ),
};

impl ZombieVariant {
    const ALL: [ZombieVariant; 3] = [Self::Small, Self::Axe, Self::Big];

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "small" => Some(Self::Small),
            "axe" => Some(Self::Axe),
            "big" => Some(Self::Big),
            _ => None,
        }
    }

    /// Stable choice for markers that do not name a variant.
    pub(crate) fn for_object_id(id: u32) -> Self {
        Self::ALL[id as usize % Self::ALL.len()]
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Axe => "axe",
            Self::Big => "big",
        }
    }

    fn skin(self) -> &'static ZombieSkin {
        match self {
            Self::Small => &SMALL_SKIN,
            Self::Axe => &AXE_SKIN,
            Self::Big => &BIG_SKIN,
        }
    }

    pub(crate) fn config(self) -> ZombieConfig {
        let skin = self.skin();
        let base = ZombieConfig {
            walk_frames: skin.walk.down.frames,
            attack_frames: skin.attack.down.frames,
            death_frames: skin.death.right.frames,
            ..ZombieConfig::default()
        };
        match self {
            Self::Small => ZombieConfig {
                width: 40.0,
                height: 55.0,
                speed: 85.0,
                damage: 8,
                max_health: 35,
                ..base
            },
            Self::Axe => ZombieConfig {
                width: 60.0,
                height: 90.0,
                speed: 70.0,
                damage: 12,
                max_health: 45,
                ..base
            },
            Self::Big => ZombieConfig {
                width: 75.0,
                height: 115.0,
                speed: 55.0,
                damage: 18,
                max_health: 75,
                ..base
            },
        }
    }
}

/// Every zombie sheet, for the preload phase.
pub(crate) fn zombie_sprite_paths() -> Vec<&'static str> {
    let mut paths = Vec::new();
    for variant in ZombieVariant::ALL {
        let skin = variant.skin();
        for table in [&skin.walk, &skin.attack, &skin.death] {
            for sheet in table.iter() {
                if !paths.contains(&sheet.path) {
                    paths.push(sheet.path);
                }
            }
        }
    }
    paths
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZombieState {
    Walk,
    Attack,
    Death,
}

/// What the world must do on the zombie's behalf after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZombieAction {
    None,
    Strike { damage: u32 },
    Remove,
}

#[derive(Debug, Clone)]
pub(crate) struct Zombie {
    config: ZombieConfig,
    variant: ZombieVariant,
    bounds: Rect,
    facing: Facing,
    state: ZombieState,
    health: u32,
    attack_cooldown: f32,
    corpse_remaining: f32,
    show_health_bar: bool,
    moving: bool,
    walk_anim: Animator,
    attack_anim: Animator,
    death_anim: Animator,
}

impl Zombie {
    pub(crate) fn new(position: Vec2, variant: ZombieVariant, facing: Facing) -> Self {
        Self::with_config(position, variant, facing, variant.config())
    }

    pub(crate) fn with_config(
        position: Vec2,
        variant: ZombieVariant,
        facing: Facing,
        mut config: ZombieConfig,
    ) -> Self {
        if config.stop_radius >= config.attack_range {
            config.stop_radius = config.attack_range * 0.75;
        }
        Self {
            variant,
            bounds: Rect::new(position.x, position.y, config.width, config.height),
            facing,
            state: ZombieState::Walk,
            health: config.max_health,
            attack_cooldown: 0.0,
            corpse_remaining: CORPSE_SECONDS,
            show_health_bar: false,
            moving: false,
            walk_anim: Animator::new(config.walk_frames, WALK_FRAME_SECONDS, true),
            attack_anim: Animator::new(config.attack_frames, ATTACK_FRAME_SECONDS, false),
            death_anim: Animator::new(config.death_frames, DEATH_FRAME_SECONDS, false),
            config,
        }
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    pub(crate) fn config(&self) -> &ZombieConfig {
        &self.config
    }

    pub(crate) fn state(&self) -> ZombieState {
        self.state
    }

    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.state == ZombieState::Death
    }

    pub(crate) fn health_bar_visible(&self) -> bool {
        self.show_health_bar && !self.is_dead()
    }

    /// Returns false once dead; the killing blow is the last accepted hit.
    pub(crate) fn take_damage(&mut self, amount: u32) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.show_health_bar = true;
        if self.health == 0 {
            self.state = ZombieState::Death;
            self.moving = false;
            self.death_anim.reset();
            self.corpse_remaining = CORPSE_SECONDS;
            debug!(variant = self.variant.name(), "zombie_died");
        }
        true
    }

    /// One simulation step against the player's bounds, if a live player exists.
    pub(crate) fn update(&mut self, dt: f32, player: Option<Rect>, terrain: &Terrain) -> ZombieAction {
        if self.is_dead() {
            return self.update_corpse(dt);
        }
        tick_down(&mut self.attack_cooldown, dt);

        if self.state == ZombieState::Attack {
            self.attack_anim.advance(dt);
            if self.attack_anim.is_done() {
                self.state = ZombieState::Walk;
            }
            return ZombieAction::None;
        }

        let Some(player) = player else {
            self.moving = false;
            return ZombieAction::None;
        };
        let from = self.bounds.center();
        let to = player.center();
        let distance = from.distance(to);

        if distance <= self.config.attack_range && self.attack_cooldown <= 0.0 {
            self.facing = Facing::dominant(to.x - from.x, to.y - from.y);
            self.state = ZombieState::Attack;
            self.moving = false;
            self.attack_anim.reset();
            self.attack_cooldown = self.config.attack_cooldown;
            return ZombieAction::Strike {
                damage: self.config.damage,
            };
        }

        self.moving = distance <= self.config.aggro_radius && distance > self.config.stop_radius;
        if self.moving {
            let nx = (to.x - from.x) / distance;
            let ny = (to.y - from.y) / distance;
            self.facing = Facing::dominant(nx, ny);
            let step = self.config.speed * dt;
            let moved = Rect::new(
                self.bounds.x + nx * step,
                self.bounds.y + ny * step,
                self.bounds.width,
                self.bounds.height,
            );
            self.bounds = terrain.clamp(moved);
            self.walk_anim.advance(dt);
        }
        ZombieAction::None
    }

    /// Plays the death strip to its end, then holds the corpse.
    fn update_corpse(&mut self, dt: f32) -> ZombieAction {
        if !self.death_anim.is_done() {
            self.death_anim.advance(dt);
            return ZombieAction::None;
        }
        self.corpse_remaining -= dt;
        if self.corpse_remaining <= 0.0 {
            ZombieAction::Remove
        } else {
            ZombieAction::None
        }
    }

    pub(crate) fn draw(&mut self, surface: &mut dyn RenderSurface, assets: &mut dyn AssetProvider) {
        let skin = self.variant.skin();
        let (sheet, frame) = match self.state {
            ZombieState::Walk => {
                let frame = if self.moving {
                    self.walk_anim.frame_index()
                } else {
                    0
                };
                (skin.walk.get(self.facing), frame)
            }
            ZombieState::Attack => (skin.attack.get(self.facing), self.attack_anim.frame_index()),
            ZombieState::Death => (skin.death.get(self.facing), self.death_anim.frame_index()),
        };

        let dst = self.bounds;
        if !draw_frame(surface, assets, sheet, frame, |_| dst) {
            note_missing_sprite(assets, "zombie", sheet.path);
            surface.fill_rect(self.bounds, FALLBACK_FILL);
            surface.stroke_rect(self.bounds, 2.0, FALLBACK_STROKE);
        }
        self.draw_health_bar(surface);
    }

    fn draw_health_bar(&self, surface: &mut dyn RenderSurface) {
        if !self.health_bar_visible() {
            return;
        }
        let x = self.bounds.x + (self.bounds.width - HEALTH_BAR_WIDTH) / 2.0;
        let y = self.bounds.y - HEALTH_BAR_OFFSET;
        let ratio = if self.config.max_health > 0 {
            self.health as f32 / self.config.max_health as f32
        } else {
            0.0
        };
        surface.fill_rect(
            Rect::new(x - 1.0, y - 1.0, HEALTH_BAR_WIDTH + 2.0, HEALTH_BAR_HEIGHT + 2.0),
            [0, 0, 0, 178],
        );
        surface.fill_rect(
            Rect::new(x, y, HEALTH_BAR_WIDTH, HEALTH_BAR_HEIGHT),
            [0x7a, 0x11, 0x11, 255],
        );
        surface.fill_rect(
            Rect::new(x, y, (HEALTH_BAR_WIDTH * ratio).max(0.0), HEALTH_BAR_HEIGHT),
            [0x5c, 0xff, 0x5c, 255],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{AssetCache, DrawCommand, RecordingSurface};

    const DT: f32 = 1.0 / 60.0;

    fn open_terrain() -> Terrain {
        Terrain::open(Vec2::new(2000.0, 2000.0))
    }

    fn player_at(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 56.0, 68.0)
    }

    fn axe_at(x: f32, y: f32) -> Zombie {
        Zombie::new(Vec2::new(x, y), ZombieVariant::Axe, Facing::Down)
    }

    #[test]
    fn stop_radius_is_forced_below_attack_range() {
        let config = ZombieConfig {
            stop_radius: 30.0,
            ..ZombieConfig::default()
        };
        let zombie = Zombie::with_config(Vec2::default(), ZombieVariant::Axe, Facing::Down, config);
        assert!(zombie.config().stop_radius < zombie.config().attack_range);
    }

    #[test]
    fn variant_defaults_follow_the_variant_table() {
        let big = ZombieVariant::Big.config();
        assert_eq!((big.width, big.height, big.max_health), (75.0, 115.0, 75));
        assert_eq!(big.attack_range, 24.0);
        assert_eq!(ZombieVariant::for_object_id(4), ZombieVariant::Axe);
        assert_eq!(ZombieVariant::parse(" Small "), Some(ZombieVariant::Small));
    }

    #[test]
    fn chases_inside_aggro_radius_only() {
        let terrain = open_terrain();
        let mut near = axe_at(300.0, 100.0);
        near.update(DT, Some(player_at(100.0, 100.0)), &terrain);
        assert!(near.bounds().x < 300.0);
        assert_eq!(near.facing(), Facing::Left);

        let mut far = axe_at(900.0, 100.0);
        far.update(DT, Some(player_at(100.0, 100.0)), &terrain);
        assert_eq!(far.bounds().x, 900.0);
    }

    #[test]
    fn holds_position_inside_stop_radius() {
        let terrain = open_terrain();
        let mut zombie = axe_at(100.0, 100.0);
        zombie.attack_cooldown = 10.0;
        let player = Rect::new(
            zombie.bounds().center().x - 28.0 + 10.0,
            zombie.bounds().center().y - 34.0,
            56.0,
            68.0,
        );
        zombie.update(DT, Some(player), &terrain);
        assert_eq!(zombie.bounds().x, 100.0);
        assert_eq!(zombie.state(), ZombieState::Walk);
    }

    #[test]
    fn strikes_once_per_cooldown_inside_attack_range() {
        let terrain = open_terrain();
        let mut zombie = axe_at(100.0, 100.0);
        let center = zombie.bounds().center();
        let player = Rect::new(center.x - 28.0 + 10.0, center.y - 34.0, 56.0, 68.0);

        let mut strikes = 0;
        for _ in 0..60 {
            if let ZombieAction::Strike { damage } = zombie.update(DT, Some(player), &terrain) {
                assert_eq!(damage, 12);
                strikes += 1;
            }
        }
        assert_eq!(strikes, 2);
    }

    #[test]
    fn attack_state_returns_to_walk_when_the_strip_ends() {
        let terrain = open_terrain();
        let mut zombie = axe_at(100.0, 100.0);
        let center = zombie.bounds().center();
        let player = Rect::new(center.x - 28.0, center.y - 34.0, 56.0, 68.0);

        zombie.update(DT, Some(player), &terrain);
        assert_eq!(zombie.state(), ZombieState::Attack);
        for _ in 0..45 {
            zombie.update(DT, Some(player), &terrain);
        }
        assert_eq!(zombie.state(), ZombieState::Walk);
    }

    #[test]
    fn death_is_terminal_and_rejects_damage() {
        let mut zombie = axe_at(0.0, 0.0);
        assert!(zombie.take_damage(18));
        assert!(zombie.health_bar_visible());
        assert!(zombie.take_damage(18));
        assert!(zombie.take_damage(18));
        assert_eq!(zombie.health(), 0);
        assert_eq!(zombie.state(), ZombieState::Death);
        assert!(!zombie.take_damage(18));
        assert!(!zombie.health_bar_visible());

        let terrain = open_terrain();
        let player = Some(zombie.bounds());
        for _ in 0..30 {
            assert_ne!(zombie.update(DT, player, &terrain), ZombieAction::Strike { damage: 12 });
            assert_eq!(zombie.state(), ZombieState::Death);
        }
    }

    #[test]
    fn corpse_is_removed_after_animation_and_hold() {
        let terrain = open_terrain();
        let mut zombie = axe_at(0.0, 0.0);
        zombie.take_damage(1000);

        let death_strip = zombie.death_anim.total_duration();
        let mut elapsed = 0.0;
        loop {
            elapsed += 0.05;
            if zombie.update(0.05, None, &terrain) == ZombieAction::Remove {
                break;
            }
            assert!(elapsed < 10.0, "corpse never removed");
        }
        assert!(elapsed >= death_strip + CORPSE_SECONDS);
    }

    #[test]
    fn missing_sprites_fall_back_to_a_filled_box_with_health_bar() {
        let mut zombie = axe_at(10.0, 20.0);
        zombie.take_damage(5);
        let mut surface = RecordingSurface::new(800, 600);
        let mut assets = AssetCache::new(std::env::temp_dir().join("survivor-no-assets"));

        zombie.draw(&mut surface, &mut assets);

        let fills: Vec<_> = surface.fill_draws().collect();
        assert!(matches!(
            fills.first(),
            Some(DrawCommand::FillRect { color, .. }) if *color == FALLBACK_FILL
        ));
        assert_eq!(fills.len(), 4);
    }
}
