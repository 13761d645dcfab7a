use std::collections::HashSet;

use engine::{EntityId, Rect, Vec2};

use super::entity::EntityKind;

/// Slack allowed behind the attacker's front edge when testing facing.
pub(crate) const FACING_TOLERANCE_PX: f32 = 6.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Facing for a movement intent. Horizontal input wins; no input keeps facing.
    pub(crate) fn from_intent(dx: f32, dy: f32) -> Option<Self> {
        if dx > 0.0 {
            Some(Self::Right)
        } else if dx < 0.0 {
            Some(Self::Left)
        } else if dy < 0.0 {
            Some(Self::Up)
        } else if dy > 0.0 {
            Some(Self::Down)
        } else {
            None
        }
    }

    /// Facing along the dominant axis of a direction; ties go horizontal.
    pub(crate) fn dominant(dx: f32, dy: f32) -> Self {
        if dx.abs() >= dy.abs() {
            if dx >= 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if dy >= 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Half-plane test for an offset measured from the attacker's centre.
    pub(crate) fn faces_toward(self, dx: f32, dy: f32) -> bool {
        HIT_ZONES.get(self).contains(dx, dy)
    }
}

/// The strikeable side of an attacker: everything ahead of the centre along
/// `forward`, plus a band `slack` pixels deep behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HitZone {
    pub(crate) forward: Vec2,
    pub(crate) slack: f32,
}

impl HitZone {
    const fn toward(x: f32, y: f32) -> Self {
        Self {
            forward: Vec2::new(x, y),
            slack: FACING_TOLERANCE_PX,
        }
    }

    pub(crate) fn contains(&self, dx: f32, dy: f32) -> bool {
        dx * self.forward.x + dy * self.forward.y >= -self.slack
    }
}

pub(crate) const HIT_ZONES: DirectionTable<HitZone> = DirectionTable::new(
    HitZone::toward(0.0, -1.0),
    HitZone::toward(0.0, 1.0),
    HitZone::toward(-1.0, 0.0),
    HitZone::toward(1.0, 0.0),
);

/// One value per facing, so per-direction data is a lookup instead of a branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DirectionTable<T> {
    pub(crate) up: T,
    pub(crate) down: T,
    pub(crate) left: T,
    pub(crate) right: T,
}

impl<T> DirectionTable<T> {
    pub(crate) const fn new(up: T, down: T, left: T, right: T) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    pub(crate) fn get(&self, facing: Facing) -> &T {
        match facing {
            Facing::Up => &self.up,
            Facing::Down => &self.down,
            Facing::Left => &self.left,
            Facing::Right => &self.right,
        }
    }

    pub(crate) fn get_mut(&mut self, facing: Facing) -> &mut T {
        match facing {
            Facing::Up => &mut self.up,
            Facing::Down => &mut self.down,
            Facing::Left => &mut self.left,
            Facing::Right => &mut self.right,
        }
    }

    pub(crate) fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> DirectionTable<U> {
        DirectionTable {
            up: f(&self.up),
            down: f(&self.down),
            left: f(&self.left),
            right: f(&self.right),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.up, &self.down, &self.left, &self.right].into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SwingTiming {
    pub(crate) duration: f32,
    pub(crate) hit_start: f32,
    pub(crate) hit_end: f32,
}

impl SwingTiming {
    pub(crate) fn in_hit_window(&self, elapsed: f32) -> bool {
        elapsed >= self.hit_start && elapsed <= self.hit_end
    }

    pub(crate) fn is_finished(&self, elapsed: f32) -> bool {
        elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WeaponProfile {
    pub(crate) id: &'static str,
    pub(crate) damage: u32,
    pub(crate) range: f32,
    pub(crate) swing: SwingTiming,
    pub(crate) cooldown: f32,
}

const FIST_SWING: SwingTiming = SwingTiming {
    duration: 0.40,
    hit_start: 0.08,
    hit_end: 0.24,
};

pub(crate) const BARE_HANDS: WeaponProfile = WeaponProfile {
    id: "punch",
    damage: 18,
    range: 62.0,
    swing: FIST_SWING,
    cooldown: 0.35,
};

pub(crate) const KNIFE: WeaponProfile = WeaponProfile {
    id: "knife",
    damage: 24,
    range: 76.0,
    swing: FIST_SWING,
    cooldown: 0.35,
};

pub(crate) const BAT: WeaponProfile = WeaponProfile {
    id: "bat",
    damage: 32,
    range: 92.0,
    swing: SwingTiming {
        duration: 0.48,
        hit_start: 0.10,
        hit_end: 0.30,
    },
    cooldown: 0.35,
};

/// Combat stats for an inventory item, if it can be wielded.
pub(crate) fn weapon_profile(item_id: &str) -> Option<&'static WeaponProfile> {
    match item_id {
        "knife" => Some(&KNIFE),
        "bat" => Some(&BAT),
        _ => None,
    }
}

/// Targets already struck by the current swing.
#[derive(Debug, Clone, Default)]
pub(crate) struct HitSet {
    struck: HashSet<EntityId>,
}

impl HitSet {
    pub(crate) fn clear(&mut self) {
        self.struck.clear();
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.struck.contains(&id)
    }

    pub(crate) fn insert(&mut self, id: EntityId) -> bool {
        self.struck.insert(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.struck.len()
    }
}

/// Centre distance within `range` and the target on the faced side.
pub(crate) fn in_attack_range(attacker: &Rect, facing: Facing, target: &Rect, range: f32) -> bool {
    let from = attacker.center();
    let to = target.center();
    if from.distance(to) > range {
        return false;
    }
    facing.faces_toward(to.x - from.x, to.y - from.y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Attacker {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
}

/// Hostile entities alive at the moment damage is resolved.
#[derive(Debug, Clone, Default)]
pub(crate) struct HostileRoster {
    live: Vec<EntityId>,
}

impl HostileRoster {
    pub(crate) fn new(live: Vec<EntityId>) -> Self {
        Self { live }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }
}

pub(crate) fn tick_down(timer: &mut f32, dt: f32) {
    *timer = (*timer - dt).max(0.0);
}
