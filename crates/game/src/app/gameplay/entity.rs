use engine::{AssetProvider, EntityId, Rect, RenderSurface, SceneWorld};

use super::combat::{Attacker, HostileRoster};
use super::map_manager::MapManager;
use super::pickup::ItemPickup;
use super::player::Player;
use super::presentation::SoundCue;
use super::session::TickContext;
use super::zombie::{Zombie, ZombieAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EntityKind {
    Player,
    Zombie,
    Map,
    Pickup,
}

impl EntityKind {
    pub(crate) fn is_hostile(self) -> bool {
        self == EntityKind::Zombie
    }
}

pub(crate) enum EntityBody {
    Player(Player),
    Zombie(Zombie),
    Map(MapManager),
    Pickup(ItemPickup),
}

impl EntityBody {
    pub(crate) fn kind(&self) -> EntityKind {
        match self {
            Self::Player(_) => EntityKind::Player,
            Self::Zombie(_) => EntityKind::Zombie,
            Self::Map(_) => EntityKind::Map,
            Self::Pickup(_) => EntityKind::Pickup,
        }
    }

    /// World bounds; the map covers its whole pixel extent.
    pub(crate) fn bounds(&self) -> Rect {
        match self {
            Self::Player(player) => player.bounds(),
            Self::Zombie(zombie) => zombie.bounds(),
            Self::Map(map) => {
                let size = map.terrain().world_size;
                Rect::new(0.0, 0.0, size.x, size.y)
            }
            Self::Pickup(pickup) => pickup.bounds(),
        }
    }

    /// Runs one tick while the body is lent out of the entity list.
    pub(crate) fn update(&mut self, id: EntityId, ctx: &mut TickContext<'_>) {
        match self {
            Self::Player(player) => player.update(ctx),
            Self::Zombie(zombie) => update_zombie(zombie, id, ctx),
            Self::Map(map) => map.update(ctx),
            Self::Pickup(pickup) => pickup.update(id, ctx),
        }
    }

    pub(crate) fn draw(
        &mut self,
        surface: &mut dyn RenderSurface,
        assets: &mut dyn AssetProvider,
        view: Rect,
    ) {
        match self {
            Self::Player(player) => player.draw(surface, assets),
            Self::Zombie(zombie) => zombie.draw(surface, assets),
            Self::Map(map) => {
                map.draw(surface, assets, view);
            }
            Self::Pickup(pickup) => pickup.draw(surface, assets),
        }
    }
}

fn update_zombie(zombie: &mut Zombie, id: EntityId, ctx: &mut TickContext<'_>) {
    let target = find_player(ctx.entities)
        .filter(|player| !player.is_dead())
        .map(Player::bounds);
    match zombie.update(ctx.dt, target, &ctx.session.terrain) {
        ZombieAction::None => {}
        ZombieAction::Strike { damage } => {
            let attacker = Attacker {
                id,
                kind: EntityKind::Zombie,
            };
            strike_player(ctx, attacker, damage);
        }
        ZombieAction::Remove => {
            ctx.entities.despawn(id);
        }
    }
}

pub(crate) fn find_player(entities: &SceneWorld<EntityBody>) -> Option<&Player> {
    entities
        .entities()
        .iter()
        .filter(|entity| !entity.remove_from_world)
        .find_map(|entity| match entity.body() {
            Some(EntityBody::Player(player)) => Some(player),
            _ => None,
        })
}

pub(crate) fn find_player_mut(entities: &mut SceneWorld<EntityBody>) -> Option<&mut Player> {
    entities
        .entities_mut()
        .iter_mut()
        .filter(|entity| !entity.remove_from_world)
        .find_map(|entity| match entity.body_mut() {
            Some(EntityBody::Player(player)) => Some(player),
            _ => None,
        })
}

/// Live zombies still in the world. `lent` names an attacker whose body is
/// currently out of the list for its own update.
pub(crate) fn hostile_roster(
    entities: &SceneWorld<EntityBody>,
    lent: Option<EntityId>,
) -> HostileRoster {
    let mut live: Vec<EntityId> = entities
        .entities()
        .iter()
        .filter(|entity| !entity.remove_from_world)
        .filter(|entity| {
            matches!(entity.body(), Some(EntityBody::Zombie(zombie)) if !zombie.is_dead())
        })
        .map(|entity| entity.id)
        .collect();
    if let Some(id) = lent {
        let still_listed = entities
            .find_entity(id)
            .is_some_and(|entity| !entity.remove_from_world);
        if still_listed && !live.contains(&id) {
            live.push(id);
        }
    }
    HostileRoster::new(live)
}

/// Applies a strike to the player. Returns whether damage landed.
pub(crate) fn strike_player(ctx: &mut TickContext<'_>, attacker: Attacker, damage: u32) -> bool {
    let roster = if ctx.session.zombies_enabled {
        hostile_roster(ctx.entities, Some(attacker.id))
    } else {
        HostileRoster::default()
    };
    let Some(player) = find_player_mut(ctx.entities) else {
        return false;
    };
    if !player.take_damage(damage, &attacker, &roster) {
        return false;
    }
    let died = player.is_dead();
    ctx.hooks.play_cue(SoundCue::PlayerHurt);
    if died && !ctx.session.game_over {
        ctx.session.game_over = true;
        ctx.hooks.game_over();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::combat::Facing;
    use crate::app::gameplay::presentation::recording::{PresentationEvent, RecordingPresentation};
    use crate::app::gameplay::session::{SessionState, Terrain};
    use crate::app::gameplay::zombie::ZombieVariant;
    use engine::{InputSnapshot, Vec2};

    fn world_with_player_and_zombie() -> (SceneWorld<EntityBody>, EntityId, EntityId) {
        let mut entities = SceneWorld::default();
        let player = entities.spawn(EntityBody::Player(Player::new(Vec2::new(100.0, 100.0), 140.0)));
        let zombie = entities.spawn(EntityBody::Zombie(Zombie::new(
            Vec2::new(120.0, 100.0),
            ZombieVariant::Axe,
            Facing::Left,
        )));
        entities.apply_pending();
        (entities, player, zombie)
    }

    fn session(zombies_enabled: bool) -> SessionState {
        let mut session = SessionState::new(Terrain::open(Vec2::new(800.0, 600.0)));
        session.zombies_enabled = zombies_enabled;
        session
    }

    #[test]
    fn only_zombies_are_hostile() {
        assert!(EntityKind::Zombie.is_hostile());
        assert!(!EntityKind::Player.is_hostile());
        assert!(!EntityKind::Pickup.is_hostile());
        assert!(!EntityKind::Map.is_hostile());
    }

    #[test]
    fn roster_skips_flagged_and_dead_zombies() {
        let (mut entities, _, zombie) = world_with_player_and_zombie();
        assert!(hostile_roster(&entities, None).contains(zombie));

        entities.despawn(zombie);
        assert!(hostile_roster(&entities, None).is_empty());
        assert!(hostile_roster(&entities, Some(zombie)).is_empty());
    }

    #[test]
    fn roster_includes_the_lent_attacker() {
        let (mut entities, _, zombie) = world_with_player_and_zombie();
        let index = entities
            .entities()
            .iter()
            .position(|entity| entity.id == zombie)
            .expect("zombie index");
        let body = entities.take_body(index).expect("zombie body");

        assert!(hostile_roster(&entities, None).is_empty());
        assert!(hostile_roster(&entities, Some(zombie)).contains(zombie));
        entities.restore_body(index, body);
    }

    #[test]
    fn strikes_are_ignored_while_zombies_are_disabled() {
        let (mut entities, _, zombie) = world_with_player_and_zombie();
        let mut session = session(false);
        let mut hooks = RecordingPresentation::default();
        let input = InputSnapshot::empty();
        let mut ctx = TickContext {
            dt: 1.0 / 60.0,
            input: &input,
            entities: &mut entities,
            session: &mut session,
            hooks: &mut hooks,
        };
        let attacker = Attacker {
            id: zombie,
            kind: EntityKind::Zombie,
        };

        assert!(!strike_player(&mut ctx, attacker, 10));
        assert_eq!(find_player(&entities).map(Player::health), Some(100));
    }

    #[test]
    fn fatal_strike_ends_the_session_once() {
        let (mut entities, _, zombie) = world_with_player_and_zombie();
        let mut session = session(true);
        let mut hooks = RecordingPresentation::default();
        let input = InputSnapshot::empty();
        let attacker = Attacker {
            id: zombie,
            kind: EntityKind::Zombie,
        };
        {
            let mut ctx = TickContext {
                dt: 1.0 / 60.0,
                input: &input,
                entities: &mut entities,
                session: &mut session,
                hooks: &mut hooks,
            };
            assert!(strike_player(&mut ctx, attacker, 150));
            assert!(!strike_player(&mut ctx, attacker, 150));
        }

        assert!(session.game_over);
        let game_overs = hooks
            .events()
            .iter()
            .filter(|event| **event == PresentationEvent::GameOver)
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(hooks.cue_count(SoundCue::PlayerHurt), 1);
    }
}
