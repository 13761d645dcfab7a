mod combat;
mod entity;
mod map_manager;
mod pickup;
mod player;
mod presentation;
mod scene_impl;
mod session;
mod spawners;
mod sprites;
mod world;
mod zombie;

pub(crate) use map_manager::FetchMode;
pub(crate) use scene_impl::SurvivalScene;
pub(crate) use world::WorldSettings;

/// Every sprite sheet the game draws outside of map tiles.
pub(crate) fn sprite_preload_paths() -> Vec<&'static str> {
    let mut paths = player::player_sprite_paths();
    paths.extend(zombie::zombie_sprite_paths());
    paths.extend(pickup::pickup_sprite_paths());
    paths
}
