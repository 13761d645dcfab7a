use crate::app::{Camera2D, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// World pixels map 1:1 onto screen pixels; the camera position is the
/// world coordinate shown at the top-left corner of the viewport.
pub fn world_to_screen(world: Vec2, camera: &Camera2D) -> Vec2 {
    Vec2 {
        x: world.x - camera.position.x,
        y: world.y - camera.position.y,
    }
}

pub fn world_to_screen_px(world: Vec2, camera: &Camera2D) -> (i32, i32) {
    let screen = world_to_screen(world, camera);
    (screen.x.round() as i32, screen.y.round() as i32)
}
