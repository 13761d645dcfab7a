use crate::app::Rect;

use super::format::MapData;

pub const COLLISION_LAYER_NAME: &str = "Collision";

#[derive(Debug, Clone, PartialEq)]
struct OccupancyLayer {
    width: u32,
    height: u32,
    cells: Vec<u32>,
}

/// Blocked/free classification over the map's collision tile layer.
///
/// Cells outside the layer (or past the end of a short data array) are
/// blocked. A map without a collision layer blocks nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionGrid {
    layer: Option<OccupancyLayer>,
    tile_width: f32,
    tile_height: f32,
}

impl CollisionGrid {
    pub fn from_map(map: &MapData, scale: f32) -> Self {
        let layer = map
            .find_tile_layer(COLLISION_LAYER_NAME)
            .map(|layer| OccupancyLayer {
                width: layer.width.unwrap_or(map.width),
                height: layer.height.unwrap_or(map.height),
                cells: layer.data.clone(),
            });
        Self {
            layer,
            tile_width: map.tilewidth as f32 * scale,
            tile_height: map.tileheight as f32 * scale,
        }
    }

    pub fn from_cells(width: u32, height: u32, tile_size: f32, cells: Vec<u32>) -> Self {
        Self {
            layer: Some(OccupancyLayer {
                width,
                height,
                cells,
            }),
            tile_width: tile_size,
            tile_height: tile_size,
        }
    }

    pub fn empty() -> Self {
        Self {
            layer: None,
            tile_width: 1.0,
            tile_height: 1.0,
        }
    }

    pub fn has_layer(&self) -> bool {
        self.layer.is_some()
    }

    pub fn is_blocked_tile(&self, tx: i64, ty: i64) -> bool {
        let Some(layer) = &self.layer else {
            return false;
        };
        if tx < 0 || ty < 0 || tx >= i64::from(layer.width) || ty >= i64::from(layer.height) {
            return true;
        }
        let index = (ty as usize) * (layer.width as usize) + tx as usize;
        layer.cells.get(index).map_or(true, |&cell| cell != 0)
    }

    /// Visits only the cells the rectangle covers.
    pub fn is_blocked_rect(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        if self.layer.is_none() {
            return false;
        }
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return true;
        }
        let left = (x / self.tile_width).floor() as i64;
        let right = ((x + width - 1.0) / self.tile_width).floor() as i64;
        let top = (y / self.tile_height).floor() as i64;
        let bottom = ((y + height - 1.0) / self.tile_height).floor() as i64;

        for ty in top..=bottom {
            for tx in left..=right {
                if self.is_blocked_tile(tx, ty) {
                    return true;
                }
            }
        }
        false
    }

    pub fn is_blocked(&self, bounds: &Rect) -> bool {
        self.is_blocked_rect(bounds.x, bounds.y, bounds.width, bounds.height)
    }
}

/// Resolves a move one axis at a time so a diagonal push against a wall
/// keeps sliding along the free axis.
pub fn slide_move(grid: &CollisionGrid, bounds: Rect, dx: f32, dy: f32) -> Rect {
    let mut moved = bounds;
    if !grid.is_blocked_rect(moved.x + dx, moved.y, moved.width, moved.height) {
        moved.x += dx;
    }
    if !grid.is_blocked_rect(moved.x, moved.y + dy, moved.width, moved.height) {
        moved.y += dy;
    }
    moved
}
