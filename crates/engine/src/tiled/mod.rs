//! Tiled JSON maps: the document model, collision, markers and drawing.

mod collision;
mod format;
mod gid;
mod markers;
mod paths;
mod renderer;
mod source;

pub use collision::{slide_move, CollisionGrid, COLLISION_LAYER_NAME};
pub use format::{
    parse_map_json, GroupLayer, Layer, MapData, MapLoadError, MapObject, ObjectLayer, Property,
    TileDef, TileLayer, Tileset,
};
pub use gid::{apply_tile_flip, decode_gid, DecodedGid, TileFlip, GID_MASK};
pub use markers::{
    collect_dialogue_triggers, collect_portals, is_portal_object, object_rect, resolve_spawn,
    DialogueTrigger, Portal, DEFAULT_SPAWN_NAME, MISSING_DIALOGUE_TEXT,
};
pub use paths::{normalize_path, resolve_map_asset_path, resolve_map_path, underscore_fallback};
pub use renderer::TiledMapRenderer;
pub use source::{load_map, FsMapSource, MapSource, MemoryMapSource};
