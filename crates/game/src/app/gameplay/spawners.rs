//! Zombies and pickups placed by object-layer markers.

use std::collections::HashSet;

use engine::tiled::{MapData, MapObject};
use engine::{Rect, Vec2};

use super::combat::Facing;
use super::zombie::ZombieVariant;

const MIN_PICKUP_SIZE: f32 = 24.0;
const POINT_OBJECT_SIZE: f32 = 8.0;
const KNOWN_ITEMS: [&str; 2] = ["bat", "knife"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ZombieSpawn {
    pub(crate) position: Vec2,
    pub(crate) variant: ZombieVariant,
    pub(crate) facing: Facing,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PickupSpawn {
    pub(crate) bounds: Rect,
    pub(crate) item_id: String,
    pub(crate) collected_key: String,
    pub(crate) auto_collect: bool,
}

/// The `zombiesEnabled` map property wins; bedrooms are safe by default.
pub(crate) fn zombies_enabled(map_path: &str, map: &MapData) -> bool {
    map.property_bool("zombiesEnabled")
        .unwrap_or_else(|| !map_path.to_ascii_lowercase().contains("bedroom"))
}

fn spawn_marker(object: &MapObject) -> Option<String> {
    [
        object.property_str("type"),
        object.property_str("entity"),
        Some(object.class.as_str()),
        Some(object.kind.as_str()),
        Some(object.name.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(|raw| raw.trim().to_ascii_lowercase())
    .find(|marker| !marker.is_empty())
}

fn is_zombie_marker(object: &MapObject) -> bool {
    spawn_marker(object).is_some_and(|marker| marker.contains("zombie"))
}

pub(crate) fn zombie_spawns(map: &MapData, scale: f32) -> Vec<ZombieSpawn> {
    map.object_layers()
        .into_iter()
        .flat_map(|layer| layer.objects.iter())
        .filter(|object| is_zombie_marker(object))
        .map(|object| ZombieSpawn {
            position: Vec2::new(object.x * scale, object.y * scale),
            variant: object
                .property_str("variant")
                .and_then(ZombieVariant::parse)
                .unwrap_or_else(|| ZombieVariant::for_object_id(object.id)),
            facing: object
                .property_str("facing")
                .and_then(Facing::parse)
                .unwrap_or_default(),
        })
        .collect()
}

fn pickup_item_id(object: &MapObject) -> Option<String> {
    if let Some(id) = object.property_str("itemId") {
        return Some(id.trim().to_ascii_lowercase());
    }
    let haystack = format!("{} {} {}", object.name, object.kind, object.class).to_ascii_lowercase();
    KNOWN_ITEMS
        .iter()
        .find(|item| haystack.contains(*item))
        .map(|item| item.to_string())
}

pub(crate) fn collected_key(map_path: &str, item_id: &str) -> String {
    format!("{}:{}", map_path.to_ascii_lowercase(), item_id)
}

fn pickup_bounds(object: &MapObject, scale: f32) -> Rect {
    let raw_width = if object.width > 0.0 {
        object.width
    } else {
        POINT_OBJECT_SIZE
    };
    let raw_height = if object.height > 0.0 {
        object.height
    } else {
        POINT_OBJECT_SIZE
    };
    let width = (raw_width * scale).max(MIN_PICKUP_SIZE);
    let height = (raw_height * scale).max(MIN_PICKUP_SIZE);
    let (mut x, mut y) = (object.x * scale, object.y * scale);
    if object.point {
        x -= width / 2.0;
        y -= height / 2.0;
    }
    Rect::new(x, y, width, height)
}

fn bedroom_fallback(map_path: &str) -> Option<PickupSpawn> {
    if !map_path.to_ascii_lowercase().contains("bedroom") {
        return None;
    }
    Some(PickupSpawn {
        bounds: Rect::new(64.0, 320.0, 30.0, 30.0),
        item_id: "bat".to_string(),
        collected_key: collected_key(map_path, "bat"),
        auto_collect: true,
    })
}

/// Pickups from `item`/`pickup` layers, minus anything already collected.
/// A bedroom without authored pickups still offers the bat.
pub(crate) fn pickup_spawns(
    map_path: &str,
    map: &MapData,
    scale: f32,
    collected: &HashSet<String>,
) -> Vec<PickupSpawn> {
    let mut spawns = Vec::new();
    let mut authored = false;
    for layer in map.object_layers() {
        let layer_name = layer.name.to_ascii_lowercase();
        if !layer_name.contains("item") && !layer_name.contains("pickup") {
            continue;
        }
        for object in &layer.objects {
            let Some(item_id) = pickup_item_id(object) else {
                continue;
            };
            authored = true;
            spawns.push(PickupSpawn {
                bounds: pickup_bounds(object, scale),
                collected_key: collected_key(map_path, &item_id),
                auto_collect: object.property_bool("autoPickup").unwrap_or(true),
                item_id,
            });
        }
    }
    if !authored {
        spawns.extend(bedroom_fallback(map_path));
    }
    spawns.retain(|spawn| !collected.contains(&spawn.collected_key));
    spawns
}
