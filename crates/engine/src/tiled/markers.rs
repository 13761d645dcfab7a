//! Spawn, portal and dialogue markers read from object layers.
//!
//! Every position returned here is in world pixels (map pixels times the
//! map scale).

use tracing::warn;

use crate::app::{Rect, Vec2};

use super::format::{MapData, MapObject, ObjectLayer};

pub const DEFAULT_SPAWN_NAME: &str = "PlayerSpawn";
pub const MISSING_DIALOGUE_TEXT: &str = "(missing text property)";

#[derive(Debug, Clone, PartialEq)]
pub struct Portal {
    pub id: u32,
    pub name: String,
    pub rect: Rect,
    pub target_map: Option<String>,
    pub target_spawn: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueTrigger {
    pub group: String,
    pub text: String,
    pub once: bool,
    pub rect: Rect,
}

/// Object rectangle in world pixels; zero-sized objects take the tile size.
pub fn object_rect(map: &MapData, object: &MapObject, scale: f32) -> Rect {
    let width = if object.width > 0.0 {
        object.width
    } else {
        map.tilewidth as f32
    };
    let height = if object.height > 0.0 {
        object.height
    } else {
        map.tileheight as f32
    };
    Rect::new(
        object.x * scale,
        object.y * scale,
        width * scale,
        height * scale,
    )
}

pub fn is_portal_object(object: &MapObject) -> bool {
    object.property_str("type") == Some("portal")
        || object.kind == "portal"
        || object.class == "portal"
        || object.property_str("targetMap").is_some()
        || object.property_str("targetSpawn").is_some()
}

pub fn collect_portals(map: &MapData, scale: f32) -> Vec<Portal> {
    map.object_layers()
        .into_iter()
        .flat_map(|layer| layer.objects.iter())
        .filter(|object| is_portal_object(object))
        .map(|object| Portal {
            id: object.id,
            name: object.name.clone(),
            rect: object_rect(map, object, scale),
            target_map: object.property_str("targetMap").map(str::to_string),
            target_spawn: object.property_str("targetSpawn").map(str::to_string),
        })
        .collect()
}

pub fn collect_dialogue_triggers(map: &MapData, scale: f32) -> Vec<DialogueTrigger> {
    map.object_layers()
        .into_iter()
        .flat_map(|layer| layer.objects.iter())
        .filter(|object| object.marker() == Some("dialogue"))
        .map(|object| {
            let group = object
                .property_str("group")
                .map(str::to_string)
                .or_else(|| (!object.name.is_empty()).then(|| object.name.clone()))
                .unwrap_or_else(|| format!("obj-{}", object.id));
            DialogueTrigger {
                group,
                text: object
                    .property_str("text")
                    .unwrap_or(MISSING_DIALOGUE_TEXT)
                    .to_string(),
                once: object.property_bool("once").unwrap_or(true),
                rect: object_rect(map, object, scale),
            }
        })
        .collect()
}

fn find_named_spawn<'a>(layers: &[&'a ObjectLayer], name: &str) -> Option<&'a MapObject> {
    layers.iter().flat_map(|layer| layer.objects.iter()).find(|object| {
        object.name == name
            || object.property_str("spawn_od") == Some(name)
            || object.property_str("spawn") == Some(name)
    })
}

fn find_default_spawn<'a>(layers: &[&'a ObjectLayer]) -> Option<&'a MapObject> {
    for layer in layers {
        let spawn_layer = layer.property_str("type") == Some("spawn");
        for object in &layer.objects {
            if object.name == DEFAULT_SPAWN_NAME {
                return Some(object);
            }
            if spawn_layer
                && (object.kind == DEFAULT_SPAWN_NAME || object.class == DEFAULT_SPAWN_NAME)
            {
                return Some(object);
            }
        }
    }
    None
}

fn find_player_entity<'a>(layers: &[&'a ObjectLayer]) -> Option<&'a MapObject> {
    layers
        .iter()
        .flat_map(|layer| layer.objects.iter())
        .find(|object| object.property_str("entity") == Some("player"))
}

/// Resolves where the player enters a map.
///
/// A named spawn is looked up by name (or `spawn_od`/`spawn` property).
/// Without a name the canonical `PlayerSpawn` is used. Either way an object
/// tagged `entity = player` is the next fallback, then the origin.
pub fn resolve_spawn(map: &MapData, scale: f32, spawn_name: Option<&str>) -> Vec2 {
    let layers = map.object_layers();
    let found = match spawn_name {
        Some(name) => find_named_spawn(&layers, name),
        None => find_default_spawn(&layers),
    }
    .or_else(|| find_player_entity(&layers));

    match found {
        Some(object) => Vec2::new(object.x * scale, object.y * scale),
        None => {
            warn!(
                spawn = spawn_name.unwrap_or(DEFAULT_SPAWN_NAME),
                "spawn_not_found_using_origin"
            );
            Vec2::new(0.0, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiled::parse_map_json;

    const MAP: &str = r#"{
        "width": 10, "height": 10, "tilewidth": 16, "tileheight": 16,
        "layers": [
            {"type": "objectgroup", "name": "Spawns",
             "properties": [{"name": "type", "type": "string", "value": "spawn"}],
             "objects": [
                {"id": 1, "name": "", "type": "PlayerSpawn", "x": 32, "y": 48},
                {"id": 2, "name": "East", "x": 144, "y": 64},
                {"id": 3, "name": "Alias", "x": 5, "y": 6,
                 "properties": [{"name": "spawn_od", "type": "string", "value": "West"}]}
             ]},
            {"type": "group", "name": "Triggers", "layers": [
                {"type": "objectgroup", "name": "Portals", "objects": [
                    {"id": 7, "name": "ToHall", "x": 0, "y": 0, "width": 0, "height": 32,
                     "properties": [
                        {"name": "targetMap", "type": "string", "value": "hall.tmj"},
                        {"name": "targetSpawn", "type": "string", "value": "South"}]},
                    {"id": 8, "name": "Broken", "class": "portal", "x": 16, "y": 16,
                     "width": 16, "height": 16},
                    {"id": 9, "name": "Chest", "x": 1, "y": 1}
                ]},
                {"type": "objectgroup", "name": "Talk", "objects": [
                    {"id": 11, "name": "", "type": "dialogue", "x": 0, "y": 0,
                     "width": 8, "height": 8},
                    {"id": 12, "name": "Sign", "class": "dialogue", "x": 0, "y": 0,
                     "properties": [
                        {"name": "text", "type": "string", "value": "Keep out"},
                        {"name": "once", "type": "bool", "value": false}]}
                ]}
            ]}
        ]
    }"#;

    fn map() -> MapData {
        parse_map_json("maps/a.tmj", MAP).expect("parse")
    }

    #[test]
    fn named_spawns_match_name_or_alias_property() {
        let map = map();
        assert_eq!(resolve_spawn(&map, 2.0, Some("East")), Vec2::new(288.0, 128.0));
        assert_eq!(resolve_spawn(&map, 1.0, Some("West")), Vec2::new(5.0, 6.0));
    }

    #[test]
    fn default_spawn_accepts_typed_object_in_spawn_layer() {
        assert_eq!(resolve_spawn(&map(), 2.0, None), Vec2::new(64.0, 96.0));
    }

    #[test]
    fn player_entity_marker_backs_up_a_missing_name() {
        let raw = r#"{"width": 1, "height": 1, "tilewidth": 16, "tileheight": 16,
            "layers": [{"type": "objectgroup", "name": "O", "objects": [
                {"id": 1, "name": "hero", "x": 10, "y": 20,
                 "properties": [{"name": "entity", "type": "string", "value": "player"}]}]}]}"#;
        let map = parse_map_json("m.tmj", raw).expect("parse");
        assert_eq!(resolve_spawn(&map, 1.0, Some("Nope")), Vec2::new(10.0, 20.0));
        assert_eq!(resolve_spawn(&map, 1.0, None), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn unresolvable_spawn_falls_back_to_origin() {
        let raw = r#"{"width": 1, "height": 1, "tilewidth": 16, "tileheight": 16}"#;
        let map = parse_map_json("m.tmj", raw).expect("parse");
        assert_eq!(resolve_spawn(&map, 3.0, Some("East")), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn portals_are_found_in_nested_layers_with_tile_size_fallback() {
        let portals = collect_portals(&map(), 2.0);
        assert_eq!(portals.len(), 2);
        assert_eq!(portals[0].id, 7);
        assert_eq!(portals[0].rect, Rect::new(0.0, 0.0, 32.0, 64.0));
        assert_eq!(portals[0].target_map.as_deref(), Some("hall.tmj"));
        assert_eq!(portals[0].target_spawn.as_deref(), Some("South"));
        assert_eq!(portals[1].id, 8);
        assert_eq!(portals[1].target_map, None);
    }

    #[test]
    fn dialogue_triggers_default_group_text_and_once() {
        let triggers = collect_dialogue_triggers(&map(), 1.0);
        assert_eq!(triggers.len(), 2);

        assert_eq!(triggers[0].group, "obj-11");
        assert_eq!(triggers[0].text, MISSING_DIALOGUE_TEXT);
        assert!(triggers[0].once);

        assert_eq!(triggers[1].group, "Sign");
        assert_eq!(triggers[1].text, "Keep out");
        assert!(!triggers[1].once);
        assert_eq!(triggers[1].rect, Rect::new(0.0, 0.0, 16.0, 16.0));
    }
}
