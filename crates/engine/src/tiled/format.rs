use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("map not found: {path}")]
    NotFound { path: String },
    #[error("failed to read map {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map {path} at {location}: {message}")]
    Parse {
        path: String,
        location: String,
        message: String,
    },
    #[error("map {path} has zero tile size {tile_width}x{tile_height}")]
    InvalidTileSize {
        path: String,
        tile_width: u32,
        tile_height: u32,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    pub tilewidth: u32,
    pub tileheight: u32,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub tilesets: Vec<Tileset>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Layer {
    #[serde(rename = "tilelayer")]
    Tile(TileLayer),
    #[serde(rename = "objectgroup")]
    Object(ObjectLayer),
    #[serde(rename = "group")]
    Group(GroupLayer),
    #[serde(other)]
    Other,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileLayer {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectLayer {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub objects: Vec<MapObject>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupLayer {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapObject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub point: bool,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tileset {
    pub firstgid: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub columns: u32,
    pub image: Option<String>,
    pub imagewidth: Option<u32>,
    pub imageheight: Option<u32>,
    #[serde(default)]
    pub tiles: Vec<TileDef>,
    /// External tileset reference; these are not followed.
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileDef {
    pub id: u32,
    pub image: Option<String>,
    pub imagewidth: Option<u32>,
    pub imageheight: Option<u32>,
}

pub(crate) fn find_property<'a>(properties: &'a [Property], name: &str) -> Option<&'a Value> {
    properties
        .iter()
        .find(|property| property.name == name)
        .map(|property| &property.value)
}

pub(crate) fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

impl MapObject {
    pub fn property(&self, name: &str) -> Option<&Value> {
        find_property(&self.properties, name)
    }

    /// String-valued property; empty strings count as unset.
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(Value::as_str).and_then(non_empty)
    }

    pub fn property_bool(&self, name: &str) -> Option<bool> {
        self.property(name).and_then(value_as_bool)
    }

    /// Marker lookup order: `type` custom property, class, type field, name.
    pub fn marker(&self) -> Option<&str> {
        self.property_str("type")
            .or_else(|| non_empty(&self.class))
            .or_else(|| non_empty(&self.kind))
            .or_else(|| non_empty(&self.name))
    }
}

impl ObjectLayer {
    pub fn property_str(&self, name: &str) -> Option<&str> {
        find_property(&self.properties, name)
            .and_then(Value::as_str)
            .and_then(non_empty)
    }
}

impl MapData {
    pub fn property_bool(&self, name: &str) -> Option<bool> {
        find_property(&self.properties, name).and_then(value_as_bool)
    }

    /// Every object layer, descending into groups in document order.
    pub fn object_layers(&self) -> Vec<&ObjectLayer> {
        let mut found = Vec::new();
        collect_object_layers(&self.layers, &mut found);
        found
    }

    /// Every tile layer, descending into groups in document order.
    pub fn tile_layers(&self) -> Vec<&TileLayer> {
        let mut found = Vec::new();
        collect_tile_layers(&self.layers, &mut found);
        found
    }

    pub fn find_tile_layer(&self, name: &str) -> Option<&TileLayer> {
        self.tile_layers().into_iter().find(|layer| layer.name == name)
    }

    pub fn pixel_size(&self, scale: f32) -> (f32, f32) {
        (
            self.width as f32 * self.tilewidth as f32 * scale,
            self.height as f32 * self.tileheight as f32 * scale,
        )
    }
}

fn collect_object_layers<'a>(layers: &'a [Layer], found: &mut Vec<&'a ObjectLayer>) {
    for layer in layers {
        match layer {
            Layer::Object(object_layer) => found.push(object_layer),
            Layer::Group(group) => collect_object_layers(&group.layers, found),
            Layer::Tile(_) | Layer::Other => {}
        }
    }
}

fn collect_tile_layers<'a>(layers: &'a [Layer], found: &mut Vec<&'a TileLayer>) {
    for layer in layers {
        match layer {
            Layer::Tile(tile_layer) => found.push(tile_layer),
            Layer::Group(group) => collect_tile_layers(&group.layers, found),
            Layer::Object(_) | Layer::Other => {}
        }
    }
}

pub fn parse_map_json(path: &str, raw: &str) -> Result<MapData, MapLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let map = match serde_path_to_error::deserialize::<_, MapData>(&mut deserializer) {
        Ok(map) => map,
        Err(error) => {
            let location = error.path().to_string();
            let source = error.into_inner();
            return Err(MapLoadError::Parse {
                path: path.to_string(),
                location: if location.is_empty() {
                    ".".to_string()
                } else {
                    location
                },
                message: source.to_string(),
            });
        }
    };
    if map.tilewidth == 0 || map.tileheight == 0 {
        return Err(MapLoadError::InvalidTileSize {
            path: path.to_string(),
            tile_width: map.tilewidth,
            tile_height: map.tileheight,
        });
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "width": 4, "height": 3, "tilewidth": 16, "tileheight": 16,
        "properties": [{"name": "zombiesEnabled", "type": "bool", "value": false}],
        "tilesets": [{"firstgid": 1, "tilewidth": 16, "tileheight": 16, "columns": 8,
                      "image": "../tiles/ground.png", "imagewidth": 128, "imageheight": 64}],
        "layers": [
            {"type": "tilelayer", "name": "Ground", "width": 4, "height": 3,
             "data": [1,2,3,4, 1,1,1,1, 0,0,0,0]},
            {"type": "imagelayer", "name": "Sky"},
            {"type": "group", "name": "Markers", "layers": [
                {"type": "objectgroup", "name": "Spawns",
                 "properties": [{"name": "type", "type": "string", "value": "spawn"}],
                 "objects": [
                    {"id": 3, "name": "PlayerSpawn", "x": 10, "y": 20, "point": true},
                    {"id": 4, "name": "Door", "class": "portal", "x": 0, "y": 0,
                     "width": 16, "height": 16,
                     "properties": [{"name": "targetMap", "type": "string", "value": "b.tmj"}]}
                 ]},
                {"type": "tilelayer", "name": "Collision", "data": [0,0,0,0, 0,0,0,0, 1,1,1,1]}
            ]}
        ]
    }"#;

    #[test]
    fn parses_nested_layers_and_skips_unknown_layer_types() {
        let map = parse_map_json("maps/a.tmj", SAMPLE).expect("parse");
        assert_eq!(map.layers.len(), 3);
        assert!(matches!(map.layers[1], Layer::Other));
        assert_eq!(map.object_layers().len(), 1);
        assert_eq!(map.tile_layers().len(), 2);

        let collision = map.find_tile_layer("Collision").expect("collision layer");
        assert!(collision.visible);
        assert_eq!(collision.width, None);
        assert_eq!(map.property_bool("zombiesEnabled"), Some(false));
    }

    #[test]
    fn marker_prefers_custom_type_then_class_then_type_then_name() {
        let mut object = MapObject {
            name: "Door".to_string(),
            ..MapObject::default()
        };
        assert_eq!(object.marker(), Some("Door"));

        object.kind = "warp".to_string();
        assert_eq!(object.marker(), Some("warp"));

        object.class = "portal".to_string();
        assert_eq!(object.marker(), Some("portal"));

        object.properties.push(Property {
            name: "type".to_string(),
            kind: "string".to_string(),
            value: Value::String("dialogue".to_string()),
        });
        assert_eq!(object.marker(), Some("dialogue"));
    }

    #[test]
    fn empty_strings_fall_through_the_marker_chain() {
        let object = MapObject {
            name: "Sign".to_string(),
            properties: vec![Property {
                name: "type".to_string(),
                kind: "string".to_string(),
                value: Value::String(String::new()),
            }],
            ..MapObject::default()
        };
        assert_eq!(object.marker(), Some("Sign"));
        assert_eq!(MapObject::default().marker(), None);
    }

    #[test]
    fn parse_error_reports_json_path() {
        let raw = r#"{"width": 2, "height": 2, "tilewidth": 16, "tileheight": 16,
            "layers": [{"type": "tilelayer", "name": "Ground", "data": [0, "x"]}]}"#;
        let error = parse_map_json("maps/bad.tmj", raw).expect_err("must fail");
        match error {
            MapLoadError::Parse { path, location, .. } => {
                assert_eq!(path, "maps/bad.tmj");
                assert!(location.starts_with("layers"), "location was {location}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let raw = r#"{"width": 2, "height": 2, "tilewidth": 0, "tileheight": 16}"#;
        assert!(matches!(
            parse_map_json("m.tmj", raw),
            Err(MapLoadError::InvalidTileSize { .. })
        ));
    }

    #[test]
    fn bool_properties_accept_string_spellings() {
        assert_eq!(value_as_bool(&Value::String("TRUE".to_string())), Some(true));
        assert_eq!(value_as_bool(&Value::String("nope".to_string())), None);
        assert_eq!(value_as_bool(&Value::from(1)), None);
    }
}
