use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::app::{Rect, RenderSurface};
use crate::assets::{fetch_asset, AssetProvider};

use super::format::{Layer, MapData, TileLayer, Tileset};
use super::gid::{apply_tile_flip, decode_gid, TileFlip};
use super::paths::resolve_map_asset_path;

const PLACEHOLDER_TILE_COLOR: [u8; 4] = [72, 64, 80, 255];
const CULL_BUFFER_TILES: i64 = 1;

#[derive(Debug, Clone)]
struct TileImage {
    path: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
struct ResolvedTileset {
    firstgid: u32,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    image_path: Option<String>,
    tile_images: HashMap<u32, TileImage>,
}

impl ResolvedTileset {
    fn resolve(map: &MapData, map_path: &str, tileset: &Tileset) -> Self {
        let tile_width = if tileset.tilewidth > 0 {
            tileset.tilewidth
        } else {
            map.tilewidth
        };
        let tile_height = if tileset.tileheight > 0 {
            tileset.tileheight
        } else {
            map.tileheight
        };
        let columns = if tileset.columns > 0 {
            tileset.columns
        } else {
            tileset
                .imagewidth
                .map_or(1, |width| (width / tile_width.max(1)).max(1))
        };
        let tile_images = tileset
            .tiles
            .iter()
            .filter_map(|tile| {
                let image = tile.image.as_deref()?;
                Some((
                    tile.id,
                    TileImage {
                        path: resolve_map_asset_path(map_path, image),
                        width: tile.imagewidth.unwrap_or(tile_width),
                        height: tile.imageheight.unwrap_or(tile_height),
                    },
                ))
            })
            .collect();
        Self {
            firstgid: tileset.firstgid,
            tile_width,
            tile_height,
            columns,
            image_path: tileset
                .image
                .as_deref()
                .map(|image| resolve_map_asset_path(map_path, image)),
            tile_images,
        }
    }
}

/// Draws the visible tile layers of one map.
#[derive(Debug, Clone)]
pub struct TiledMapRenderer {
    map: Arc<MapData>,
    map_path: String,
    scale: f32,
    tilesets: Vec<ResolvedTileset>,
}

impl TiledMapRenderer {
    pub fn new(map: Arc<MapData>, map_path: &str, scale: f32) -> Self {
        let mut tilesets = Vec::with_capacity(map.tilesets.len());
        for tileset in &map.tilesets {
            if let Some(source) = &tileset.source {
                warn!(
                    map = map_path,
                    source = source.as_str(),
                    firstgid = tileset.firstgid,
                    "external_tileset_skipped"
                );
                continue;
            }
            tilesets.push(ResolvedTileset::resolve(&map, map_path, tileset));
        }
        tilesets.sort_by_key(|tileset| tileset.firstgid);
        Self {
            map,
            map_path: map_path.to_string(),
            scale,
            tilesets,
        }
    }

    pub fn map_path(&self) -> &str {
        &self.map_path
    }

    /// Every image the map references, for the preload phase.
    pub fn image_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for tileset in &self.tilesets {
            let tile_paths = tileset.tile_images.values().map(|tile| &tile.path);
            for path in tileset.image_path.iter().chain(tile_paths) {
                if !paths.contains(path) {
                    paths.push(path.clone());
                }
            }
        }
        paths
    }

    fn tileset_for_gid(&self, gid: u32) -> Option<&ResolvedTileset> {
        self.tilesets
            .iter()
            .take_while(|tileset| tileset.firstgid <= gid)
            .last()
    }

    /// Draws the tiles under `view` (world pixels) plus a one-tile border.
    /// Returns the number of tiles visited that had a tileset.
    pub fn draw(
        &self,
        surface: &mut dyn RenderSurface,
        assets: &mut dyn AssetProvider,
        view: Rect,
    ) -> usize {
        let map = &*self.map;
        if map.width == 0 || map.height == 0 {
            return 0;
        }
        let tile_w = map.tilewidth as f32 * self.scale;
        let tile_h = map.tileheight as f32 * self.scale;

        let start_col = ((view.x / tile_w).floor() as i64 - CULL_BUFFER_TILES).max(0);
        let end_col = ((view.right() / tile_w).floor() as i64 + CULL_BUFFER_TILES)
            .min(i64::from(map.width) - 1);
        let start_row = ((view.y / tile_h).floor() as i64 - CULL_BUFFER_TILES).max(0);
        let end_row = ((view.bottom() / tile_h).floor() as i64 + CULL_BUFFER_TILES)
            .min(i64::from(map.height) - 1);

        let mut layers = Vec::new();
        collect_visible_tile_layers(&map.layers, &mut layers);

        let mut drawn = 0;
        for layer in layers {
            let layer_width = i64::from(layer.width.unwrap_or(map.width));
            for row in start_row..=end_row {
                for col in start_col..=end_col {
                    let Some(&raw) = layer.data.get((row * layer_width + col) as usize) else {
                        continue;
                    };
                    let gid = decode_gid(raw);
                    if gid.id == 0 {
                        continue;
                    }
                    let Some(tileset) = self.tileset_for_gid(gid.id) else {
                        continue;
                    };
                    let local = gid.id - tileset.firstgid;
                    let dest_x = col as f32 * tile_w;
                    let dest_y = row as f32 * tile_h;

                    if let Some(path) = &tileset.image_path {
                        let src = Rect::new(
                            ((local % tileset.columns) * tileset.tile_width) as f32,
                            ((local / tileset.columns) * tileset.tile_height) as f32,
                            tileset.tile_width as f32,
                            tileset.tile_height as f32,
                        );
                        let dest = Rect::new(
                            dest_x,
                            dest_y,
                            tileset.tile_width as f32 * self.scale,
                            tileset.tile_height as f32 * self.scale,
                        );
                        draw_tile(surface, assets, path, Some(src), dest, gid.flip);
                    } else if let Some(tile) = tileset.tile_images.get(&local) {
                        let dest = Rect::new(
                            dest_x,
                            dest_y,
                            tile.width as f32 * self.scale,
                            tile.height as f32 * self.scale,
                        );
                        draw_tile(surface, assets, &tile.path, None, dest, gid.flip);
                    } else {
                        continue;
                    }
                    drawn += 1;
                }
            }
        }
        drawn
    }
}

fn collect_visible_tile_layers<'a>(layers: &'a [Layer], found: &mut Vec<&'a TileLayer>) {
    for layer in layers {
        match layer {
            Layer::Tile(tile_layer) if tile_layer.visible => found.push(tile_layer),
            Layer::Group(group) if group.visible => collect_visible_tile_layers(&group.layers, found),
            _ => {}
        }
    }
}

fn draw_tile(
    surface: &mut dyn RenderSurface,
    assets: &mut dyn AssetProvider,
    path: &str,
    src: Option<Rect>,
    dest: Rect,
    flip: TileFlip,
) {
    let half_w = dest.width * 0.5;
    let half_h = dest.height * 0.5;
    let local = Rect::new(-half_w, -half_h, dest.width, dest.height);

    surface.save();
    surface.translate(dest.x + half_w, dest.y + half_h);
    apply_tile_flip(surface, flip);
    match fetch_asset(assets, path) {
        Some(image) => {
            let src = src.unwrap_or(Rect::new(
                0.0,
                0.0,
                image.width as f32,
                image.height as f32,
            ));
            surface.draw_image(image, src, local);
        }
        None => surface.fill_rect(local, PLACEHOLDER_TILE_COLOR),
    }
    surface.restore();
}
