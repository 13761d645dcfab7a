use engine::{fetch_asset, AssetProvider, ImageAsset, Rect, RenderSurface};
use tracing::warn;

/// A horizontal strip of equally wide frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpriteSheet {
    pub(crate) path: &'static str,
    pub(crate) frames: u32,
}

impl SpriteSheet {
    pub(crate) const fn new(path: &'static str, frames: u32) -> Self {
        Self { path, frames }
    }

    /// Frame geometry comes from the loaded image, not from constants.
    pub(crate) fn frame_rect(&self, image: &ImageAsset, frame: u32) -> Rect {
        let frames = self.frames.max(1);
        let frame_width = image.width / frames;
        let frame = frame.min(frames - 1);
        Rect::new(
            (frame * frame_width) as f32,
            0.0,
            frame_width as f32,
            image.height as f32,
        )
    }
}

/// Logs a placeholder draw the first time any entity hits the missing sheet.
pub(crate) fn note_missing_sprite(
    assets: &mut dyn AssetProvider,
    owner: &'static str,
    path: &'static str,
) -> bool {
    let first = assets.note_placeholder(path);
    if first {
        warn!(owner, path, "sprite_missing_using_placeholder");
    }
    first
}

/// Draws one frame into `dst`, sized by `size_for` from the frame rectangle.
/// Returns false when the sheet is unavailable.
pub(crate) fn draw_frame(
    surface: &mut dyn RenderSurface,
    assets: &mut dyn AssetProvider,
    sheet: &SpriteSheet,
    frame: u32,
    size_for: impl FnOnce(Rect) -> Rect,
) -> bool {
    let Some(image) = fetch_asset(assets, sheet.path) else {
        return false;
    };
    let src = sheet.frame_rect(image, frame);
    surface.draw_image(image, src, size_for(src));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::AssetCache;

    fn strip(width: u32, height: u32) -> ImageAsset {
        ImageAsset {
            width,
            height,
            rgba: vec![0; (width * height * 4) as usize],
        }
    }

    #[test]
    fn frame_rect_steps_across_the_strip() {
        let sheet = SpriteSheet::new("./walk.png", 6);
        let image = strip(84, 17);
        assert_eq!(sheet.frame_rect(&image, 2), Rect::new(28.0, 0.0, 14.0, 17.0));
    }

    #[test]
    fn missing_sheet_is_logged_once_across_owners() {
        let mut assets = AssetCache::new(std::env::temp_dir().join("survivor-no-assets"));
        assert!(note_missing_sprite(&mut assets, "zombie", "./sprites/walk.png"));
        assert!(!note_missing_sprite(&mut assets, "zombie", "./sprites/walk.png"));
        assert!(!note_missing_sprite(&mut assets, "player", "./sprites/walk.png"));
    }

    #[test]
    fn frame_rect_clamps_past_the_last_frame() {
        let sheet = SpriteSheet::new("./walk.png", 4);
        let image = strip(52, 17);
        assert_eq!(sheet.frame_rect(&image, 9).x, 39.0);
    }
}
