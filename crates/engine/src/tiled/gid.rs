use std::f32::consts::FRAC_PI_2;

use bitflags::bitflags;

use crate::app::RenderSurface;

pub const GID_MASK: u32 = 0x1FFF_FFFF;

bitflags! {
    /// Orientation bits stored in the top of every global tile id.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TileFlip: u32 {
        const HORIZONTAL = 0x8000_0000;
        const VERTICAL = 0x4000_0000;
        const DIAGONAL = 0x2000_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedGid {
    pub id: u32,
    pub flip: TileFlip,
}

pub fn decode_gid(raw: u32) -> DecodedGid {
    DecodedGid {
        id: raw & GID_MASK,
        flip: TileFlip::from_bits_truncate(raw),
    }
}

/// Applies the flip bits around the current origin.
///
/// The tile content is transposed first, then mirrored horizontally and
/// vertically. Transform calls compose outermost-first, so the diagonal swap
/// is issued last.
pub fn apply_tile_flip(surface: &mut dyn RenderSurface, flip: TileFlip) {
    if flip.contains(TileFlip::VERTICAL) {
        surface.scale(1.0, -1.0);
    }
    if flip.contains(TileFlip::HORIZONTAL) {
        surface.scale(-1.0, 1.0);
    }
    if flip.contains(TileFlip::DIAGONAL) {
        surface.rotate(FRAC_PI_2);
        surface.scale(1.0, -1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{DrawCommand, RecordingSurface, Rect, Vec2};
    use crate::assets::ImageAsset;

    #[test]
    fn flag_bits_are_masked_off_the_id() {
        let decoded = decode_gid(0x8000_0000 | 0x2000_0000 | 37);
        assert_eq!(decoded.id, 37);
        assert!(decoded.flip.contains(TileFlip::HORIZONTAL));
        assert!(decoded.flip.contains(TileFlip::DIAGONAL));
        assert!(!decoded.flip.contains(TileFlip::VERTICAL));
    }

    #[test]
    fn plain_ids_carry_no_flags() {
        let decoded = decode_gid(5);
        assert_eq!(decoded, DecodedGid { id: 5, flip: TileFlip::empty() });
        assert_eq!(decode_gid(0).id, 0);
    }

    fn mapped(flip: TileFlip, point: Vec2) -> Vec2 {
        let mut surface = RecordingSurface::new(8, 8);
        apply_tile_flip(&mut surface, flip);
        let image = ImageAsset {
            width: 1,
            height: 1,
            rgba: vec![0; 4],
        };
        surface.draw_image(
            &image,
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
        );
        match &surface.commands()[0] {
            DrawCommand::Image { transform, .. } => transform.apply(point),
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 0.0001 && (a.y - b.y).abs() < 0.0001
    }

    const RIGHT: Vec2 = Vec2::new(1.0, 0.0);
    const DOWN: Vec2 = Vec2::new(0.0, 1.0);

    #[test]
    fn horizontal_and_vertical_flips_mirror_single_axes() {
        assert!(approx(mapped(TileFlip::HORIZONTAL, RIGHT), Vec2::new(-1.0, 0.0)));
        assert!(approx(mapped(TileFlip::HORIZONTAL, DOWN), DOWN));
        assert!(approx(mapped(TileFlip::VERTICAL, DOWN), Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn diagonal_flip_swaps_axes() {
        assert!(approx(mapped(TileFlip::DIAGONAL, RIGHT), DOWN));
        assert!(approx(mapped(TileFlip::DIAGONAL, DOWN), RIGHT));
    }

    #[test]
    fn diagonal_plus_horizontal_is_a_clockwise_quarter_turn() {
        let flip = TileFlip::DIAGONAL | TileFlip::HORIZONTAL;
        assert!(approx(mapped(flip, RIGHT), DOWN));
        assert!(approx(mapped(flip, DOWN), Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn diagonal_plus_vertical_is_a_counter_clockwise_quarter_turn() {
        let flip = TileFlip::DIAGONAL | TileFlip::VERTICAL;
        assert!(approx(mapped(flip, RIGHT), Vec2::new(0.0, -1.0)));
        assert!(approx(mapped(flip, DOWN), RIGHT));
    }
}
