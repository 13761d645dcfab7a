use crate::app::{Rect, Vec2};
use crate::assets::ImageAsset;

use super::glyphs::{glyph_bits, glyph_pixel_set, GLYPH_ADVANCE_PX, GLYPH_HEIGHT, GLYPH_WIDTH, TEXT_SCALE};
use super::surface::{Affine2, RenderSurface};

/// Software RGBA8 surface over a borrowed framebuffer.
///
/// Blits are inverse-mapped: every covered device pixel is mapped back into
/// local space and sampled nearest-neighbour, so flips and quarter turns
/// come out pixel exact.
pub struct FrameSurface<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    transform: Affine2,
    stack: Vec<Affine2>,
}

impl<'a> FrameSurface<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
            transform: Affine2::IDENTITY,
            stack: Vec::new(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.frame
            .get(offset..offset + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Device-space pixel range covered by a local rectangle, clipped to the frame.
    fn device_bounds(&self, rect: Rect) -> Option<(i32, i32, i32, i32)> {
        let corners = [
            self.transform.apply(Vec2::new(rect.x, rect.y)),
            self.transform.apply(Vec2::new(rect.right(), rect.y)),
            self.transform.apply(Vec2::new(rect.x, rect.bottom())),
            self.transform.apply(Vec2::new(rect.right(), rect.bottom())),
        ];
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for corner in corners {
            min_x = min_x.min(corner.x);
            min_y = min_y.min(corner.y);
            max_x = max_x.max(corner.x);
            max_y = max_y.max(corner.y);
        }
        if !min_x.is_finite() || !min_y.is_finite() || !max_x.is_finite() || !max_y.is_finite() {
            return None;
        }
        let x0 = (min_x.floor() as i32).max(0);
        let y0 = (min_y.floor() as i32).max(0);
        let x1 = (max_x.ceil() as i32).min(self.width as i32);
        let y1 = (max_y.ceil() as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }

    fn for_each_covered_pixel(&mut self, rect: Rect, mut shade: impl FnMut(Vec2) -> Option<[u8; 4]>) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let Some(inverse) = self.transform.inverse() else {
            return;
        };
        let Some((x0, y0, x1, y1)) = self.device_bounds(rect) else {
            return;
        };
        let width = self.width as usize;
        for py in y0..y1 {
            for px in x0..x1 {
                let local = inverse.apply(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                if local.x < rect.x
                    || local.x >= rect.right()
                    || local.y < rect.y
                    || local.y >= rect.bottom()
                {
                    continue;
                }
                if let Some(color) = shade(local) {
                    blend_pixel(self.frame, width, px, py, color);
                }
            }
        }
    }
}

impl RenderSurface for FrameSurface<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(previous) = self.stack.pop() {
            self.transform = previous;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform.translate(dx, dy);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.transform.scale(sx, sy);
    }

    fn rotate(&mut self, radians: f32) {
        self.transform.rotate(radians);
    }

    fn draw_image(&mut self, image: &ImageAsset, src: Rect, dst: Rect) {
        if image.width == 0 || image.height == 0 || src.width <= 0.0 || src.height <= 0.0 {
            return;
        }
        let expected_len = image.width as usize * image.height as usize * 4;
        if image.rgba.len() < expected_len {
            return;
        }
        let max_x = (image.width - 1) as f32;
        let max_y = (image.height - 1) as f32;
        let (lo_x, hi_x) = (src.x.max(0.0), (src.right() - 1.0).min(max_x));
        let (lo_y, hi_y) = (src.y.max(0.0), (src.bottom() - 1.0).min(max_y));
        if hi_x < lo_x || hi_y < lo_y {
            return;
        }
        let image_width = image.width as usize;
        self.for_each_covered_pixel(dst, |local| {
            let u = (local.x - dst.x) / dst.width;
            let v = (local.y - dst.y) / dst.height;
            let sx = (src.x + (u * src.width).floor()).clamp(lo_x, hi_x);
            let sy = (src.y + (v * src.height).floor()).clamp(lo_y, hi_y);
            let offset = (sy as usize * image_width + sx as usize) * 4;
            let px = image.rgba.get(offset..offset + 4)?;
            Some([px[0], px[1], px[2], px[3]])
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        self.for_each_covered_pixel(rect, |_| Some(color));
    }

    fn stroke_rect(&mut self, rect: Rect, line_width: f32, color: [u8; 4]) {
        let line = line_width.max(1.0).min(rect.width.min(rect.height));
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, line), color);
        self.fill_rect(
            Rect::new(rect.x, rect.bottom() - line, rect.width, line),
            color,
        );
        self.fill_rect(Rect::new(rect.x, rect.y, line, rect.height), color);
        self.fill_rect(
            Rect::new(rect.right() - line, rect.y, line, rect.height),
            color,
        );
    }

    /// Text is placed at the transformed origin and is not rotated or scaled.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: [u8; 4]) {
        let origin = self.transform.apply(Vec2::new(x, y));
        let origin_x = origin.x.round() as i32;
        let origin_y = origin.y.round() as i32;
        let width = self.width as usize;
        for (index, ch) in text.chars().enumerate() {
            let Some(bits) = glyph_bits(ch) else {
                continue;
            };
            let glyph_x = origin_x + index as i32 * GLYPH_ADVANCE_PX;
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !glyph_pixel_set(bits, col, row) {
                        continue;
                    }
                    for sy in 0..TEXT_SCALE {
                        for sx in 0..TEXT_SCALE {
                            let px = glyph_x + col * TEXT_SCALE + sx;
                            let py = origin_y + row * TEXT_SCALE + sy;
                            if px < 0 || py < 0 || px >= self.width as i32 || py >= self.height as i32 {
                                continue;
                            }
                            blend_pixel(self.frame, width, px, py, color);
                        }
                    }
                }
            }
        }
    }
}

fn blend_pixel(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let alpha = color[3];
    if alpha == 0 {
        return;
    }
    let Some(pixel_offset) = (y as usize).checked_mul(width).and_then(|row| row.checked_add(x as usize)) else {
        return;
    };
    let byte_offset = pixel_offset * 4;
    let Some(dst) = frame.get_mut(byte_offset..byte_offset + 4) else {
        return;
    };
    if alpha == u8::MAX {
        dst.copy_from_slice(&color);
        return;
    }
    let a = alpha as u32;
    for channel in 0..3 {
        let blended = (color[channel] as u32 * a + dst[channel] as u32 * (255 - a)) / 255;
        dst[channel] = blended as u8;
    }
    dst[3] = u8::MAX;
}
