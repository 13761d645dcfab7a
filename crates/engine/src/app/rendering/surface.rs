use crate::app::{Rect, Vec2};
use crate::assets::ImageAsset;

/// 2D affine transform in canvas convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2 {
    pub const IDENTITY: Affine2 = Affine2 {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn apply(&self, point: Vec2) -> Vec2 {
        Vec2 {
            x: self.a * point.x + self.c * point.y + self.e,
            y: self.b * point.x + self.d * point.y + self.f,
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.e += self.a * dx + self.c * dy;
        self.f += self.b * dx + self.d * dy;
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.a *= sx;
        self.b *= sx;
        self.c *= sy;
        self.d *= sy;
    }

    pub fn rotate(&mut self, radians: f32) {
        let (sin, cos) = radians.sin_cos();
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    pub fn inverse(&self) -> Option<Affine2> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv_det = det.recip();
        Some(Affine2 {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            e: (self.c * self.f - self.d * self.e) * inv_det,
            f: (self.b * self.e - self.a * self.f) * inv_det,
        })
    }
}

/// Immediate-mode drawing context with a save/restore transform stack.
///
/// Coordinates passed to drawing calls are local to the current transform.
pub trait RenderSurface {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, color: [u8; 4]);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    fn rotate(&mut self, radians: f32);
    fn draw_image(&mut self, image: &ImageAsset, src: Rect, dst: Rect);
    fn fill_rect(&mut self, rect: Rect, color: [u8; 4]);
    fn stroke_rect(&mut self, rect: Rect, line_width: f32, color: [u8; 4]);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: [u8; 4]);
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 0.0001 && (a.y - b.y).abs() < 0.0001
    }

    #[test]
    fn translate_then_scale_composes_like_canvas() {
        let mut transform = Affine2::IDENTITY;
        transform.translate(10.0, 20.0);
        transform.scale(-1.0, 1.0);

        let mapped = transform.apply(Vec2::new(3.0, 4.0));
        assert!(approx(mapped, Vec2::new(7.0, 24.0)));
    }

    #[test]
    fn quarter_turn_maps_x_axis_onto_y_axis() {
        let mut transform = Affine2::IDENTITY;
        transform.rotate(FRAC_PI_2);

        let mapped = transform.apply(Vec2::new(1.0, 0.0));
        assert!(approx(mapped, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn inverse_round_trips_points() {
        let mut transform = Affine2::IDENTITY;
        transform.translate(5.0, -3.0);
        transform.rotate(0.7);
        transform.scale(2.0, -0.5);

        let inverse = transform.inverse().expect("invertible");
        let point = Vec2::new(12.5, -8.0);
        assert!(approx(inverse.apply(transform.apply(point)), point));
    }

    #[test]
    fn degenerate_scale_has_no_inverse() {
        let mut transform = Affine2::IDENTITY;
        transform.scale(0.0, 1.0);
        assert!(transform.inverse().is_none());
    }
}
