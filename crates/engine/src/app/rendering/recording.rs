use crate::app::Rect;
use crate::assets::ImageAsset;

use super::surface::{Affine2, RenderSurface};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear([u8; 4]),
    Image {
        image_size: (u32, u32),
        src: Rect,
        dst: Rect,
        transform: Affine2,
    },
    FillRect {
        rect: Rect,
        color: [u8; 4],
        transform: Affine2,
    },
    StrokeRect {
        rect: Rect,
        color: [u8; 4],
        transform: Affine2,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        transform: Affine2,
    },
}

/// Headless surface that records draw calls with the transform active at the time.
#[derive(Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    transform: Affine2,
    stack: Vec<Affine2>,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            transform: Affine2::IDENTITY,
            stack: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn image_draws(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Image { .. }))
    }

    pub fn fill_draws(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillRect { .. }))
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: [u8; 4]) {
        self.commands.push(DrawCommand::Clear(color));
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
        self.commands.push(DrawCommand::Image {
            image_size: (image.width, image.height),
            src,
            dst,
            transform: self.transform,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color,
            transform: self.transform,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, _line_width: f32, color: [u8; 4]) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            transform: self.transform,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, _color: [u8; 4]) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            transform: self.transform,
        });
    }
}
