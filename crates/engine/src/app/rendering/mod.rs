mod frame;
mod glyphs;
mod recording;
mod renderer;
mod surface;
mod transform;

pub use frame::FrameSurface;
pub use glyphs::{text_width_px, GLYPH_ADVANCE_PX, TEXT_HEIGHT_PX};
pub use recording::{DrawCommand, RecordingSurface};
pub use renderer::Renderer;
pub use surface::{Affine2, RenderSurface};
pub use transform::{world_to_screen, world_to_screen_px, Viewport};
