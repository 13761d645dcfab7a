mod animation;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use animation::Animator;
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    text_width_px, world_to_screen, world_to_screen_px, Affine2, DrawCommand,
    FrameSurface, RecordingSurface, RenderSurface, Renderer, Viewport, GLYPH_ADVANCE_PX,
    TEXT_HEIGHT_PX,
};
pub use scene::{
    Camera2D, Entity, EntityId, EntityIdAllocator, InputSnapshot, Rect, Scene, SceneCommand,
    SceneWorld, Vec2,
};
