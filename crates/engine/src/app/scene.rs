use super::input::{ActionStates, InputAction};
use super::rendering::RenderSurface;
use crate::assets::AssetProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pressed: ActionStates,
    click_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        pressed: ActionStates,
        click_position_px: Option<Vec2>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            pressed,
            click_position_px,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the tick the key went down.
    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self.pressed.set(action, true);
        self
    }

    pub fn with_click_position_px(mut self, click_position_px: Option<Vec2>) -> Self {
        self.click_position_px = click_position_px;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn click_position_px(&self) -> Option<Vec2> {
        self.click_position_px
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned world-space bounds with a top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.width * 0.5,
            y: self.y + self.height * 0.5,
        }
    }

    /// Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
}

impl Camera2D {
    /// Centres the view on `target`, clamped so the view never leaves the world.
    pub fn follow(&mut self, target: &Rect, viewport: (u32, u32), world_size: Vec2) {
        let view_w = viewport.0 as f32;
        let view_h = viewport.1 as f32;
        let center = target.center();
        let max_x = (world_size.x - view_w).max(0.0);
        let max_y = (world_size.y - view_h).max(0.0);
        self.position.x = (center.x - view_w * 0.5).clamp(0.0, max_x);
        self.position.y = (center.y - view_h * 0.5).clamp(0.0, max_y);
    }

    pub fn visible_rect(&self, viewport: (u32, u32)) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            viewport.0 as f32,
            viewport.1 as f32,
        )
    }
}

#[derive(Debug)]
pub struct Entity<T> {
    pub id: EntityId,
    pub remove_from_world: bool,
    body: Option<T>,
}

impl<T> Entity<T> {
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut T> {
        self.body.as_mut()
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Ordered entity list with deferred spawn and removal.
///
/// Entities flagged with `remove_from_world` stay in place until
/// [`SceneWorld::apply_pending`] runs at the end of an update pass, so the
/// list is never reshaped while it is being iterated.
#[derive(Debug)]
pub struct SceneWorld<T> {
    allocator: EntityIdAllocator,
    entities: Vec<Entity<T>>,
    pending_spawns: Vec<Entity<T>>,
    camera: Camera2D,
}

impl<T> Default for SceneWorld<T> {
    fn default() -> Self {
        Self {
            allocator: EntityIdAllocator::default(),
            entities: Vec::new(),
            pending_spawns: Vec::new(),
            camera: Camera2D::default(),
        }
    }
}

impl<T> SceneWorld<T> {
    /// Queues `body`; it joins the list at the next [`SceneWorld::apply_pending`].
    pub fn spawn(&mut self, body: T) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            remove_from_world: false,
            body: Some(body),
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        if let Some(entity) = self.entities.iter_mut().find(|entity| entity.id == id) {
            entity.remove_from_world = true;
            return true;
        }
        let pending_before = self.pending_spawns.len();
        self.pending_spawns.retain(|entity| entity.id != id);
        pending_before != self.pending_spawns.len()
    }

    /// Removes flagged entities, then appends queued spawns. Returns the removed count.
    pub fn apply_pending(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|entity| !entity.remove_from_world);
        let removed = before - self.entities.len();
        self.entities.append(&mut self.pending_spawns);
        removed
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.camera = Camera2D::default();
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity<T>] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity<T>] {
        &mut self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity<T>> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Lends an entity's body out of the list so it can borrow its neighbours.
    pub fn take_body(&mut self, index: usize) -> Option<T> {
        self.entities
            .get_mut(index)
            .and_then(|entity| entity.body.take())
    }

    pub fn restore_body(&mut self, index: usize, body: T) {
        if let Some(entity) = self.entities.get_mut(index) {
            entity.body = Some(body);
        }
    }

    /// Moves an entity to the end of the list; the last entity draws first.
    pub fn move_to_back(&mut self, id: EntityId) -> bool {
        let Some(index) = self.entities.iter().position(|entity| entity.id == id) else {
            return false;
        };
        let entity = self.entities.remove(index);
        self.entities.push(entity);
        true
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }
}

pub trait Scene {
    fn load(&mut self, assets: &mut dyn AssetProvider);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, surface: &mut dyn RenderSurface, assets: &mut dyn AssetProvider);
    fn unload(&mut self);
    fn entity_count(&self) -> usize {
        0
    }
    fn debug_title(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        let first = allocator.allocate();
        let second = allocator.allocate();
        let third = allocator.allocate();

        assert_eq!(first.0, 0);
        assert_eq!(second.0, 1);
        assert_eq!(third.0, 2);
    }

    #[test]
    fn spawned_entities_appear_only_after_apply_pending() {
        let mut world: SceneWorld<&'static str> = SceneWorld::default();
        world.spawn("player");
        assert_eq!(world.entity_count(), 0);

        world.apply_pending();
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn despawn_flags_entity_and_removal_is_deferred() {
        let mut world: SceneWorld<u32> = SceneWorld::default();
        let doomed = world.spawn(1);
        let survivor = world.spawn(2);
        world.apply_pending();

        assert!(world.despawn(doomed));
        assert!(world.despawn(doomed));
        assert_eq!(world.entity_count(), 2);
        assert!(world.find_entity(doomed).expect("doomed").remove_from_world);

        assert_eq!(world.apply_pending(), 1);
        assert!(world.find_entity(doomed).is_none());
        assert!(world.find_entity(survivor).is_some());
    }

    #[test]
    fn despawn_of_pending_spawn_drops_it_before_insertion() {
        let mut world: SceneWorld<u32> = SceneWorld::default();
        let id = world.spawn(7);
        assert!(world.despawn(id));
        world.apply_pending();
        assert_eq!(world.entity_count(), 0);
        assert!(!world.despawn(EntityId(99)));
    }

    #[test]
    fn taken_body_is_restored_in_place() {
        let mut world: SceneWorld<u32> = SceneWorld::default();
        world.spawn(10);
        world.spawn(20);
        world.apply_pending();

        let body = world.take_body(0).expect("body");
        assert!(world.entities()[0].body().is_none());
        world.restore_body(0, body + 1);
        assert_eq!(world.entities()[0].body(), Some(&11));
    }

    #[test]
    fn move_to_back_reorders_without_losing_entities() {
        let mut world: SceneWorld<u32> = SceneWorld::default();
        let first = world.spawn(1);
        world.spawn(2);
        world.spawn(3);
        world.apply_pending();

        assert!(world.move_to_back(first));
        let order: Vec<u32> = world
            .entities()
            .iter()
            .filter_map(|entity| entity.body().copied())
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn rect_overlap_is_strict_on_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let inside = Rect::new(9.5, 9.5, 10.0, 10.0);

        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn camera_follow_centres_and_clamps_to_world() {
        let mut camera = Camera2D::default();
        let world = Vec2::new(2000.0, 1000.0);

        camera.follow(&Rect::new(990.0, 490.0, 20.0, 20.0), (800, 600), world);
        assert_eq!(camera.position, Vec2::new(600.0, 200.0));

        camera.follow(&Rect::new(5.0, 5.0, 20.0, 20.0), (800, 600), world);
        assert_eq!(camera.position, Vec2::new(0.0, 0.0));

        camera.follow(&Rect::new(1990.0, 990.0, 10.0, 10.0), (800, 600), world);
        assert_eq!(camera.position, Vec2::new(1200.0, 400.0));
    }

    #[test]
    fn camera_stays_at_origin_when_world_is_smaller_than_view() {
        let mut camera = Camera2D::default();
        camera.follow(
            &Rect::new(300.0, 200.0, 10.0, 10.0),
            (800, 600),
            Vec2::new(400.0, 300.0),
        );
        assert_eq!(camera.position, Vec2::default());
    }

    #[test]
    fn snapshot_builders_set_down_and_pressed_state() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_pressed(InputAction::Attack);

        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.was_pressed(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Attack));
        assert!(snapshot.was_pressed(InputAction::Attack));
    }
}
