use glam::Vec2;

/// Render-space translation following a focus entity.
///
/// Purely a view transform: collision-map coordinates stay level-absolute,
/// the camera only decides where the viewport center sits when positions are
/// handed to the renderer.
pub struct Camera {
    pub pos: Vec2,
    view_w: u32,
    view_h: u32,
}

impl Camera {
    pub fn new(view_w: u32, view_h: u32) -> Self {
        Self {
            pos: Vec2::ZERO,
            view_w,
            view_h,
        }
    }

    /// Snap to the focus target. Recomputed every frame.
    pub fn follow(&mut self, target: Vec2) {
        self.pos = target;
    }

    fn half(&self) -> Vec2 {
        Vec2::new(self.view_w as f32 / 2.0, self.view_h as f32 / 2.0)
    }

    /// Level coordinates to integer screen coordinates.
    pub fn to_screen(&self, world: Vec2) -> (i32, i32) {
        let s = self.half() + world - self.pos;
        (s.x.floor() as i32, s.y.floor() as i32)
    }

    /// Screen coordinates back to level coordinates.
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        self.pos + screen - self.half()
    }
}
