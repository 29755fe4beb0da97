use glam::Vec2;

/// Logical control keys the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Action,
}

/// Input events fed by the host. No device semantics here; the host maps
/// keyboards, gamepads or touch onto these.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    KeyDown { key: Key },
    KeyUp { key: Key },
    /// Pointer press at screen coordinates; queues a cast trigger.
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
}

/// Polled control state folded from input events: held booleans plus the
/// last pointer position in screen coordinates.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub action: bool,
    pub pointer: Vec2,
    cast_queued: Option<Vec2>,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key } => self.set_key(key, true),
            InputEvent::KeyUp { key } => self.set_key(key, false),
            InputEvent::PointerDown { x, y } => {
                self.pointer = Vec2::new(x, y);
                self.cast_queued = Some(self.pointer);
            }
            InputEvent::PointerMove { x, y } => {
                self.pointer = Vec2::new(x, y);
            }
        }
    }

    fn set_key(&mut self, key: Key, held: bool) {
        match key {
            Key::Left => self.left = held,
            Key::Right => self.right = held,
            Key::Up => self.up = held,
            Key::Down => self.down = held,
            Key::Action => self.action = held,
        }
    }

    /// Either jump input.
    pub fn jump(&self) -> bool {
        self.up || self.action
    }

    /// Consume the pending cast trigger, if a pointer press arrived since
    /// the last tick.
    pub fn take_cast(&mut self) -> Option<Vec2> {
        self.cast_queued.take()
    }
}
