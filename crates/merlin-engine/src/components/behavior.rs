use glam::Vec2;

use crate::tools::{Tool, ToolKind};

/// Kind-specific behavior state attached to an entity, a tagged variant in
/// place of a subclass hierarchy. The shared record lives in
/// [`crate::components::entity::Entity`]; everything here is per-kind.
pub enum Behavior {
    Player(PlayerState),
    Troll(TrollState),
    Altar(AltarState),
    Door(DoorState),
    Block(BlockState),
}

/// The wizard.
pub struct PlayerState {
    /// Ticks of control lockout remaining after a knockback.
    pub stunned: u32,
    /// Held-jump latch; cleared when the jump input releases.
    pub jump_held: bool,
    /// Contact edge tracking: `touching_*` is last tick's contact,
    /// `touched_*` accumulates this tick's.
    pub touching_altar: bool,
    pub touched_altar: bool,
    pub touching_door: bool,
    pub touched_door: bool,
    /// Equipped tool; None between altars.
    pub tool: Option<Box<dyn Tool>>,
}

impl PlayerState {
    pub fn new(tool: Option<Box<dyn Tool>>) -> Self {
        Self {
            stunned: 0,
            jump_held: false,
            // Starts true so spawning on top of an altar or door does not
            // fire the contact edge immediately.
            touching_altar: true,
            touched_altar: false,
            touching_door: true,
            touched_door: false,
            tool,
        }
    }
}

/// Pursues the player in range, otherwise drifts back home.
pub struct TrollState {
    pub home: Vec2,
}

/// Offers at most one stored tool template.
pub struct AltarState {
    pub stored: Option<ToolKind>,
}

/// Advances the level on a fresh contact edge.
pub struct DoorState {
    pub target: usize,
}

/// Movable solid, draggable by the staff.
pub struct BlockState {
    /// While held the staff drives the velocity and gravity is suspended.
    pub held: bool,
}
