use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::behavior::{Behavior, PlayerState};
use crate::components::sprite::SpriteState;
use crate::core::collision::PixelRect;

/// Entity kind tag, used for collision responses and spawn dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Troll,
    Altar,
    Door,
    Block,
}

impl EntityKind {
    /// Parse a catalog kind name. None for unregistered kinds.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "merlin" => Some(Self::Player),
            "troll" => Some(Self::Troll),
            "altar" => Some(Self::Altar),
            "door" => Some(Self::Door),
            "block" => Some(Self::Block),
            _ => None,
        }
    }
}

/// Common entity record: one struct with a tagged behavior variant, not a
/// class hierarchy. Movement, occupancy and rendering read the shared
/// fields; per-kind logic lives behind `behavior`.
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Position in level pixels. Unit-stepped, so components stay integral;
    /// the fractional remainder lives in `step`.
    pub pos: Vec2,
    pub prev_pos: Vec2,
    /// Desired velocity, set by the behavior hook each tick.
    pub vel: Vec2,
    /// Per-axis sub-pixel accumulators.
    pub step: Vec2,
    /// Collision-box size; None until resolved from the sprite sheet,
    /// at which point it is set exactly once.
    pub box_w: Option<u32>,
    pub box_h: Option<u32>,
    /// Collision-box offset inside the sprite rectangle.
    pub box_dx: i32,
    pub box_dy: i32,
    /// Solid entities occupy the collision map and block movement.
    pub solid: bool,
    /// Draw order; higher draws above.
    pub altitude: i32,
    pub sprite: SpriteState,
    pub alive: bool,
    /// Last stamped (level-clipped) bounding box. None until the entity has
    /// joined collision.
    pub bbox: Option<PixelRect>,
    pub behavior: Behavior,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, pos: Vec2, sprite: &str, behavior: Behavior) -> Self {
        Self {
            id,
            kind,
            pos,
            prev_pos: pos,
            vel: Vec2::ZERO,
            step: Vec2::ZERO,
            box_w: None,
            box_h: None,
            box_dx: 0,
            box_dy: 0,
            solid: true,
            altitude: 0,
            sprite: SpriteState::new(sprite),
            alive: true,
            bbox: None,
            behavior,
        }
    }

    /// Collision box at the current position, unclipped. None until the box
    /// dimensions have resolved. A flipped sprite mirrors the box offset so
    /// the box tracks the drawn pixels.
    pub fn collision_box(&self, sprite_w: u32) -> Option<PixelRect> {
        let (w, h) = (self.box_w? as i32, self.box_h? as i32);
        let dx = if self.sprite.x_flip {
            sprite_w as i32 - w - self.box_dx
        } else {
            self.box_dx
        };
        let x = self.pos.x.floor() as i32 + dx;
        let y = self.pos.y.floor() as i32 + self.box_dy;
        Some(PixelRect::from_size(x, y, w, h))
    }

    pub fn player_state(&self) -> Option<&PlayerState> {
        match &self.behavior {
            Behavior::Player(state) => Some(state),
            _ => None,
        }
    }

    pub fn player_state_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.behavior {
            Behavior::Player(state) => Some(state),
            _ => None,
        }
    }
}
