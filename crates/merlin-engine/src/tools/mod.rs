//! The tool capability model.
//!
//! A tool is a swappable behavior module owned by exactly one holder. Its
//! hooks are optional: the physics hooks report whether they fully replaced
//! default physics for the tick, and a tool with no opinion inherits the
//! defaults. Having no tool at all is the `None` arm of the player's slot,
//! never a missing-method probe.

pub mod boots;
pub mod feather;
pub mod staff;

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::core::collision::CollisionMap;
use crate::core::registry::EntityRegistry;
use crate::input::controls::ControlState;
use crate::systems::movement;

/// Identifies a tool template, as stored by altars and the carried-forward
/// player state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Staff,
    Feather,
    Boots,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Feather => "feather",
            Self::Boots => "boots",
        }
    }

    /// Sprite an altar shows while offering this template.
    pub fn altar_sprite(&self) -> &'static str {
        match self {
            Self::Staff => "altar_staff",
            Self::Feather => "altar_feather",
            Self::Boots => "altar_boots",
        }
    }

    /// One-time pickup flavor text.
    pub fn status_lines(&self) -> &'static [&'static str] {
        match self {
            Self::Staff => &["It's a powerful staff!", "Click to move blocks!"],
            Self::Feather => &["A feather light as air!", "You drift gently as you fall!"],
            Self::Boots => &["Sturdy springing boots!", "They put a spring in your step!"],
        }
    }
}

/// World access handed to tool hooks for the duration of one call.
/// The tool itself is lifted out of the player while its hooks run, so the
/// context can reach the player and any grabbed target freely.
pub struct ToolCtx<'a> {
    pub player: EntityId,
    pub registry: &'a mut EntityRegistry,
    pub map: &'a CollisionMap,
    pub controls: &'a ControlState,
    /// Last pointer position translated into level coordinates.
    pub pointer_world: Vec2,
}

impl ToolCtx<'_> {
    pub fn player_ref(&self) -> Option<&Entity> {
        self.registry.get(self.player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.registry.get_mut(self.player)
    }

    /// Whether the holder is standing on something solid.
    pub fn on_ground(&self) -> bool {
        self.player_ref()
            .is_some_and(|p| movement::on_ground(p, self.map))
    }
}

/// A swappable capability held by the player.
///
/// Default hook bodies are the "absent" case: physics hooks defer to default
/// physics, triggers do nothing.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Sprite drawn following the holder.
    fn sprite(&self) -> &'static str;

    /// Jump hook. True if it fully handled jump physics for this tick.
    fn jump(&mut self, ctx: &mut ToolCtx) -> bool {
        let _ = ctx;
        false
    }

    /// Gravity hook. True if it fully handled gravity for this tick.
    fn gravity(&mut self, ctx: &mut ToolCtx) -> bool {
        let _ = ctx;
        false
    }

    /// Primary trigger: receives the collision set at the translated pointer
    /// position.
    fn cast(&mut self, targets: &[EntityId], ctx: &mut ToolCtx) {
        let _ = (targets, ctx);
    }

    /// Secondary (down) trigger.
    fn down_action(&mut self, ctx: &mut ToolCtx) {
        let _ = ctx;
    }

    /// Per-tick upkeep for internal state, e.g. dragging a grabbed target.
    fn tick(&mut self, ctx: &mut ToolCtx) {
        let _ = ctx;
    }

    /// Invoked exactly once before the tool is replaced or dropped, so it
    /// can let go of any world state it holds.
    fn release(&mut self, ctx: &mut ToolCtx) {
        let _ = ctx;
    }
}

/// Construct a fresh instance of a tool template.
pub fn make_tool(kind: ToolKind) -> Box<dyn Tool> {
    match kind {
        ToolKind::Staff => Box::new(staff::Staff::new()),
        ToolKind::Feather => Box::new(feather::Feather::new()),
        ToolKind::Boots => Box::new(boots::Boots::new()),
    }
}

/// Player capability state carried forward across levels.
/// Process-wide for a playthrough; reset only on new-game.
#[derive(Debug, Clone, Default)]
pub struct PlayerProgress {
    /// Tool kind the player respawns holding.
    pub tool: Option<ToolKind>,
    /// Tool kinds ever acquired; gates the one-time status notification.
    pub seen: HashSet<ToolKind>,
}
