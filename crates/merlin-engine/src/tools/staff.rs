use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::behavior::Behavior;
use crate::tools::{Tool, ToolCtx, ToolKind};

/// Pointer slack, per axis, before a grabbed block slips loose.
const GRAB_RANGE: f32 = 4.0;

/// Grabs a movable block under the pointer and drags it after the cursor
/// until a second cast, going out of range, or release.
pub struct Staff {
    target: Option<EntityId>,
}

impl Staff {
    pub fn new() -> Self {
        Self { target: None }
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    fn drop_target(&mut self, ctx: &mut ToolCtx) {
        if let Some(id) = self.target.take() {
            if let Some(e) = ctx.registry.get_mut(id) {
                if let Behavior::Block(block) = &mut e.behavior {
                    block.held = false;
                }
                e.sprite.set("box");
                e.vel = Vec2::ZERO;
            }
        }
    }
}

impl Tool for Staff {
    fn kind(&self) -> ToolKind {
        ToolKind::Staff
    }

    fn sprite(&self) -> &'static str {
        if self.target.is_some() {
            "staff_active"
        } else {
            "staff"
        }
    }

    fn cast(&mut self, targets: &[EntityId], ctx: &mut ToolCtx) {
        if self.target.is_some() {
            self.drop_target(ctx);
            return;
        }
        for &id in targets {
            let Some(e) = ctx.registry.get_mut(id) else {
                continue;
            };
            if let Behavior::Block(block) = &mut e.behavior {
                block.held = true;
                e.sprite.set("box_active");
                self.target = Some(id);
                log::debug!("staff grabbed block {:?}", id);
                return;
            }
        }
    }

    fn tick(&mut self, ctx: &mut ToolCtx) {
        let Some(id) = self.target else {
            return;
        };
        let delta = {
            let Some(e) = ctx.registry.get(id) else {
                self.target = None;
                return;
            };
            let Some(b) = e.bbox else {
                return;
            };
            let center = Vec2::new(
                (b.left + b.right) as f32 / 2.0,
                (b.top + b.bot) as f32 / 2.0,
            );
            ctx.pointer_world - center
        };
        if delta.x.abs() > GRAB_RANGE || delta.y.abs() > GRAB_RANGE {
            self.drop_target(ctx);
            return;
        }
        // The block chases the pointer through the normal resolver, so it
        // still collides pixel by pixel while dragged.
        if let Some(e) = ctx.registry.get_mut(id) {
            e.vel = delta;
        }
    }

    fn release(&mut self, ctx: &mut ToolCtx) {
        self.drop_target(ctx);
    }
}
