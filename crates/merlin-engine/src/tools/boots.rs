use crate::tools::{Tool, ToolCtx, ToolKind};

/// Jump impulse, half again the default.
const SPRING_JUMP: f32 = -1.5;

/// Springing boots: a taller jump from the ground. Owns the whole jump
/// branch while equipped, including the landing reset and the held-jump
/// latch.
pub struct Boots;

impl Boots {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for Boots {
    fn kind(&self) -> ToolKind {
        ToolKind::Boots
    }

    fn sprite(&self) -> &'static str {
        "boots"
    }

    fn jump(&mut self, ctx: &mut ToolCtx) -> bool {
        let grounded = ctx.on_ground();
        let pressed = ctx.controls.jump();
        let Some(p) = ctx.player_mut() else {
            return false;
        };
        if grounded {
            p.vel.y = 0.0;
            let latched = p.player_state().is_some_and(|s| s.jump_held);
            if pressed {
                if !latched {
                    p.vel.y = SPRING_JUMP;
                    if let Some(s) = p.player_state_mut() {
                        s.jump_held = true;
                    }
                }
            } else if let Some(s) = p.player_state_mut() {
                s.jump_held = false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::behavior::{Behavior, PlayerState};
    use crate::components::entity::{Entity, EntityKind};
    use crate::core::collision::{CollisionMap, PixelRect};
    use crate::core::registry::EntityRegistry;
    use crate::input::controls::{ControlState, InputEvent, Key};
    use glam::Vec2;

    struct World {
        registry: EntityRegistry,
        map: CollisionMap,
        controls: ControlState,
        player: EntityId,
    }

    fn grounded_world() -> World {
        let mut registry = EntityRegistry::new();
        let mut map = CollisionMap::new(32, 32);
        map.stamp(EntityId::TERRAIN, PixelRect::from_size(0, 10, 32, 2));
        let player = registry.alloc_id();
        let mut e = Entity::new(
            player,
            EntityKind::Player,
            Vec2::new(4.0, 4.0),
            "merlin",
            Behavior::Player(PlayerState::new(None)),
        );
        e.bbox = Some(PixelRect::from_size(4, 4, 4, 6));
        registry.insert(e);
        World {
            registry,
            map,
            controls: ControlState::new(),
            player,
        }
    }

    fn ctx<'a>(w: &'a mut World) -> ToolCtx<'a> {
        ToolCtx {
            player: w.player,
            registry: &mut w.registry,
            map: &w.map,
            controls: &w.controls,
            pointer_world: Vec2::ZERO,
        }
    }

    #[test]
    fn spring_jump_is_taller_than_default() {
        let mut w = grounded_world();
        w.controls.apply(InputEvent::KeyDown { key: Key::Up });
        let player = w.player;
        let mut boots = Boots::new();
        let mut c = ctx(&mut w);
        assert!(boots.jump(&mut c));
        assert_eq!(c.registry.get(player).unwrap().vel.y, SPRING_JUMP);
    }

    #[test]
    fn holding_jump_does_not_bunny_hop() {
        let mut w = grounded_world();
        w.controls.apply(InputEvent::KeyDown { key: Key::Up });
        let player = w.player;
        let mut boots = Boots::new();
        let mut c = ctx(&mut w);
        boots.jump(&mut c);
        // Still holding, still grounded: no second impulse.
        c.registry.get_mut(player).unwrap().vel.y = 0.0;
        boots.jump(&mut c);
        assert_eq!(c.registry.get(player).unwrap().vel.y, 0.0);
    }

    #[test]
    fn releasing_jump_rearms_the_latch() {
        let mut w = grounded_world();
        w.controls.apply(InputEvent::KeyDown { key: Key::Up });
        let mut boots = Boots::new();
        {
            let mut c = ctx(&mut w);
            boots.jump(&mut c);
        }
        w.controls.apply(InputEvent::KeyUp { key: Key::Up });
        {
            let mut c = ctx(&mut w);
            boots.jump(&mut c);
        }
        w.controls.apply(InputEvent::KeyDown { key: Key::Up });
        let player = w.player;
        let mut c = ctx(&mut w);
        boots.jump(&mut c);
        assert_eq!(c.registry.get(player).unwrap().vel.y, SPRING_JUMP);
    }

    #[test]
    fn airborne_hook_still_claims_the_tick() {
        let mut w = grounded_world();
        w.registry.get_mut(w.player).unwrap().bbox = Some(PixelRect::from_size(4, 0, 4, 6));
        let mut boots = Boots::new();
        let mut c = ctx(&mut w);
        // Airborne: no impulse, but jump physics is still boots-owned.
        assert!(boots.jump(&mut c));
    }
}
