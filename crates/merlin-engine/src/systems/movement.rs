//! Sub-pixel movement resolution against the collision map.
//!
//! Velocities integrate into fractional per-axis accumulators; whole units
//! are then spent one pixel at a time, probing the map one pixel beyond the
//! leading edge before each step. Motion therefore can never skip a solid
//! boundary, regardless of velocity magnitude. Horizontal is fully resolved
//! before vertical within a tick; that ordering is load-bearing for feel at
//! corners and ledges.

use crate::api::types::EntityId;
use crate::assets::store::SpriteSheet;
use crate::components::entity::Entity;
use crate::core::collision::{CollisionMap, PixelRect};

/// Replace sentinel collision-box dimensions with the sprite's, exactly
/// once, the first time the sheet is available.
fn resolve_box(entity: &mut Entity, sheet: &SpriteSheet) {
    if entity.box_w.is_none() {
        entity.box_w = Some(sheet.frame_width);
    }
    if entity.box_h.is_none() {
        entity.box_h = Some(sheet.frame_height());
    }
}

/// Integrate this tick's velocity and advance the entity pixel by pixel.
/// A blocked axis zeroes its accumulator and stops for the rest of the tick.
pub fn resolve(entity: &mut Entity, sheet: &SpriteSheet, map: &CollisionMap) {
    resolve_box(entity, sheet);

    // A direction reversal discards the stale remainder, so no phantom step
    // fires on the first tick of the new direction.
    if entity.step.x * entity.vel.x < 0.0 {
        entity.step.x = 0.0;
    }
    if entity.step.y * entity.vel.y < 0.0 {
        entity.step.y = 0.0;
    }
    entity.step += entity.vel;

    let sprite_w = sheet.frame_width;
    let (level_w, level_h) = (map.width() as i32, map.height() as i32);

    while entity.step.x > 1.0 {
        entity.step.x -= 1.0;
        let Some(b) = entity.collision_box(sprite_w) else {
            return;
        };
        let probe = PixelRect::from_size(b.right, b.top, 1, b.height());
        if b.right >= level_w || map.occupied(probe) {
            entity.step.x = 0.0;
            break;
        }
        entity.pos.x += 1.0;
    }
    while entity.step.x < -1.0 {
        entity.step.x += 1.0;
        let Some(b) = entity.collision_box(sprite_w) else {
            return;
        };
        let probe = PixelRect::from_size(b.left - 1, b.top, 1, b.height());
        if b.left <= 0 || map.occupied(probe) {
            entity.step.x = 0.0;
            break;
        }
        entity.pos.x -= 1.0;
    }
    while entity.step.y > 1.0 {
        entity.step.y -= 1.0;
        let Some(b) = entity.collision_box(sprite_w) else {
            return;
        };
        let probe = PixelRect::from_size(b.left, b.bot, b.width(), 1);
        if b.bot >= level_h || map.occupied(probe) {
            entity.step.y = 0.0;
            break;
        }
        entity.pos.y += 1.0;
    }
    while entity.step.y < -1.0 {
        entity.step.y += 1.0;
        let Some(b) = entity.collision_box(sprite_w) else {
            return;
        };
        let probe = PixelRect::from_size(b.left, b.top - 1, b.width(), 1);
        if b.top <= 0 || map.occupied(probe) {
            entity.step.y = 0.0;
            break;
        }
        entity.pos.y -= 1.0;
    }
}

/// Recompute the bounding box from the resolved position and swap the
/// entity's occupancy footprint: old box cleared, new (level-clipped) box
/// stamped. Non-solid entities track a box but never occupy the map.
pub fn refresh_occupancy(entity: &mut Entity, sheet: &SpriteSheet, map: &mut CollisionMap) {
    resolve_box(entity, sheet);
    if let Some(old) = entity.bbox {
        if entity.solid {
            map.clear(entity.id, old);
        }
    }
    if let Some(raw) = entity.collision_box(sheet.frame_width) {
        let clipped = raw.clipped(map.width(), map.height());
        if entity.solid {
            map.stamp(entity.id, clipped);
        }
        entity.bbox = Some(clipped);
    }
    entity.prev_pos = entity.pos;
}

/// Ids in contact with the entity: the stamped box grown by one pixel on
/// all sides, minus the entity itself and terrain.
pub fn contact_set(entity: &Entity, map: &CollisionMap) -> Vec<EntityId> {
    let Some(bbox) = entity.bbox else {
        return Vec::new();
    };
    map.query(bbox.expanded(1))
        .into_iter()
        .filter(|&id| id != entity.id && id != EntityId::TERRAIN)
        .collect()
}

/// Whether anything solid sits in the one-pixel row under the entity.
pub fn on_ground(entity: &Entity, map: &CollisionMap) -> bool {
    let Some(b) = entity.bbox else {
        return false;
    };
    map.occupied(PixelRect::from_size(b.left, b.bot, b.width(), 1))
}

/// Whether the one-pixel column beyond the entity's left (`dir < 0`) or
/// right edge is occupied.
pub fn side_blocked(entity: &Entity, map: &CollisionMap, dir: f32) -> bool {
    let Some(b) = entity.bbox else {
        return false;
    };
    let col = if dir < 0.0 { b.left - 1 } else { b.right };
    map.occupied(PixelRect::from_size(col, b.top, 1, b.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::behavior::{Behavior, BlockState};
    use crate::components::entity::EntityKind;
    use crate::assets::image::ImageData;
    use glam::Vec2;

    fn sheet(w: u32, h: u32) -> SpriteSheet {
        SpriteSheet {
            image: ImageData::new(w, h, 4, vec![0; (w * h * 4) as usize]),
            frames: 1,
            frame_width: w,
            frame_speed: 10,
        }
    }

    fn block(id: u32, x: f32, y: f32) -> Entity {
        Entity::new(
            EntityId(id),
            EntityKind::Block,
            Vec2::new(x, y),
            "box",
            Behavior::Block(BlockState { held: false }),
        )
    }

    fn tick(e: &mut Entity, sheet: &SpriteSheet, map: &mut CollisionMap) {
        resolve(e, sheet, map);
        refresh_occupancy(e, sheet, map);
    }

    #[test]
    fn never_tunnels_through_a_wall() {
        // Wall whose nearest solid pixel is x=8; entity of width 2 at x=5.
        let mut map = CollisionMap::new(32, 32);
        map.stamp(EntityId::TERRAIN, PixelRect::from_size(8, 0, 2, 32));
        let sheet = sheet(2, 2);
        let mut e = block(1, 5.0, 10.0);
        tick(&mut e, &sheet, &mut map);

        for vel in [1.5, 7.0, 100.0] {
            e.pos.x = 5.0;
            e.step = Vec2::ZERO;
            e.vel = Vec2::ZERO;
            tick(&mut e, &sheet, &mut map); // restamp at the reset position
            e.vel = Vec2::new(vel, 0.0);
            for _ in 0..10 {
                tick(&mut e, &sheet, &mut map);
            }
            // Leading edge rests exactly against the wall.
            assert_eq!(e.bbox.unwrap().right, 8, "vel {vel}");
            assert_eq!(e.pos.x, 6.0, "vel {vel}");
        }
    }

    #[test]
    fn reversal_resets_the_accumulator() {
        let mut map = CollisionMap::new(32, 32);
        let sheet = sheet(2, 2);
        let mut e = block(1, 10.0, 10.0);
        e.vel = Vec2::new(0.3, 0.0);
        for _ in 0..3 {
            tick(&mut e, &sheet, &mut map);
        }
        assert_eq!(e.pos.x, 10.0);
        assert!((e.step.x - 0.9).abs() < 1e-6);

        // First leftward tick must not fire a phantom step from the stale
        // rightward remainder.
        e.vel = Vec2::new(-0.3, 0.0);
        tick(&mut e, &sheet, &mut map);
        assert_eq!(e.pos.x, 10.0);
        assert!((e.step.x + 0.3).abs() < 1e-6);
    }

    #[test]
    fn box_is_clipped_and_occupancy_exact_after_update() {
        let mut map = CollisionMap::new(16, 16);
        map.stamp(EntityId::TERRAIN, PixelRect::from_size(0, 14, 16, 2));
        let sheet = sheet(4, 4);
        let mut e = block(1, 13.0, 2.0);
        tick(&mut e, &sheet, &mut map);

        let b = e.bbox.unwrap();
        assert!(b.left >= 0 && b.top >= 0);
        assert!(b.right <= 16 && b.bot <= 16);
        // Raw box [13,17) clips to [13,16).
        assert_eq!(b.width(), 3);
        assert_eq!(map.query(b), vec![EntityId(1)]);
    }

    #[test]
    fn restamp_follows_movement() {
        let mut map = CollisionMap::new(32, 32);
        let sheet = sheet(2, 2);
        let mut e = block(1, 4.0, 4.0);
        tick(&mut e, &sheet, &mut map);
        let old = e.bbox.unwrap();

        // Velocity 3 spends two whole units; 1.0 stays in the accumulator.
        e.vel = Vec2::new(3.0, 0.0);
        tick(&mut e, &sheet, &mut map);
        assert_eq!(e.pos.x, 6.0);
        assert!(map.query(old).is_empty());
        assert_eq!(map.query(e.bbox.unwrap()), vec![EntityId(1)]);
    }

    #[test]
    fn stops_at_level_bounds() {
        let mut map = CollisionMap::new(16, 16);
        let sheet = sheet(2, 2);
        let mut e = block(1, 12.0, 4.0);
        e.vel = Vec2::new(50.0, 0.0);
        tick(&mut e, &sheet, &mut map);
        tick(&mut e, &sheet, &mut map);
        // Flush against the right edge: box [14,16).
        assert_eq!(e.pos.x, 14.0);
        assert_eq!(e.step.x, 0.0);
    }

    #[test]
    fn blocked_axis_keeps_the_other_axis_moving() {
        let mut map = CollisionMap::new(32, 32);
        map.stamp(EntityId::TERRAIN, PixelRect::from_size(8, 0, 1, 32));
        let sheet = sheet(2, 2);
        let mut e = block(1, 5.0, 5.0);
        tick(&mut e, &sheet, &mut map);
        e.vel = Vec2::new(10.0, 10.0);
        tick(&mut e, &sheet, &mut map);
        // Horizontal stops at the wall, vertical keeps falling.
        assert_eq!(e.bbox.unwrap().right, 8);
        assert!(e.pos.y > 5.0);
    }

    #[test]
    fn other_entities_block_movement() {
        let mut map = CollisionMap::new(32, 32);
        let sheet = sheet(2, 2);
        let mut wall = block(2, 10.0, 4.0);
        tick(&mut wall, &sheet, &mut map);

        let mut e = block(1, 4.0, 4.0);
        tick(&mut e, &sheet, &mut map);
        e.vel = Vec2::new(20.0, 0.0);
        tick(&mut e, &sheet, &mut map);
        assert_eq!(e.bbox.unwrap().right, 10);
    }

    #[test]
    fn contact_set_sees_adjacent_entities_not_terrain() {
        let mut map = CollisionMap::new(32, 32);
        map.stamp(EntityId::TERRAIN, PixelRect::from_size(0, 6, 32, 1));
        let sheet = sheet(2, 2);
        let mut a = block(1, 4.0, 4.0);
        let mut b = block(2, 6.0, 4.0);
        tick(&mut a, &sheet, &mut map);
        tick(&mut b, &sheet, &mut map);

        let contacts = contact_set(&a, &map);
        assert_eq!(contacts, vec![EntityId(2)]);
    }

    #[test]
    fn ground_probe_reads_the_row_below() {
        let mut map = CollisionMap::new(16, 16);
        map.stamp(EntityId::TERRAIN, PixelRect::from_size(0, 10, 16, 2));
        let sheet = sheet(4, 4);
        let mut e = block(1, 2.0, 6.0);
        tick(&mut e, &sheet, &mut map);
        assert!(on_ground(&e, &map));

        let mut floater = block(2, 2.0, 2.0);
        tick(&mut floater, &sheet, &mut map);
        assert!(!on_ground(&floater, &map));
    }
}
