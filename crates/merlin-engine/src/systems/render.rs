//! Render handoff: final positions out to the host's blit surface.
//!
//! Draw order is terrain, then entities by altitude (creation order breaks
//! ties), then the player's held tool riding along on top. Frame counters
//! advance here, once per rendered frame, at each sheet's own speed.

use glam::Vec2;

use crate::api::host::Renderer;
use crate::api::types::EntityId;
use crate::assets::image::ImageData;
use crate::assets::store::SpriteStore;
use crate::components::entity::EntityKind;
use crate::core::registry::EntityRegistry;
use crate::renderer::camera::Camera;

/// Held-tool offset from the holder, mirrored with the sprite.
const TOOL_OFFSET_RIGHT: f32 = 4.0;
const TOOL_OFFSET_LEFT: f32 = -1.0;

pub fn render_stage(
    registry: &mut EntityRegistry,
    sprites: &SpriteStore,
    camera: &Camera,
    terrain: Option<&ImageData>,
    renderer: &mut dyn Renderer,
) {
    if let Some(img) = terrain {
        let (sx, sy) = camera.to_screen(Vec2::ZERO);
        renderer.blit(img, sx, sy, 0, 0, img.width, img.height, false);
    }

    let mut order: Vec<(i32, EntityId)> = registry
        .iter()
        .filter(|e| e.alive)
        .map(|e| (e.altitude, e.id))
        .collect();
    order.sort_by_key(|&(altitude, id)| (altitude, id.0));

    // Deferred so the tool always draws above everything else.
    let mut tool_overlay: Option<(&'static str, Vec2, bool)> = None;

    for (_, id) in order {
        let Some(e) = registry.get_mut(id) else {
            continue;
        };
        // An unresolved sheet means the entity simply isn't drawn yet.
        let Some(sheet) = sprites.get(&e.sprite.key) else {
            continue;
        };
        let (sx, sy) = camera.to_screen(e.pos);
        let src_x = e.sprite.frame_index * sheet.frame_width;
        renderer.blit(
            &sheet.image,
            sx,
            sy,
            src_x,
            0,
            sheet.frame_width,
            sheet.image.height,
            e.sprite.x_flip,
        );
        e.sprite.step(sheet);

        if e.kind == EntityKind::Player {
            let flip = e.sprite.x_flip;
            let offset = if flip {
                TOOL_OFFSET_LEFT
            } else {
                TOOL_OFFSET_RIGHT
            };
            let pos = e.pos + Vec2::new(offset, 0.0);
            if let Some(name) = e
                .player_state()
                .and_then(|st| st.tool.as_ref())
                .map(|t| t.sprite())
            {
                tool_overlay = Some((name, pos, flip));
            }
        }
    }

    if let Some((name, pos, flip)) = tool_overlay {
        if let Some(sheet) = sprites.get(name) {
            let (sx, sy) = camera.to_screen(pos);
            renderer.blit(
                &sheet.image,
                sx,
                sy,
                0,
                0,
                sheet.frame_width,
                sheet.image.height,
                flip,
            );
        }
    }
}
