//! Level lifecycle state and entity spawning.

use glam::Vec2;

use crate::api::types::EntityId;
use crate::assets::catalog::{SpawnDescriptor, SpawnPoint};
use crate::assets::image::ImageData;
use crate::components::behavior::{
    AltarState, Behavior, BlockState, DoorState, PlayerState, TrollState,
};
use crate::components::entity::{Entity, EntityKind};
use crate::core::registry::EntityRegistry;
use crate::tools::{self, PlayerProgress};

/// Where the level load/transition cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    /// Terrain requested; nothing simulates or renders until it resolves.
    Loading,
    /// The fixed per-tick pipeline is running.
    Playing,
    /// A door fired; teardown happens at the next frame boundary.
    Transitioning { target: usize },
}

/// Per-level load state owned by the engine.
pub struct LevelDirector {
    pub index: usize,
    pub phase: LevelPhase,
    pub terrain_path: String,
    /// Decoded terrain, kept for the render handoff.
    pub terrain: Option<ImageData>,
}

impl LevelDirector {
    pub fn new() -> Self {
        Self {
            index: 0,
            phase: LevelPhase::Loading,
            terrain_path: String::new(),
            terrain: None,
        }
    }
}

impl Default for LevelDirector {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-level simulation context owned by the loop and passed to update
/// stages. Rebuilt on every level load; nothing here survives a transition.
pub struct SimContext {
    /// The player entity, once spawned.
    pub player: Option<EntityId>,
    /// Camera focus target.
    pub focus: Option<EntityId>,
    /// Door-requested transition, consumed at the frame boundary.
    pub pending_level: Option<usize>,
    /// Cast trigger translated into level coordinates, consumed this tick.
    pub cast_at: Option<Vec2>,
    /// Camera snapshot used for pointer translation this tick.
    pub camera_pos: Vec2,
    pub view: (u32, u32),
    /// Spawns requested mid-tick; applied after the deletion drain.
    pub spawn_queue: Vec<SpawnDescriptor>,
}

impl SimContext {
    pub fn new(view_w: u32, view_h: u32) -> Self {
        Self {
            player: None,
            focus: None,
            pending_level: None,
            cast_at: None,
            camera_pos: Vec2::ZERO,
            view: (view_w, view_h),
            spawn_queue: Vec::new(),
        }
    }

    /// Reset for a fresh level, keeping the viewport.
    pub fn reset(&mut self) {
        *self = Self::new(self.view.0, self.view.1);
    }

    /// Translate screen coordinates into level coordinates using this
    /// tick's camera snapshot.
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        self.camera_pos + screen
            - Vec2::new(self.view.0 as f32 / 2.0, self.view.1 as f32 / 2.0)
    }

    /// Request a spawn from mid-tick code (collide handlers, tools). Applied
    /// once the entity set is safe to grow.
    pub fn queue_spawn(&mut self, desc: SpawnDescriptor) {
        self.spawn_queue.push(desc);
    }
}

/// Construct and register one catalog spawn.
///
/// An unknown kind is fatal to that spawn call only: reported, skipped, no
/// partial entity. Collision-box fields stay sentinel unless the descriptor
/// overrides them, deferring to sprite dimensions on resolution.
pub fn spawn_from(
    desc: &SpawnDescriptor,
    registry: &mut EntityRegistry,
    sim: &mut SimContext,
    progress: &PlayerProgress,
) -> Option<EntityId> {
    let Some(kind) = EntityKind::from_name(&desc.kind) else {
        log::warn!("unknown entity kind `{}`; spawn skipped", desc.kind);
        return None;
    };
    let id = registry.alloc_id();
    let pos = Vec2::new(desc.x as f32, desc.y as f32);

    let mut e = match kind {
        EntityKind::Player => {
            let tool = progress.tool.map(tools::make_tool);
            let mut e = Entity::new(id, kind, pos, "merlin", Behavior::Player(PlayerState::new(tool)));
            e.altitude = 3;
            e
        }
        EntityKind::Troll => {
            let home = Vec2::new(
                desc.home_x.unwrap_or(desc.x) as f32,
                desc.home_y.unwrap_or(desc.y) as f32,
            );
            let mut e = Entity::new(id, kind, pos, "troll", Behavior::Troll(TrollState { home }));
            e.altitude = 2;
            e.box_w = Some(9);
            e.box_h = Some(11);
            e.box_dy = 1;
            e
        }
        EntityKind::Altar => {
            let sprite = desc.tool.map_or("altar", |k| k.altar_sprite());
            Entity::new(id, kind, pos, sprite, Behavior::Altar(AltarState { stored: desc.tool }))
        }
        EntityKind::Door => {
            let Some(target) = desc.level_target else {
                log::warn!("door at ({}, {}) has no level target; spawn skipped", desc.x, desc.y);
                return None;
            };
            Entity::new(id, kind, pos, "door", Behavior::Door(DoorState { target }))
        }
        EntityKind::Block => Entity::new(
            id,
            kind,
            pos,
            "box",
            Behavior::Block(BlockState { held: false }),
        ),
    };

    if let Some(w) = desc.width {
        e.box_w = Some(w);
    }
    if let Some(h) = desc.height {
        e.box_h = Some(h);
    }
    if desc.width_offset != 0 {
        e.box_dx = desc.width_offset;
    }
    if desc.height_offset != 0 {
        e.box_dy = desc.height_offset;
    }

    let id = registry.insert(e);
    if kind == EntityKind::Player {
        sim.player = Some(id);
        sim.focus = Some(id);
    }
    Some(id)
}

/// Spawn the player at the level's spawn point, carrying forward any held
/// tool from the playthrough state.
pub fn spawn_player(
    start: SpawnPoint,
    registry: &mut EntityRegistry,
    sim: &mut SimContext,
    progress: &PlayerProgress,
) -> Option<EntityId> {
    let desc = SpawnDescriptor {
        kind: "merlin".to_string(),
        x: start.x,
        y: start.y,
        ..SpawnDescriptor::default()
    };
    spawn_from(&desc, registry, sim, progress)
}
