use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tools::ToolKind;

/// Static startup configuration: every sprite sheet and level the game can
/// reach. Loaded from a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCatalog {
    /// Named sprite sheets.
    pub sprites: HashMap<String, SpriteDescriptor>,
    /// Playable levels, transitioned between by door target index.
    pub levels: Vec<LevelDescriptor>,
}

/// Describes one sprite sheet image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// Path handed to the host's asset loader.
    pub path: String,
    /// Animation frame count; 1 for static sprites.
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Width of one frame in pixels. Defaults to the full image width.
    #[serde(default)]
    pub frame_width: Option<u32>,
    /// Ticks each frame is held for.
    #[serde(default = "default_frame_speed")]
    pub frame_speed: u32,
}

/// Describes one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDescriptor {
    /// Terrain image; its alpha channel defines solid geometry.
    pub terrain: String,
    /// Player spawn point.
    pub start: SpawnPoint,
    /// Entities placed at level load.
    #[serde(default)]
    pub spawns: Vec<SpawnDescriptor>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: i32,
    pub y: i32,
}

/// Parameters for one spawned entity.
///
/// `kind` stays a free string here so an unknown kind fails that one spawn
/// at level load instead of poisoning the whole catalog parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnDescriptor {
    pub kind: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Collision-box size override; defaults to the sprite frame size.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Collision-box offset inside the sprite.
    #[serde(default)]
    pub width_offset: i32,
    #[serde(default)]
    pub height_offset: i32,
    /// Doors: catalog index of the destination level.
    #[serde(default)]
    pub level_target: Option<usize>,
    /// Altars: the tool template initially on offer.
    #[serde(default)]
    pub tool: Option<ToolKind>,
    /// Patrolling enemies: home point; defaults to the spawn position.
    #[serde(default)]
    pub home_x: Option<i32>,
    #[serde(default)]
    pub home_y: Option<i32>,
}

fn default_frames() -> u32 {
    1
}

fn default_frame_speed() -> u32 {
    10
}

impl GameCatalog {
    /// Parse a catalog from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn level(&self, index: usize) -> Option<&LevelDescriptor> {
        self.levels.get(index)
    }
}
