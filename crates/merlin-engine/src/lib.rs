pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod error;
pub mod input;
pub mod renderer;
pub mod systems;
pub mod tools;

// Re-export key types at crate root for convenience
pub use api::host::{AssetLoader, EngineConfig, Renderer, TelemetrySink};
pub use api::types::{EngineEvent, EntityId};
pub use assets::catalog::{GameCatalog, LevelDescriptor, SpawnDescriptor, SpawnPoint, SpriteDescriptor};
pub use assets::image::{ImageData, Rgba8, SOLID_ALPHA};
pub use assets::store::{SpriteSheet, SpriteStore};
pub use components::behavior::{AltarState, Behavior, BlockState, DoorState, PlayerState, TrollState};
pub use components::entity::{Entity, EntityKind};
pub use components::sprite::SpriteState;
pub use core::collision::{CollisionMap, PixelRect};
pub use core::engine::Engine;
pub use core::level::{LevelDirector, LevelPhase, SimContext};
pub use core::registry::EntityRegistry;
pub use core::time::TickClock;
pub use error::EngineError;
pub use input::controls::{ControlState, InputEvent, Key};
pub use renderer::camera::Camera;
pub use tools::{make_tool, PlayerProgress, Tool, ToolCtx, ToolKind};
