/// Unique identifier for a live entity.
/// Monotonic within a playthrough; never reused while the entity is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved occupancy-map entry representing static level geometry.
    pub const TERRAIN: EntityId = EntityId(u32::MAX);
}

/// Notification from the engine to its host, drained after each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The active level changed to the given catalog index.
    LevelChanged { index: usize },
    /// One-time pickup flavor text for a newly acquired tool kind.
    Status { lines: Vec<String> },
}
