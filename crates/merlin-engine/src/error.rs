use thiserror::Error;

/// Unrecoverable engine failures.
///
/// Everything else the simulation hits at runtime (an asset still in
/// flight, an out-of-bounds collision query, a missing tool hook) is
/// recovered locally and never surfaces here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The terrain image for a level could not be decoded. No sensible
    /// partial level can run without its occupancy source.
    #[error("level {index}: terrain `{path}` failed to load: {reason}")]
    TerrainLoad {
        index: usize,
        path: String,
        reason: String,
    },
    /// A sprite sheet referenced by the catalog could not be decoded.
    #[error("sprite `{name}` ({path}) failed to load: {reason}")]
    SpriteLoad {
        name: String,
        path: String,
        reason: String,
    },
    /// A level transition targeted an index outside the catalog.
    #[error("level index {0} out of range")]
    BadLevelIndex(usize),
    /// The game catalog JSON did not parse.
    #[error("malformed game catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}
