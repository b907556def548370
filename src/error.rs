use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Load-time configuration failures. Nothing in the render path can fail.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("texture `{name}` is not loaded")]
    MissingTexture { name: String },

    #[error("texture `{name}` was supplied more than once")]
    DuplicateTexture { name: String },

    #[error("texture `{name}` expected {expected} pixels, got {actual}")]
    TextureSize {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("{what} is {actual} but the map declares {expected}")]
    MapDimensions {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("tile code `{code}` at ({x}, {y}) has no legend entry")]
    UnknownTile { code: char, x: usize, y: usize },

    #[error("border sector ({x}, {y}) has no walls; the map must be enclosed")]
    OpenBoundary { x: usize, y: usize },

    #[error("light code `{code}` at ({x}, {y}) is not a hex digit")]
    LightCode { code: char, x: usize, y: usize },

    #[error("light level {level} is out of range")]
    LightLevel { level: u32 },

    #[error("spawn position ({x}, {y}) is not passable")]
    SpawnBlocked { x: f64, y: f64 },

    #[error("no pixels were supplied to build a palette from")]
    EmptyPalette,
}
