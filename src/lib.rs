//! Software ray-casting engine: a sector grid rendered column by column into
//! an indexed-colour, light-ramped frame buffer.

pub mod camera;
pub mod color;
pub mod config;
pub mod demo;
pub mod error;
pub mod image_library;
pub mod input;
pub mod light;
pub mod map;
pub mod player;
pub mod present;
pub mod renderer;
pub mod screen_buffer;
pub mod texture;

pub use camera::Camera;
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use image_library::{ImageLibrary, TextureId};
pub use input::MovementInputs;
pub use light::LightLevel;
pub use map::{MapData, MapDescription, SectorSide, SectorTemplate, Spawn};
pub use player::Player;
pub use renderer::{RayHit, Renderer, WallStrip, cast_ray};
pub use screen_buffer::ScreenBuffer;
pub use texture::{IndexedColorTexture, RawTexture, TextureVariant};
