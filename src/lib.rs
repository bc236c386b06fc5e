pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod grid;
pub mod liquid;
pub mod objects;
pub mod png;
pub mod veins;

pub use config::{GenerationParams, MapConfig, ObjectCount, RawCount, StartZone, VeinBounds};
pub use error::{ConfigError, FileError, GenerationWarning};
pub use generator::{GeneratedMap, GenerationReport, generate, generate_map};
pub use grid::{Coord, Grid};
pub use liquid::Liquid;
pub use objects::ObjectMap;
