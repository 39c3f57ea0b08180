//! Tile maps and passability
//!
//! The grid answers "can an agent stand here?", the file module reads and
//! writes the on-disk map format, and the manager loads maps by number.

mod file;
mod grid;
mod manager;

pub use file::{MapError, TextureRect, TileMapFile, TileRecord};
pub use grid::{
    Grid, MAP_HEIGHT, MAP_WIDTH, Passability, SCALE_FACTOR, SCALED_TILE_SIZE, TILE_SIZE, TileCoord,
};
pub use manager::{FOREST_TILESHEET, MapManager, TUNDRA_TILESHEET};
