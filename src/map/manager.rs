//! Numbered map provider
//!
//! Maps live in a directory as `map_<n>.dat`. The manager owns the grid of the
//! currently loaded map; a failed load leaves the previous map in place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::file::{MapError, Result, TileMapFile};
use super::grid::{Grid, MAP_HEIGHT, MAP_WIDTH, Passability};

/// Tile sheet used for the forest maps
pub const FOREST_TILESHEET: &str = "Assets/Map/Fantasy/forest_/forest_1.png";
/// Tile sheet used for map 2
pub const TUNDRA_TILESHEET: &str = "Assets/Map/Fantasy/tundra_/tundra_.png";

/// Loads numbered maps and answers passability queries for the current one
#[derive(Debug, Clone)]
pub struct MapManager {
    maps_dir: PathBuf,
    grid: Grid,
    width: usize,
    height: usize,
    current_index: u32,
    current_path: Option<PathBuf>,
}

impl MapManager {
    /// Create a manager over `maps_dir` with an open default-sized grid
    #[must_use]
    pub fn new(maps_dir: impl Into<PathBuf>) -> Self {
        Self::with_size(maps_dir, MAP_WIDTH, MAP_HEIGHT)
    }

    /// Create a manager whose map files have the given dimensions
    #[must_use]
    pub fn with_size(maps_dir: impl Into<PathBuf>, width: usize, height: usize) -> Self {
        Self {
            maps_dir: maps_dir.into(),
            grid: Grid::new(width, height),
            width,
            height,
            current_index: 1,
            current_path: None,
        }
    }

    /// Create a manager that serves a prebuilt grid as map `index`.
    ///
    /// Used by simulations and tests that never touch the file system.
    #[must_use]
    pub fn from_grid(grid: Grid, index: u32) -> Self {
        Self {
            maps_dir: PathBuf::new(),
            width: grid.width(),
            height: grid.height(),
            grid,
            current_index: index,
            current_path: None,
        }
    }

    /// Path of map `index` inside the maps directory
    #[must_use]
    pub fn map_path(&self, index: u32) -> PathBuf {
        self.maps_dir.join(format!("map_{index}.dat"))
    }

    /// Load map `index`, replacing the current grid.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` for a missing file and propagates decode
    /// failures. The previous grid stays active on error.
    pub fn load_map(&mut self, index: u32) -> Result<()> {
        let path = self.map_path(index);
        match TileMapFile::load_sized(&path, self.width, self.height) {
            Ok(map) => {
                self.grid = map.to_grid();
                self.current_index = index;
                info!(
                    "Loaded map {} ({} passable tiles)",
                    path.display(),
                    self.grid.passable_count()
                );
                self.current_path = Some(path);
                Ok(())
            }
            Err(err) => {
                warn!("Map {} could not be loaded: {err}", path.display());
                Err(err)
            }
        }
    }

    /// Write `map` as map `index`, creating the maps directory if needed.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub fn save_map(&self, index: u32, map: &TileMapFile) -> Result<()> {
        fs::create_dir_all(&self.maps_dir)?;
        map.save(&self.map_path(index))
    }

    /// Swap in a grid directly, e.g. after procedural generation
    pub fn replace_grid(&mut self, grid: Grid, index: u32) {
        self.width = grid.width();
        self.height = grid.height();
        self.grid = grid;
        self.current_index = index;
        self.current_path = None;
    }

    /// Numbers of every `map_<n>.dat` in the maps directory, ascending.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` when the directory does not exist.
    pub fn list_maps(&self) -> Result<Vec<u32>> {
        let entries = match fs::read_dir(&self.maps_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MapError::NotFound {
                    path: self.maps_dir.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut indices: Vec<u32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parse_map_index(&entry.path()))
            .collect();
        indices.sort_unstable();
        Ok(indices)
    }

    /// Number of the active map
    #[must_use]
    pub fn current_map_index(&self) -> u32 {
        self.current_index
    }

    /// File the active map came from, if any
    #[must_use]
    pub fn current_map_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Passability grid of the active map
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Maps directory
    #[must_use]
    pub fn maps_dir(&self) -> &Path {
        &self.maps_dir
    }

    /// Tile sheet the presentation layer should bind for map `index`
    #[must_use]
    pub fn tilesheet_for(index: u32) -> &'static str {
        if index == 2 {
            TUNDRA_TILESHEET
        } else {
            FOREST_TILESHEET
        }
    }
}

impl Passability for MapManager {
    #[inline]
    fn is_tile_passable(&self, x: i32, y: i32) -> bool {
        self.grid.is_passable(x, y)
    }
}

fn parse_map_index(path: &Path) -> Option<u32> {
    if path.extension()? != "dat" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix("map_")?
        .parse()
        .ok()
}
