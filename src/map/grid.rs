//! Tile passability grid
//!
//! Maps are laid out in 16 px source tiles drawn at 3x scale, so every
//! gameplay lookup works in 48 px cells. Anything outside the grid is a wall.

use glam::Vec2;

/// Source tile edge in pixels
pub const TILE_SIZE: i32 = 16;
/// Draw scale applied to every tile
pub const SCALE_FACTOR: i32 = 3;
/// On-screen tile edge in pixels
pub const SCALED_TILE_SIZE: i32 = TILE_SIZE * SCALE_FACTOR;

/// Default map width in tiles (1280 px window at 16 px tiles)
pub const MAP_WIDTH: usize = 1280 / TILE_SIZE as usize;
/// Default map height in tiles (720 px window at 16 px tiles)
pub const MAP_HEIGHT: usize = 720 / TILE_SIZE as usize;

/// Integer tile address. May lie outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl TileCoord {
    /// Create a tile coordinate
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a pixel position.
    ///
    /// Uses floor division so pixels left of or above the origin land on
    /// negative (always blocked) tiles instead of tile 0.
    #[must_use]
    pub fn from_pixel(pixel: Vec2) -> Self {
        let size = SCALED_TILE_SIZE as f32;
        Self {
            x: (pixel.x / size).floor() as i32,
            y: (pixel.y / size).floor() as i32,
        }
    }

    /// Pixel center of this tile
    #[must_use]
    pub fn center(self) -> Vec2 {
        let half = SCALED_TILE_SIZE / 2;
        Vec2::new(
            (self.x * SCALED_TILE_SIZE + half) as f32,
            (self.y * SCALED_TILE_SIZE + half) as f32,
        )
    }

    /// Neighbouring coordinate
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Read-only passability queries used by pathfinding, steering and perception.
pub trait Passability {
    /// Whether the tile at `(x, y)` can be walked on. Out of bounds is blocked.
    fn is_tile_passable(&self, x: i32, y: i32) -> bool;

    /// Whether the pixel position lies on a passable tile
    fn is_position_passable(&self, x: f32, y: f32) -> bool {
        let tile = TileCoord::from_pixel(Vec2::new(x, y));
        self.is_tile_passable(tile.x, tile.y)
    }

    /// Vector form of [`Passability::is_position_passable`]
    fn is_point_passable(&self, point: Vec2) -> bool {
        self.is_position_passable(point.x, point.y)
    }
}

/// A rectangular grid of passable/blocked cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major, true = passable
    cells: Vec<bool>,
}

impl Grid {
    /// Create a grid with every cell passable
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![true; width * height],
        }
    }

    /// Create a grid from row-major cells.
    ///
    /// Returns `None` when the cell count does not match the dimensions.
    #[must_use]
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Option<Self> {
        (cells.len() == width * height).then_some(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid from ASCII rows: `#` is blocked, anything else passable.
    ///
    /// Short rows are padded with passable cells.
    #[must_use]
    pub fn parse(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    grid.cells[y * width + x] = false;
                }
            }
        }
        grid
    }

    /// Width in tiles
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Size of the grid in pixels
    #[must_use]
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            (self.width as i32 * SCALED_TILE_SIZE) as f32,
            (self.height as i32 * SCALED_TILE_SIZE) as f32,
        )
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    /// Set a cell's passability. Out-of-bounds writes are ignored.
    pub fn set_passable(&mut self, x: i32, y: i32, passable: bool) {
        if let Some(index) = self.index(x, y) {
            self.cells[index] = passable;
        }
    }

    /// Block every cell on the outer border
    pub fn block_border(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        for x in 0..w {
            self.set_passable(x, 0, false);
            self.set_passable(x, h - 1, false);
        }
        for y in 0..h {
            self.set_passable(0, y, false);
            self.set_passable(w - 1, y, false);
        }
    }

    /// Whether the tile is inside the grid and passable
    #[must_use]
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|index| self.cells[index])
    }

    /// Tile containing a pixel position
    #[must_use]
    pub fn tile_of(&self, pixel: Vec2) -> TileCoord {
        TileCoord::from_pixel(pixel)
    }

    /// Pixel center of a tile
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> Vec2 {
        tile.center()
    }

    /// Number of passable cells
    #[must_use]
    pub fn passable_count(&self) -> usize {
        self.cells.iter().filter(|&&passable| passable).count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(MAP_WIDTH, MAP_HEIGHT)
    }
}

impl Passability for Grid {
    #[inline]
    fn is_tile_passable(&self, x: i32, y: i32) -> bool {
        self.is_passable(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dimensions() {
        let grid = Grid::default();
        assert_eq!(grid.width(), 80);
        assert_eq!(grid.height(), 45);
        assert_eq!(SCALED_TILE_SIZE, 48);
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let grid = Grid::new(4, 4);
        assert!(grid.is_passable(0, 0));
        assert!(grid.is_passable(3, 3));
        assert!(!grid.is_passable(-1, 0));
        assert!(!grid.is_passable(0, -1));
        assert!(!grid.is_passable(4, 0));
        assert!(!grid.is_passable(0, 4));
    }

    #[test]
    fn test_position_lookup_uses_scaled_tiles() {
        let mut grid = Grid::new(4, 4);
        grid.set_passable(1, 0, false);

        assert!(grid.is_position_passable(47.9, 10.0));
        assert!(!grid.is_position_passable(48.0, 10.0));
        assert!(!grid.is_position_passable(95.9, 47.9));
        assert!(grid.is_position_passable(96.0, 10.0));
    }

    #[test]
    fn test_negative_pixels_are_blocked() {
        let grid = Grid::new(4, 4);
        // Truncation would put -0.5 on tile 0
        assert!(!grid.is_position_passable(-0.5, 10.0));
        assert_eq!(TileCoord::from_pixel(Vec2::new(-0.5, 10.0)), TileCoord::new(-1, 0));
    }

    #[test]
    fn test_tile_center() {
        assert_eq!(TileCoord::new(0, 0).center(), Vec2::new(24.0, 24.0));
        assert_eq!(TileCoord::new(9, 2).center(), Vec2::new(456.0, 120.0));
        assert_eq!(TileCoord::from_pixel(TileCoord::new(7, 5).center()), TileCoord::new(7, 5));
    }

    #[test]
    fn test_parse_ascii_rows() {
        let grid = Grid::parse(&["..#", ".#.", "..."]);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert!(!grid.is_passable(2, 0));
        assert!(!grid.is_passable(1, 1));
        assert_eq!(grid.passable_count(), 7);
    }

    #[test]
    fn test_from_cells_checks_length() {
        assert!(Grid::from_cells(2, 2, vec![true; 3]).is_none());
        let grid = Grid::from_cells(2, 1, vec![false, true]).unwrap();
        assert!(!grid.is_passable(0, 0));
        assert!(grid.is_passable(1, 0));
    }

    #[test]
    fn test_block_border() {
        let mut grid = Grid::new(5, 4);
        grid.block_border();
        assert!(!grid.is_passable(0, 2));
        assert!(!grid.is_passable(4, 2));
        assert!(!grid.is_passable(2, 0));
        assert!(!grid.is_passable(2, 3));
        assert_eq!(grid.passable_count(), 6);
    }
}
