//! Binary tile map format
//!
//! A map file is a row-major sequence of cell records:
//!
//! ```text
//! placed: u8            0 = empty cell, anything else = placed
//! if placed:
//!   x, y, w, h: i32 LE  source rectangle in the tile sheet
//!   passable: u8        optional on the very last record
//! ```
//!
//! Files written before the passable flag existed end right after the last
//! rectangle; a missing flag there reads as passable. A file that ends on a
//! record boundary leaves the remaining cells empty.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::grid::{Grid, MAP_HEIGHT, MAP_WIDTH};

/// Errors raised while reading or writing map files.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("map record for cell {cell} is truncated")]
    Truncated { cell: usize },
}

pub type Result<T> = std::result::Result<T, MapError>;

/// Source rectangle of a placed tile in the tile sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureRect {
    /// Left edge in sheet pixels
    pub x: i32,
    /// Top edge in sheet pixels
    pub y: i32,
    /// Width in sheet pixels
    pub w: i32,
    /// Height in sheet pixels
    pub h: i32,
}

/// One cell of a map file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileRecord {
    /// Nothing drawn; always passable
    #[default]
    Empty,
    /// A tile drawn from the sheet
    Placed { rect: TextureRect, passable: bool },
}

impl TileRecord {
    /// Whether agents may walk over this cell
    #[must_use]
    pub fn is_passable(&self) -> bool {
        match self {
            TileRecord::Empty => true,
            TileRecord::Placed { passable, .. } => *passable,
        }
    }
}

/// Decoded contents of a map file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMapFile {
    width: usize,
    height: usize,
    tiles: Vec<TileRecord>,
}

/// Byte cursor over an in-memory map file
struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    fn read_u8(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.offset)?;
        self.offset += 1;
        Some(byte)
    }

    fn read_i32(&mut self) -> Option<i32> {
        let end = self.offset.checked_add(4)?;
        let chunk: [u8; 4] = self.bytes.get(self.offset..end)?.try_into().ok()?;
        self.offset = end;
        Some(i32::from_le_bytes(chunk))
    }
}

impl TileMapFile {
    /// An all-empty map
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileRecord::Empty; width * height],
        }
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

    /// Record at `(x, y)`, if in bounds
    #[must_use]
    pub fn tile(&self, x: usize, y: usize) -> Option<&TileRecord> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(y * self.width + x)
    }

    /// Replace the record at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, x: usize, y: usize, record: TileRecord) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = record;
        }
    }

    /// Decode a map of the given dimensions from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Truncated` when a placed cell's rectangle is cut off.
    pub fn decode(bytes: &[u8], width: usize, height: usize) -> Result<Self> {
        let mut map = Self::new(width, height);
        let mut cursor = Cursor::new(bytes);

        for cell in 0..width * height {
            let Some(placed) = cursor.read_u8() else {
                break;
            };
            if placed == 0 {
                continue;
            }

            let rect = match (
                cursor.read_i32(),
                cursor.read_i32(),
                cursor.read_i32(),
                cursor.read_i32(),
            ) {
                (Some(x), Some(y), Some(w), Some(h)) => TextureRect { x, y, w, h },
                _ => return Err(MapError::Truncated { cell }),
            };

            let passable = if cursor.is_at_end() {
                true
            } else {
                cursor.read_u8().is_some_and(|flag| flag != 0)
            };

            map.tiles[cell] = TileRecord::Placed { rect, passable };
        }

        Ok(map)
    }

    /// Encode in the on-disk format. Every placed cell carries its flag.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.tiles.len());
        for tile in &self.tiles {
            match tile {
                TileRecord::Empty => bytes.push(0),
                TileRecord::Placed { rect, passable } => {
                    bytes.push(1);
                    for value in [rect.x, rect.y, rect.w, rect.h] {
                        bytes.extend_from_slice(&value.to_le_bytes());
                    }
                    bytes.push(u8::from(*passable));
                }
            }
        }
        bytes
    }

    /// Read a map from any reader.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures and truncated records.
    pub fn read_from<R: Read>(reader: &mut R, width: usize, height: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::decode(&bytes, width, height)
    }

    /// Write the map to any writer.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode())?;
        writer.flush()?;
        Ok(())
    }

    /// Load a default-sized map from disk.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_sized(path, MAP_WIDTH, MAP_HEIGHT)
    }

    /// Load a map with explicit dimensions from disk.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NotFound` when the file does not exist, and
    /// `MapError::Io` for any other open or read failure.
    pub fn load_sized(path: &Path, width: usize, height: usize) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MapError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, width, height)
    }

    /// Save the map to disk, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)
    }

    /// Passability view of this map
    #[must_use]
    pub fn to_grid(&self) -> Grid {
        let cells = self.tiles.iter().map(TileRecord::is_passable).collect();
        Grid::from_cells(self.width, self.height, cells)
            .unwrap_or_else(|| Grid::new(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(passable: bool) -> TileRecord {
        TileRecord::Placed {
            rect: TextureRect {
                x: 16,
                y: 32,
                w: 16,
                h: 16,
            },
            passable,
        }
    }

    #[test]
    fn test_save_and_load_preserves_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map_1.dat");

        let mut map = TileMapFile::new(3, 2);
        map.set_tile(0, 0, placed(true));
        map.set_tile(2, 1, placed(false));
        map.save(&path).unwrap();

        let loaded = TileMapFile::load_sized(&path, 3, 2).unwrap();
        assert_eq!(loaded, map);

        let grid = loaded.to_grid();
        assert!(grid.is_passable(0, 0));
        assert!(grid.is_passable(1, 0));
        assert!(!grid.is_passable(2, 1));
    }

    #[test]
    fn test_missing_trailing_flag_reads_passable() {
        let mut bytes = vec![0u8, 1];
        for value in [0i32, 0, 16, 16] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        let map = TileMapFile::decode(&bytes, 2, 1).unwrap();
        assert_eq!(map.tile(0, 0), Some(&TileRecord::Empty));
        assert!(matches!(
            map.tile(1, 0),
            Some(TileRecord::Placed { passable: true, .. })
        ));
    }

    #[test]
    fn test_short_file_leaves_remaining_cells_empty() {
        let mut map = TileMapFile::new(2, 2);
        map.set_tile(0, 0, placed(false));
        let bytes = map.encode();

        // Only the first record survives
        let cut = &bytes[..18];
        let decoded = TileMapFile::decode(cut, 2, 2).unwrap();
        assert_eq!(decoded.tile(0, 0), Some(&placed(false)));
        assert_eq!(decoded.tile(1, 1), Some(&TileRecord::Empty));
        assert_eq!(decoded.to_grid().passable_count(), 3);
    }

    #[test]
    fn test_truncated_rect_is_an_error() {
        let bytes = [0u8, 1, 0, 0, 0];
        let err = TileMapFile::decode(&bytes, 2, 1).unwrap_err();
        assert!(matches!(err, MapError::Truncated { cell: 1 }));
    }

    #[test]
    fn test_nonzero_placed_byte_counts_as_placed() {
        let mut bytes = vec![7u8];
        for value in [1i32, 2, 3, 4] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.push(0);

        let map = TileMapFile::decode(&bytes, 1, 1).unwrap();
        assert!(!map.to_grid().is_passable(0, 0));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = TileMapFile::load(&dir.path().join("map_9.dat")).unwrap_err();
        assert!(matches!(err, MapError::NotFound { .. }));
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TileMapFile::load_sized(dir.path(), 1, 1).unwrap_err();
        assert!(matches!(err, MapError::Io(_)), "{err}");
    }
}
