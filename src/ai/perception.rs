//! Target perception
//!
//! Sight is a straight segment sampled at fixed steps against the grid.

use glam::Vec2;

use crate::map::Passability;

/// Distance between line-of-sight samples, in pixels
pub const SIGHT_SAMPLE_STEP: f32 = 16.0;

/// What an agent knows about its target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Center-to-center distance in pixels
    pub distance: f32,
    /// Target is within detection range and nothing blocks the view
    pub can_see: bool,
}

/// Sample the segment `from -> to` every [`SIGHT_SAMPLE_STEP`] pixels.
///
/// The start point is sampled, the end point is not. Coincident points are
/// always visible.
#[must_use]
pub fn has_line_of_sight<G: Passability + ?Sized>(grid: &G, from: Vec2, to: Vec2) -> bool {
    let offset = to - from;
    let distance = offset.length();
    if distance <= 0.0 {
        return true;
    }

    let direction = offset / distance;
    let mut travelled = 0.0;
    while travelled < distance {
        if !grid.is_point_passable(from + direction * travelled) {
            return false;
        }
        travelled += SIGHT_SAMPLE_STEP;
    }
    true
}

/// Measure distance and visibility. Sight is only traced inside `detection_range`.
#[must_use]
pub fn perceive<G: Passability + ?Sized>(
    grid: &G,
    position: Vec2,
    target: Vec2,
    detection_range: f32,
) -> Perception {
    let distance = position.distance(target);
    let can_see = distance < detection_range && has_line_of_sight(grid, position, target);
    Perception { distance, can_see }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Grid, TileCoord};

    #[test]
    fn test_clear_sight() {
        let grid = Grid::new(10, 3);
        let from = TileCoord::new(0, 1).center();
        let to = TileCoord::new(9, 1).center();
        assert!(has_line_of_sight(&grid, from, to));
    }

    #[test]
    fn test_wall_blocks_sight() {
        let mut grid = Grid::new(10, 3);
        grid.set_passable(5, 1, false);
        let from = TileCoord::new(0, 1).center();
        let to = TileCoord::new(9, 1).center();
        assert!(!has_line_of_sight(&grid, from, to));
    }

    #[test]
    fn test_end_point_not_sampled() {
        let mut grid = Grid::new(3, 1);
        grid.set_passable(2, 0, false);
        // Target sits 1 px inside the blocked tile; last sample lands at 88 px
        let from = Vec2::new(24.0, 24.0);
        let to = Vec2::new(97.0, 24.0);
        assert!(has_line_of_sight(&grid, from, to));
    }

    #[test]
    fn test_blocked_start_fails() {
        let mut grid = Grid::new(3, 1);
        grid.set_passable(0, 0, false);
        assert!(!has_line_of_sight(&grid, Vec2::new(24.0, 24.0), Vec2::new(120.0, 24.0)));
    }

    #[test]
    fn test_coincident_points_visible() {
        let grid = Grid::new(1, 1);
        assert!(has_line_of_sight(&grid, Vec2::splat(10.0), Vec2::splat(10.0)));
    }

    #[test]
    fn test_perceive_respects_range() {
        let grid = Grid::new(20, 3);
        let from = TileCoord::new(0, 1).center();
        let to = TileCoord::new(8, 1).center();

        let near = perceive(&grid, from, to, 400.0);
        assert!(near.can_see);
        assert_eq!(near.distance, 384.0);

        let far = perceive(&grid, from, to, 300.0);
        assert!(!far.can_see);
    }
}
