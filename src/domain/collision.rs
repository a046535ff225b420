/// Footprint-vs-map collision.
///
/// A candidate rectangle is mapped to the inclusive tile span it covers:
///   start = floor(edge / tile_size)
///   end   = floor((far_edge - 1) / tile_size)
/// The `- 1` keeps a far edge lying exactly on a tile boundary from pulling
/// in the next tile.
///
/// Blocking rules, in order:
///   1. Span leaves the map on any side → blocked (implicit border).
///   2. Any OPEN tile in the span whose world rectangle intersects the
///      candidate → blocked.
///   3. Otherwise free. Solid tiles are never intersection-tested: they are
///      the walkable platform.
///
/// Zero- and negative-size candidates are not special-cased.

use super::geometry::Rect;
use super::grid::TileGrid;

/// Inclusive tile-coordinate span covered by a rectangle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileSpan {
    pub start_col: i64,
    pub start_row: i64,
    pub end_col: i64,
    pub end_row: i64,
}

impl TileSpan {
    pub fn of(rect: &Rect, tile_size: f32) -> Self {
        TileSpan {
            start_col: (rect.x / tile_size).floor() as i64,
            start_row: (rect.y / tile_size).floor() as i64,
            end_col: ((rect.x + rect.w - 1.0) / tile_size).floor() as i64,
            end_row: ((rect.y + rect.h - 1.0) / tile_size).floor() as i64,
        }
    }

    pub fn within(&self, grid: &TileGrid) -> bool {
        self.start_col >= 0
            && self.start_row >= 0
            && self.end_col < grid.width() as i64
            && self.end_row < grid.height() as i64
    }

    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> {
        let (c0, c1) = (self.start_col, self.end_col);
        (self.start_row..=self.end_row).flat_map(move |row| (c0..=c1).map(move |col| (col, row)))
    }
}

/// World rectangle of the tile at (column, row).
pub fn tile_rect(column: i64, row: i64, tile_size: f32) -> Rect {
    Rect::new(column as f32 * tile_size, row as f32 * tile_size, tile_size, tile_size)
}

/// May `candidate` occupy its position on `grid`?  `true` = no.
pub fn blocked(candidate: &Rect, grid: &TileGrid, tile_size: f32) -> bool {
    let span = TileSpan::of(candidate, tile_size);
    if !span.within(grid) {
        return true;
    }

    span.cells().any(|(col, row)| {
        grid.tile_at(col, row).is_some_and(|t| t.blocks_footprint())
            && candidate.intersects(&tile_rect(col, row, tile_size))
    })
}
