/// The static tile map.
///
/// ## Text format
///   ```
///   7 4
///   1 0 1 0 1 0 0
///   1 1 1 1 1 0 1
///   0 1 0 1 0 0 1
///   1 1 0 1 1 1 1
///   ```
/// The first two integers are `width height`, followed by exactly
/// `width * height` cells (0 = open, 1 = solid) in row-major order.
/// Any whitespace separates tokens; `#` starts a comment running to end of line.
///
/// Cells are stored flat: `index = row * width + column`.
/// Queries outside the map report solid.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::tile::Tile;

/// Failure to obtain a usable map. The grid is unusable afterwards.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("map is missing its width/height header")]
    MissingDimensions,
    #[error("map dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("token {index} is not an integer: {token:?}")]
    InvalidToken { index: usize, token: String },
    #[error("cell {index} has value {value}, expected 0 or 1")]
    InvalidCell { index: usize, value: i64 },
    #[error("map declares {expected} cells but contains {found}")]
    CellCount { expected: usize, found: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, cells: Vec<Tile>) -> Result<Self, LoadError> {
        if width == 0 || height == 0 {
            return Err(LoadError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        let expected = width.checked_mul(height).ok_or(LoadError::InvalidDimensions {
            width: i64::try_from(width).unwrap_or(i64::MAX),
            height: i64::try_from(height).unwrap_or(i64::MAX),
        })?;
        if cells.len() != expected {
            return Err(LoadError::CellCount { expected, found: cells.len() });
        }
        Ok(TileGrid { width, height, cells })
    }

    /// Read and parse a map file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut tokens = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(str::split_whitespace)
            .enumerate()
            .map(|(index, token)| {
                token.parse::<i64>().map_err(|_| LoadError::InvalidToken {
                    index,
                    token: token.to_string(),
                })
            });

        let width = tokens.next().ok_or(LoadError::MissingDimensions)??;
        let height = tokens.next().ok_or(LoadError::MissingDimensions)??;
        if width <= 0 || height <= 0 {
            return Err(LoadError::InvalidDimensions { width, height });
        }

        let expected = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .ok_or(LoadError::InvalidDimensions { width, height })?;
        let mut cells = Vec::with_capacity(expected.min(1 << 20));
        for (index, value) in tokens.enumerate() {
            let value = value?;
            let tile = Tile::from_code(value).ok_or(LoadError::InvalidCell { index, value })?;
            cells.push(tile);
        }

        Self::new(width as usize, height as usize, cells)
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    /// Is (column, row) inside the map?
    pub fn contains(&self, column: i64, row: i64) -> bool {
        column >= 0 && row >= 0 && (column as usize) < self.width && (row as usize) < self.height
    }

    /// Stored tile at (column, row), `None` outside the map.
    pub fn tile_at(&self, column: i64, row: i64) -> Option<Tile> {
        if !self.contains(column, row) {
            return None;
        }
        Some(self.cells[row as usize * self.width + column as usize])
    }

    /// Out-of-range coordinates are solid.
    pub fn is_solid(&self, column: i64, row: i64) -> bool {
        self.tile_at(column, row).map_or(true, Tile::is_solid)
    }

    /// Row-major iteration: `(column, row, tile)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &t)| (i % self.width, i / self.width, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PROTOTYPE_MAP: &str = "\
7 4
1 0 1 0 1 0 0
1 1 1 1 1 0 1
0 1 0 1 0 0 1
1 1 0 1 1 1 1
";

    #[test]
    fn parses_prototype_map() {
        let g = TileGrid::parse(PROTOTYPE_MAP).unwrap();
        assert_eq!(g.width(), 7);
        assert_eq!(g.height(), 4);
        assert!(g.is_solid(0, 0));
        assert!(!g.is_solid(1, 0));
        assert!(g.is_solid(1, 1));
        assert!(!g.is_solid(0, 2));
        assert_eq!(g.tile_at(6, 3), Some(Tile::Solid));
    }

    #[test]
    fn out_of_range_is_solid() {
        let g = TileGrid::parse("1 1 0").unwrap();
        assert!(!g.is_solid(0, 0));
        assert!(g.is_solid(-1, 0));
        assert!(g.is_solid(0, -1));
        assert!(g.is_solid(1, 0));
        assert!(g.is_solid(0, 1));
        assert_eq!(g.tile_at(5, 5), None);
    }

    #[test]
    fn comments_and_free_whitespace() {
        let g = TileGrid::parse("# header\n2 1 # dims\n0\t1\n").unwrap();
        assert_eq!(g.width(), 2);
        assert!(!g.is_solid(0, 0));
        assert!(g.is_solid(1, 0));
    }

    #[test]
    fn empty_text_is_missing_dimensions() {
        assert!(matches!(TileGrid::parse(""), Err(LoadError::MissingDimensions)));
        assert!(matches!(TileGrid::parse("3"), Err(LoadError::MissingDimensions)));
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert!(matches!(
            TileGrid::parse("0 3"),
            Err(LoadError::InvalidDimensions { width: 0, height: 3 })
        ));
        assert!(matches!(
            TileGrid::parse("2 -1"),
            Err(LoadError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(matches!(
            TileGrid::parse("4294967296 4294967296"),
            Err(LoadError::InvalidDimensions { width: 4294967296, height: 4294967296 })
        ));
        assert!(matches!(
            TileGrid::new(usize::MAX, 2, Vec::new()),
            Err(LoadError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn rejects_garbage_token() {
        match TileGrid::parse("2 1 0 x") {
            Err(LoadError::InvalidToken { index, token }) => {
                assert_eq!(index, 3);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_cell() {
        assert!(matches!(
            TileGrid::parse("2 1 0 2"),
            Err(LoadError::InvalidCell { index: 1, value: 2 })
        ));
    }

    #[test]
    fn rejects_wrong_cell_count() {
        assert!(matches!(
            TileGrid::parse("2 2 0 1 1"),
            Err(LoadError::CellCount { expected: 4, found: 3 })
        ));
        assert!(matches!(
            TileGrid::parse("1 1 0 1"),
            Err(LoadError::CellCount { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn load_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(PROTOTYPE_MAP.as_bytes()).unwrap();
        let g = TileGrid::load(f.path()).unwrap();
        assert_eq!((g.width(), g.height()), (7, 4));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        match TileGrid::load(&missing) {
            Err(LoadError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn iter_is_row_major() {
        let g = TileGrid::parse("2 2 1 0 0 1").unwrap();
        let cells: Vec<_> = g.iter().collect();
        assert_eq!(cells[1], (1, 0, Tile::Open));
        assert_eq!(cells[2], (0, 1, Tile::Open));
        assert_eq!(cells[3], (1, 1, Tile::Solid));
    }
}
