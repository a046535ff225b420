/// Tile types of the static map.
///
/// The map file stores one integer per cell: `0` = open, `1` = solid.
/// Solid cells form the walkable platform; open cells are void.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Open,
    Solid,
}

impl Tile {
    /// Decode a cell value from the map format.
    pub fn from_code(code: i64) -> Option<Tile> {
        match code {
            0 => Some(Tile::Open),
            1 => Some(Tile::Solid),
            _ => None,
        }
    }

    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid)
    }

    /// Does a footprint touching this tile get blocked?
    pub fn blocks_footprint(self) -> bool {
        !self.is_solid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_only_zero_and_one() {
        assert_eq!(Tile::from_code(0), Some(Tile::Open));
        assert_eq!(Tile::from_code(1), Some(Tile::Solid));
        assert_eq!(Tile::from_code(2), None);
        assert_eq!(Tile::from_code(-1), None);
    }

    #[test]
    fn only_open_tiles_block() {
        assert!(Tile::Open.blocks_footprint());
        assert!(!Tile::Solid.blocks_footprint());
    }
}
