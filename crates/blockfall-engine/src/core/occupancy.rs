use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    piece::{Piece, PieceId},
};

/// Occupant of a grid cell: the owning piece and the shape row the cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct OccupiedCell {
    piece: PieceId,
    row_offset: usize,
}

impl OccupiedCell {
    #[must_use]
    pub const fn new(piece: PieceId, row_offset: usize) -> Self {
        Self { piece, row_offset }
    }

    #[must_use]
    pub const fn piece(self) -> PieceId {
        self.piece
    }

    /// Row of the owner's shape matrix that covers this cell.
    #[must_use]
    pub const fn row_offset(self) -> usize {
        self.row_offset
    }
}

type GridRow = [Option<OccupiedCell>; BOARD_WIDTH];

/// Cell-by-cell view of which piece covers each grid cell.
///
/// The grid holds no state of its own: it is always rebuilt from the board's piece
/// list with [`Occupancy::from_pieces`], so building it twice from the same pieces
/// gives equal grids.
///
/// # Layout
///
/// - 20 rows × 10 columns
/// - (0, 0) is the top-left cell; rows grow downward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    rows: [GridRow; BOARD_HEIGHT],
}

impl Default for Occupancy {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Occupancy {
    pub const EMPTY: Self = Self {
        rows: [[None; BOARD_WIDTH]; BOARD_HEIGHT],
    };

    /// Stamps every occupied cell of every live piece into a fresh grid.
    ///
    /// Cells outside the grid are skipped; pieces on the board never have any.
    #[must_use]
    pub fn from_pieces(pieces: &[Piece]) -> Self {
        let mut grid = Self::EMPTY;
        for piece in pieces.iter().filter(|p| !p.status().is_dead()) {
            for (pos, row_offset) in piece.occupied_cells() {
                let (Ok(row), Ok(col)) = (usize::try_from(pos.row()), usize::try_from(pos.col()))
                else {
                    continue;
                };
                if let Some(cell) = grid.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
                    *cell = Some(OccupiedCell::new(piece.id(), row_offset));
                }
            }
        }
        grid
    }

    /// Returns the occupant of a cell, or `None` for empty or out-of-range cells.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<OccupiedCell> {
        self.rows.get(row)?.get(col).copied().flatten()
    }

    #[must_use]
    pub fn is_row_complete(&self, row: usize) -> bool {
        self.rows[row].iter().all(Option::is_some)
    }

    /// Returns the bottom-most complete row.
    #[must_use]
    pub fn lowest_complete_row(&self) -> Option<usize> {
        (0..BOARD_HEIGHT).rev().find(|&row| self.is_row_complete(row))
    }

    /// Returns the distinct occupants of `row`, in left-to-right first-seen order.
    #[must_use]
    pub fn row_occupants(&self, row: usize) -> ArrayVec<OccupiedCell, BOARD_WIDTH> {
        let mut occupants = ArrayVec::new();
        for cell in self.rows[row].iter().flatten() {
            if !occupants.contains(cell) {
                occupants.push(*cell);
            }
        }
        occupants
    }

    #[must_use]
    pub fn row_occupied_count(&self, row: usize) -> usize {
        self.rows[row].iter().flatten().count()
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        (0..BOARD_HEIGHT).map(|row| self.row_occupied_count(row)).sum()
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for cell in row {
                f.write_str(if cell.is_some() { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PieceColor, PieceStatus, Position, ShapeKind};

    fn settled(id: PieceId, kind: ShapeKind, col: i32, row: i32) -> Piece {
        Piece::with_position(
            id,
            kind.template(),
            PieceColor::Gold,
            Position::new(col, row),
            PieceStatus::Settled,
        )
    }

    #[test]
    fn test_empty_grid() {
        let grid = Occupancy::from_pieces(&[]);
        assert_eq!(grid, Occupancy::EMPTY);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.lowest_complete_row(), None);
    }

    #[test]
    fn test_stamps_piece_and_row_offset() {
        let id = PieceId::default();
        let grid = Occupancy::from_pieces(&[settled(id, ShapeKind::L, 3, 17)]);
        assert_eq!(grid.get(17, 3), Some(OccupiedCell::new(id, 0)));
        assert_eq!(grid.get(17, 4), Some(OccupiedCell::new(id, 0)));
        assert_eq!(grid.get(18, 3), Some(OccupiedCell::new(id, 1)));
        assert_eq!(grid.get(19, 3), Some(OccupiedCell::new(id, 2)));
        assert_eq!(grid.get(18, 4), None);
        assert_eq!(grid.get(20, 0), None);
        assert_eq!(grid.occupied_count(), 4);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let a = PieceId::default();
        let b = a.next();
        let pieces = [settled(a, ShapeKind::T, 0, 18), settled(b, ShapeKind::I, 9, 16)];
        let first = Occupancy::from_pieces(&pieces);
        let second = Occupancy::from_pieces(&pieces);
        assert_eq!(first, second);
    }

    #[test]
    fn test_row_occupants_are_distinct_in_order() {
        let ids = [PieceId::default(), PieceId::default().next(), PieceId::default().next().next()];
        let pieces = [
            settled(ids[0], ShapeKind::I, 0, 16),
            settled(ids[1], ShapeKind::O, 1, 18),
            settled(ids[2], ShapeKind::T, 3, 18),
        ];
        let grid = Occupancy::from_pieces(&pieces);
        let occupants = grid.row_occupants(19);
        assert_eq!(
            occupants.as_slice(),
            &[
                OccupiedCell::new(ids[0], 3),
                OccupiedCell::new(ids[1], 1),
                OccupiedCell::new(ids[2], 1),
            ]
        );
    }

    #[test]
    fn test_lowest_complete_row() {
        let mut id = PieceId::default();
        let mut pieces = Vec::new();
        // Five 2×2 squares fill rows 18 and 19.
        for col in (0..10).step_by(2) {
            pieces.push(settled(id, ShapeKind::O, col, 18));
            id = id.next();
        }
        let grid = Occupancy::from_pieces(&pieces);
        assert!(grid.is_row_complete(18));
        assert!(grid.is_row_complete(19));
        assert_eq!(grid.lowest_complete_row(), Some(19));
        assert_eq!(grid.row_occupied_count(19), BOARD_WIDTH);
    }

    #[test]
    fn test_display() {
        let grid = Occupancy::from_pieces(&[settled(PieceId::default(), ShapeKind::O, 0, 18)]);
        let text = grid.to_string();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), BOARD_HEIGHT);
        assert_eq!(lines[17], "..........");
        assert_eq!(lines[18], "##........");
        assert_eq!(lines[19], "##........");
    }
}
