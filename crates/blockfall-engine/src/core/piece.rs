use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Serialize};

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    shape::{Shape, ShapeKind},
};

/// Identifier of a piece owned by a [`Board`](super::board::Board).
///
/// Identifiers are handed out in spawn order and never reused within one board.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct PieceId(u32);

impl PieceId {
    #[must_use]
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Cell colour of a piece, chosen independently of its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum PieceColor {
    Firebrick,
    Gold,
    OliveDrab,
    DarkGreen,
    Cyan,
    Aquamarine,
    MidnightBlue,
    DarkViolet,
    SlateGray,
}

impl Distribution<PieceColor> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceColor {
        PieceColor::ALL[rng.random_range(0..PieceColor::LEN)]
    }
}

impl PieceColor {
    pub const LEN: usize = 9;

    pub const ALL: [Self; Self::LEN] = [
        PieceColor::Firebrick,
        PieceColor::Gold,
        PieceColor::OliveDrab,
        PieceColor::DarkGreen,
        PieceColor::Cyan,
        PieceColor::Aquamarine,
        PieceColor::MidnightBlue,
        PieceColor::DarkViolet,
        PieceColor::SlateGray,
    ];

    /// Returns the colour as an `(r, g, b)` triple.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            PieceColor::Firebrick => (178, 34, 34),
            PieceColor::Gold => (255, 215, 0),
            PieceColor::OliveDrab => (107, 142, 35),
            PieceColor::DarkGreen => (0, 100, 0),
            PieceColor::Cyan => (0, 255, 255),
            PieceColor::Aquamarine => (127, 255, 212),
            PieceColor::MidnightBlue => (25, 25, 112),
            PieceColor::DarkViolet => (148, 0, 211),
            PieceColor::SlateGray => (112, 128, 144),
        }
    }
}

/// Grid coordinate of a piece's top-left corner.
///
/// Coordinates are signed so that a tentative move past the left wall can be
/// represented and then rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Position {
    col: i32,
    row: i32,
}

impl Position {
    /// Where every new piece appears: column 4, top row.
    pub const SPAWN: Self = Self::new(4, 0);

    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    #[must_use]
    pub const fn col(self) -> i32 {
        self.col
    }

    #[must_use]
    pub const fn row(self) -> i32 {
        self.row
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.col + dx, self.row + dy)
    }
}

/// Direction of a single-cell move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// Returns the `(dx, dy)` step of this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

/// Life-cycle stage of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::IsVariant)]
pub enum PieceStatus {
    /// Under player control.
    Falling,
    /// Resting on the stack; only the line-clear cascade moves it.
    Settled,
    /// Every cell was cleared. The board drops dead pieces immediately.
    Dead,
}

/// Result of a move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MoveOutcome {
    Moved,
    /// Wall or another piece in the way; nothing changed.
    Blocked,
    /// A downward move was blocked. The piece is now settled.
    Settled,
}

/// Result of a rotate attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum RotateOutcome {
    Rotated,
    /// No legal position was found for the rotated shape; nothing changed.
    Blocked,
    /// The piece kind does not rotate.
    NotRotatable,
}

/// Result of removing one row from a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ShedOutcome {
    /// Cells remain; columns were compacted.
    Trimmed,
    /// No cell remains. The piece is dead.
    Emptied,
}

/// A shape placed on the board.
///
/// A piece is plain data. Collision context is always passed in explicitly as the
/// board's full piece list; the piece skips itself (by id) when scanning it.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Direction, MoveOutcome, Piece, PieceColor, PieceId, ShapeKind};
///
/// let mut piece = Piece::spawn(PieceId::default(), ShapeKind::I.template(), PieceColor::Gold);
/// assert_eq!(piece.try_move(Direction::Down, &[]), MoveOutcome::Moved);
/// assert_eq!(piece.position().row(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    shape: Shape,
    position: Position,
    color: PieceColor,
    status: PieceStatus,
}

impl Piece {
    /// Creates a falling piece at [`Position::SPAWN`].
    #[must_use]
    pub fn spawn(id: PieceId, shape: Shape, color: PieceColor) -> Self {
        Self::with_position(id, shape, color, Position::SPAWN, PieceStatus::Falling)
    }

    #[must_use]
    pub(crate) fn with_position(
        id: PieceId,
        shape: Shape,
        color: PieceColor,
        position: Position,
        status: PieceStatus,
    ) -> Self {
        Self {
            id,
            shape,
            position,
            color,
            status,
        }
    }

    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn color(&self) -> PieceColor {
        self.color
    }

    #[must_use]
    pub fn status(&self) -> PieceStatus {
        self.status
    }

    /// Capability flag checked by callers before issuing a rotate.
    #[must_use]
    pub fn is_rotatable(&self) -> bool {
        self.kind().is_rotatable()
    }

    pub(crate) fn settle(&mut self) {
        self.status = PieceStatus::Settled;
    }

    /// Iterates over the absolute grid cells covered by this piece, paired with the
    /// shape row each one comes from.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Position, usize)> + '_ {
        self.shape
            .cells()
            .map(move |(r, c)| (self.position.offset(to_i32(c), to_i32(r)), r))
    }

    fn right_edge(&self) -> i32 {
        self.position.col + to_i32(self.shape.cols())
    }

    fn bottom_edge(&self) -> i32 {
        self.position.row + to_i32(self.shape.rows())
    }

    /// Returns whether every occupied cell lies inside the grid.
    #[must_use]
    pub fn is_inside_grid(&self) -> bool {
        self.occupied_cells().all(|(pos, _)| {
            (0..to_i32(BOARD_WIDTH)).contains(&pos.col)
                && (0..to_i32(BOARD_HEIGHT)).contains(&pos.row)
        })
    }

    /// Returns whether this piece shares a cell with `other`.
    #[must_use]
    pub fn overlaps(&self, other: &Piece) -> bool {
        let disjoint_boxes = self.right_edge() <= other.position.col
            || other.right_edge() <= self.position.col
            || self.bottom_edge() <= other.position.row
            || other.bottom_edge() <= self.position.row;
        if disjoint_boxes {
            return false;
        }
        self.occupied_cells()
            .any(|(pos, _)| other.occupied_cells().any(|(other_pos, _)| other_pos == pos))
    }

    /// Returns whether this piece overlaps any other live piece in `pieces`.
    #[must_use]
    pub fn collides(&self, pieces: &[Piece]) -> bool {
        pieces
            .iter()
            .filter(|other| other.id != self.id && !other.status.is_dead())
            .any(|other| self.overlaps(other))
    }

    /// Returns whether the piece may stay where it is.
    #[must_use]
    pub fn fits(&self, pieces: &[Piece]) -> bool {
        self.is_inside_grid() && !self.collides(pieces)
    }

    /// Shifts the piece one cell in `direction` unless that leaves the grid or hits
    /// another piece.
    ///
    /// A blocked downward move settles the piece.
    pub fn try_move(&mut self, direction: Direction, pieces: &[Piece]) -> MoveOutcome {
        let (dx, dy) = direction.delta();
        let origin = self.position;
        self.position = origin.offset(dx, dy);
        if self.fits(pieces) {
            return MoveOutcome::Moved;
        }
        self.position = origin;
        if direction == Direction::Down {
            self.settle();
            return MoveOutcome::Settled;
        }
        MoveOutcome::Blocked
    }

    /// Turns the shape 90° counter-clockwise and nudges the piece back into a legal
    /// spot.
    ///
    /// The piece is first pushed back inside the walls and above the floor, then
    /// lifted one row at a time while it overlaps another piece. If it reaches the
    /// top row still overlapping, the rotation is undone and [`RotateOutcome::Blocked`]
    /// is returned.
    ///
    /// Lifting never carries the piece above row 0. A rotation that only fits
    /// partly outside the grid is refused rather than kept, so a rotated piece
    /// never overlaps another one.
    ///
    /// Rotatability is not checked here; see [`Piece::is_rotatable`].
    pub fn rotate(&mut self, pieces: &[Piece]) -> RotateOutcome {
        let before = *self;
        self.shape = self.shape.rotated();

        while self.right_edge() > to_i32(BOARD_WIDTH) {
            self.position.col -= 1;
        }
        while self.position.col < 0 {
            self.position.col += 1;
        }
        while self.bottom_edge() > to_i32(BOARD_HEIGHT) {
            self.position.row -= 1;
        }
        while self.collides(pieces) {
            if self.position.row == 0 {
                *self = before;
                return RotateOutcome::Blocked;
            }
            self.position.row -= 1;
        }
        RotateOutcome::Rotated
    }

    /// Removes shape row `row_offset` after a line clear.
    ///
    /// Surviving cells are compacted: empty edge columns are dropped and the piece
    /// shifts right by the number of leading columns removed, so the remaining cells
    /// keep their columns. Rows below the removed one move up by one; the cascade
    /// drops them back down.
    pub fn shed(&mut self, row_offset: usize) -> ShedOutcome {
        let remaining = self.shape.without_row(row_offset);
        if remaining.is_empty() {
            self.shape = remaining;
            self.status = PieceStatus::Dead;
            return ShedOutcome::Emptied;
        }
        let (trimmed, leading) = remaining.trimmed_columns();
        self.shape = trimmed;
        self.position.col += to_i32(leading);
        ShedOutcome::Trimmed
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn to_i32(n: usize) -> i32 {
    debug_assert!(n <= BOARD_WIDTH.max(BOARD_HEIGHT));
    n as i32
}
