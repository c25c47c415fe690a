use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{PieceCollisionError, TopReached};

use super::{
    occupancy::{Occupancy, OccupiedCell},
    piece::{
        Direction, MoveOutcome, Piece, PieceColor, PieceId, PieceStatus, Position, RotateOutcome,
    },
    shape::{Shape, random_shape},
};

/// Points awarded per cleared row.
pub const SCORE_PER_LINE: usize = 5;

/// The piece waiting to be spawned, shown as a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPiece {
    shape: Shape,
    color: PieceColor,
}

impl NextPiece {
    #[must_use]
    pub fn new(shape: Shape, color: PieceColor) -> Self {
        Self { shape, color }
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn color(&self) -> PieceColor {
        self.color
    }
}

/// The 10×20 playing field and every piece on it.
///
/// The board is the arena that owns all pieces. Everything else refers to pieces
/// by [`PieceId`]. The [`Occupancy`] grid is derived from the piece list after
/// every change and is never edited directly.
///
/// # Line clears
///
/// After a spawn (and after every successful move), complete rows are cleared one
/// at a time from the bottom up. Each clear awards [`SCORE_PER_LINE`], sheds the
/// row from every piece crossing it, then lets every settled piece fall as far as
/// it can, in spawn order. The grid is then rebuilt and scanned again.
///
/// # Example
///
/// ```
/// use blockfall_engine::Board;
///
/// let mut board = Board::with_seed(42);
/// let id = board.spawn_next().unwrap();
/// assert_eq!(board.falling_piece().map(|p| p.id()), Some(id));
/// assert!(board.next_piece().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    pieces: Vec<Piece>,
    occupancy: Occupancy,
    falling: Option<PieceId>,
    next: Option<NextPiece>,
    next_id: PieceId,
    score: usize,
    rng: Pcg32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Creates an empty board seeded from the OS random source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Creates an empty board whose piece sequence is fully determined by `seed`.
    ///
    /// No piece is on the board yet; call [`Board::spawn_next`] to start.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            pieces: Vec::new(),
            occupancy: Occupancy::EMPTY,
            falling: None,
            next: None,
            next_id: PieceId::default(),
            score: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// All live pieces in spawn order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id() == id)
    }

    #[must_use]
    pub fn falling_piece_id(&self) -> Option<PieceId> {
        self.falling
    }

    #[must_use]
    pub fn falling_piece(&self) -> Option<&Piece> {
        self.piece(self.falling?)
    }

    #[must_use]
    pub fn next_piece(&self) -> Option<&NextPiece> {
        self.next.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Returns the current cell-by-cell occupancy.
    #[must_use]
    pub fn occupancy_view(&self) -> &Occupancy {
        &self.occupancy
    }

    /// Returns the occupant of a grid cell.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<OccupiedCell> {
        self.occupancy.get(row, col)
    }

    /// Replaces the preview piece.
    pub fn set_next_piece(&mut self, next: NextPiece) {
        self.next = Some(next);
    }

    /// Places a settled piece at `position`, for staging positions.
    ///
    /// The piece is rejected if it leaves the grid or overlaps another piece. No
    /// line clear runs until the next spawn or move.
    pub fn insert_settled(
        &mut self,
        shape: Shape,
        color: PieceColor,
        position: Position,
    ) -> Result<PieceId, PieceCollisionError> {
        let piece = Piece::with_position(
            self.next_id,
            shape,
            color,
            position,
            PieceStatus::Settled,
        );
        if !piece.fits(&self.pieces) {
            return Err(PieceCollisionError);
        }
        self.next_id = self.next_id.next();
        self.pieces.push(piece);
        self.rebuild_occupancy();
        Ok(piece.id())
    }

    fn draw_next(&mut self) -> NextPiece {
        let shape = random_shape(&mut self.rng);
        let color = self.rng.random();
        NextPiece::new(shape, color)
    }

    fn index_of(&self, id: PieceId) -> Option<usize> {
        self.pieces.iter().position(|p| p.id() == id)
    }

    /// Puts the preview piece (or a fresh random one) into play at the spawn point.
    ///
    /// A still-falling previous piece is settled first. If the new piece would
    /// overlap the stack, nothing changes and [`TopReached`] is returned; the
    /// preview piece stays queued.
    pub fn spawn_next(&mut self) -> Result<PieceId, TopReached> {
        let next = match self.next.take() {
            Some(next) => next,
            None => self.draw_next(),
        };
        let piece = Piece::spawn(self.next_id, next.shape, next.color);
        if !piece.fits(&self.pieces) {
            tracing::info!(kind = ?piece.kind(), "spawn blocked, top reached");
            self.next = Some(next);
            return Err(TopReached);
        }

        if let Some(previous) = self.falling.and_then(|id| self.index_of(id)) {
            self.pieces[previous].settle();
        }
        self.next_id = self.next_id.next();
        self.pieces.push(piece);
        self.falling = Some(piece.id());
        self.next = Some(self.draw_next());
        tracing::debug!(id = %piece.id(), kind = ?piece.kind(), "piece spawned");

        self.rebuild_occupancy();
        self.check_and_clear_lines();
        Ok(piece.id())
    }

    /// Recomputes the occupancy grid from the piece list.
    pub fn rebuild_occupancy(&mut self) {
        self.occupancy = Occupancy::from_pieces(&self.pieces);
    }

    /// Clears complete rows bottom-up until none remains.
    ///
    /// Returns the number of rows cleared.
    pub fn check_and_clear_lines(&mut self) -> usize {
        let mut cleared = 0;
        while let Some(row) = self.occupancy.lowest_complete_row() {
            self.score += SCORE_PER_LINE;
            cleared += 1;

            for cell in self.occupancy.row_occupants(row) {
                self.shed(cell.piece(), cell.row_offset());
            }
            self.drop_settled_pieces();
            self.rebuild_occupancy();
            tracing::info!(row, score = self.score, "line cleared");
        }
        cleared
    }

    fn shed(&mut self, id: PieceId, row_offset: usize) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        if self.pieces[index].shed(row_offset).is_emptied() {
            self.pieces.remove(index);
            if self.falling == Some(id) {
                self.falling = None;
            }
            tracing::trace!(%id, "piece cleared away");
        }
    }

    /// Lets each settled piece, in spawn order, fall until it rests.
    fn drop_settled_pieces(&mut self) {
        for index in 0..self.pieces.len() {
            if !self.pieces[index].status().is_settled() {
                continue;
            }
            let mut piece = self.pieces[index];
            while piece.try_move(Direction::Down, &self.pieces).is_moved() {
                self.pieces[index] = piece;
            }
        }
    }

    /// Moves a piece one cell.
    ///
    /// On success the grid is rebuilt and complete rows are cleared. A blocked
    /// downward move settles the piece and clears the falling slot if it was the
    /// falling piece; spawning its successor is up to the caller. Unknown ids are
    /// reported as blocked.
    pub fn try_move(&mut self, id: PieceId, direction: Direction) -> MoveOutcome {
        let Some(index) = self.index_of(id) else {
            return MoveOutcome::Blocked;
        };
        let mut piece = self.pieces[index];
        let outcome = piece.try_move(direction, &self.pieces);
        self.pieces[index] = piece;
        match outcome {
            MoveOutcome::Moved => {
                tracing::trace!(%id, ?direction, "piece moved");
                self.rebuild_occupancy();
                self.check_and_clear_lines();
            }
            MoveOutcome::Settled => {
                tracing::debug!(%id, position = ?piece.position(), "piece settled");
                if self.falling == Some(id) {
                    self.falling = None;
                }
            }
            MoveOutcome::Blocked => {}
        }
        outcome
    }

    /// Rotates a piece 90° counter-clockwise, unless its kind does not rotate.
    pub fn try_rotate(&mut self, id: PieceId) -> RotateOutcome {
        let Some(index) = self.index_of(id) else {
            return RotateOutcome::Blocked;
        };
        let mut piece = self.pieces[index];
        if !piece.is_rotatable() {
            return RotateOutcome::NotRotatable;
        }
        let outcome = piece.rotate(&self.pieces);
        if outcome.is_rotated() {
            self.pieces[index] = piece;
            self.rebuild_occupancy();
        }
        outcome
    }
}
