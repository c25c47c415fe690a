use serde::{Deserialize, Serialize};

use crate::core::{BOARD_HEIGHT, BOARD_WIDTH, Board, PieceColor, Position, Shape, ShapeKind};

use super::session::{GameSession, SessionState};

/// A piece as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PieceSnapshot {
    pub kind: ShapeKind,
    pub color: PieceColor,
    /// Top-left corner on the grid; `None` for the preview piece.
    pub position: Option<Position>,
    /// Shape rows drawn with `#` and `.`.
    pub cells: Vec<String>,
}

impl PieceSnapshot {
    fn new(shape: &Shape, color: PieceColor, position: Option<Position>) -> Self {
        Self {
            kind: shape.kind(),
            color,
            position,
            cells: shape.to_string().lines().map(str::to_owned).collect(),
        }
    }
}

/// Read-only view of a session, detached from the engine types.
///
/// `rows` has one string per grid row, each cell drawn as the owning piece's kind
/// letter (`O`, `T`, `I`, ...) or `.` when empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub score: usize,
    pub rows: Vec<String>,
    pub falling: Option<PieceSnapshot>,
    pub next: Option<PieceSnapshot>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(session: &GameSession) -> Self {
        let board = session.board();
        Self {
            state: session.state(),
            score: board.score(),
            rows: grid_rows(board),
            falling: board
                .falling_piece()
                .map(|p| PieceSnapshot::new(p.shape(), p.color(), Some(p.position()))),
            next: board
                .next_piece()
                .map(|n| PieceSnapshot::new(n.shape(), n.color(), None)),
        }
    }
}

fn grid_rows(board: &Board) -> Vec<String> {
    (0..BOARD_HEIGHT)
        .map(|row| {
            (0..BOARD_WIDTH)
                .map(|col| {
                    board
                        .cell(row, col)
                        .and_then(|cell| board.piece(cell.piece()))
                        .map_or('.', |piece| piece.kind().as_char())
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::NextPiece,
        engine::SessionConfig,
    };

    fn session_with_square() -> GameSession {
        let mut board = Board::with_seed(21);
        board
            .insert_settled(ShapeKind::L.template(), PieceColor::Cyan, Position::new(0, 17))
            .unwrap();
        board.set_next_piece(NextPiece::new(ShapeKind::O.template(), PieceColor::Gold));
        GameSession::from_board(board, SessionConfig::default().with_seed(21)).unwrap()
    }

    #[test]
    fn test_capture_draws_kind_letters() {
        let snapshot = session_with_square().snapshot();
        assert_eq!(snapshot.state, SessionState::Running);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.rows.len(), BOARD_HEIGHT);
        assert_eq!(snapshot.rows[0], "....OO....");
        assert_eq!(snapshot.rows[1], "....OO....");
        assert_eq!(snapshot.rows[17], "LL........");
        assert_eq!(snapshot.rows[18], "L.........");
        assert_eq!(snapshot.rows[19], "L.........");

        let falling = snapshot.falling.unwrap();
        assert_eq!(falling.kind, ShapeKind::O);
        assert_eq!(falling.color, PieceColor::Gold);
        assert_eq!(falling.position, Some(Position::SPAWN));
        assert_eq!(falling.cells, ["##", "##"]);

        let next = snapshot.next.unwrap();
        assert_eq!(next.position, None);
        assert!(!next.cells.is_empty());
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = session_with_square().snapshot();
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["state"], "Running");
        assert_eq!(value["score"], 0);
        assert_eq!(value["falling"]["kind"], "O");
        assert_eq!(value["falling"]["position"]["col"], 4);
        assert_eq!(value["rows"][19], "L.........");

        let back: SessionSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, snapshot);
    }
}
