use std::fmt;

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Serialize};

/// Enum representing the type of a shape.
///
/// The kind survives rotation, flipping and shedding, so a piece cleared down to
/// a single cell still knows which template it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum ShapeKind {
    /// Square piece. The only kind that never rotates.
    O = 0,
    /// T-piece.
    T = 1,
    /// Straight piece.
    I = 2,
    /// L-piece.
    L = 3,
    /// J-piece (mirrored L).
    J = 4,
    /// S-piece.
    S = 5,
    /// Z-piece (mirrored S).
    Z = 6,
}

impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        ShapeKind::ALL[rng.random_range(0..ShapeKind::LEN)]
    }
}

impl ShapeKind {
    /// Number of shape kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::I,
        ShapeKind::L,
        ShapeKind::J,
        ShapeKind::S,
        ShapeKind::Z,
    ];

    /// Returns whether pieces of this kind accept rotate commands.
    ///
    /// ```
    /// use blockfall_engine::ShapeKind;
    ///
    /// assert!(!ShapeKind::O.is_rotatable());
    /// assert!(ShapeKind::T.is_rotatable());
    /// ```
    #[must_use]
    pub const fn is_rotatable(self) -> bool {
        !matches!(self, ShapeKind::O)
    }

    /// Returns the canonical template matrix of this kind.
    #[must_use]
    pub fn template(self) -> Shape {
        Shape::from_rows(self, TEMPLATES[self as usize])
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            ShapeKind::O => 'O',
            ShapeKind::T => 'T',
            ShapeKind::I => 'I',
            ShapeKind::L => 'L',
            ShapeKind::J => 'J',
            ShapeKind::S => 'S',
            ShapeKind::Z => 'Z',
        }
    }
}

const TEMPLATES: [&[&[u8]]; ShapeKind::LEN] = [
    // O
    &[&[1, 1], &[1, 1]],
    // T
    &[&[1, 1, 1], &[0, 1, 0]],
    // I
    &[&[1], &[1], &[1], &[1]],
    // L
    &[&[1, 1], &[1, 0], &[1, 0]],
    // J
    &[&[1, 0], &[1, 0], &[1, 1]],
    // S
    &[&[0, 1], &[1, 1], &[1, 0]],
    // Z
    &[&[1, 0], &[1, 1], &[0, 1]],
];

/// Binary occupancy matrix of a piece.
///
/// A shape is at most 4×4. Cells outside `rows × cols` are always empty, so two
/// shapes with the same visible cells compare equal.
///
/// # Example
///
/// ```
/// use blockfall_engine::ShapeKind;
///
/// let t = ShapeKind::T.template();
/// assert_eq!((t.rows(), t.cols()), (2, 3));
/// assert_eq!(t.to_string(), "###\n.#.");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    kind: ShapeKind,
    rows: u8,
    cols: u8,
    cells: [[bool; Shape::MAX_SIDE]; Shape::MAX_SIDE],
}

impl Shape {
    /// Upper bound of both dimensions.
    pub const MAX_SIDE: usize = 4;

    /// Builds a shape from rows of `0`/`1` values.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is larger than 4×4 or its rows differ in length.
    #[must_use]
    pub fn from_rows(kind: ShapeKind, rows: &[&[u8]]) -> Self {
        let cols = rows.first().map_or(0, |row| row.len());
        assert!(rows.len() <= Self::MAX_SIDE, "too many rows: {}", rows.len());
        assert!(cols <= Self::MAX_SIDE, "too many columns: {cols}");
        let mut cells = [[false; Self::MAX_SIDE]; Self::MAX_SIDE];
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), cols, "ragged row {r}");
            for (c, &value) in row.iter().enumerate() {
                cells[r][c] = value != 0;
            }
        }
        Self::with_cells(kind, rows.len(), cols, cells)
    }

    #[expect(clippy::cast_possible_truncation)]
    const fn with_cells(
        kind: ShapeKind,
        rows: usize,
        cols: usize,
        cells: [[bool; Self::MAX_SIDE]; Self::MAX_SIDE],
    ) -> Self {
        Self {
            kind,
            rows: rows as u8,
            cols: cols as u8,
            cells,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows as usize
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Returns whether the cell at (`row`, `col`) is occupied. Out-of-range cells are empty.
    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols() && self.cells[row][col]
    }

    /// Returns `true` when no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells().next().is_none()
    }

    /// Iterates over occupied cells as `(row, col)` offsets, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows()).flat_map(move |r| {
            (0..self.cols()).filter_map(move |c| self.cells[r][c].then_some((r, c)))
        })
    }

    /// Returns the matrix turned 90° counter-clockwise.
    ///
    /// A `rows × cols` shape becomes `cols × rows`; the last column becomes the first row.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let (rows, cols) = (self.rows(), self.cols());
        let mut cells = [[false; Self::MAX_SIDE]; Self::MAX_SIDE];
        for (r, row) in cells.iter_mut().enumerate().take(cols) {
            for (c, cell) in row.iter_mut().enumerate().take(rows) {
                *cell = self.cells[c][cols - 1 - r];
            }
        }
        Self::with_cells(self.kind, cols, rows, cells)
    }

    /// Returns the matrix mirrored top-to-bottom.
    #[must_use]
    pub fn flipped_vertically(&self) -> Self {
        let rows = self.rows();
        let mut cells = [[false; Self::MAX_SIDE]; Self::MAX_SIDE];
        for (r, row) in cells.iter_mut().enumerate().take(rows) {
            *row = self.cells[rows - 1 - r];
        }
        Self::with_cells(self.kind, rows, self.cols(), cells)
    }

    /// Returns the matrix with row `row` deleted. Rows below it move up by one.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    #[must_use]
    pub fn without_row(&self, row: usize) -> Self {
        assert!(row < self.rows(), "row {row} out of range");
        let mut cells = [[false; Self::MAX_SIDE]; Self::MAX_SIDE];
        for (dst, src) in (0..self.rows()).filter(|&r| r != row).enumerate() {
            cells[dst] = self.cells[src];
        }
        Self::with_cells(self.kind, self.rows() - 1, self.cols(), cells)
    }

    /// Strips fully empty leading and trailing columns.
    ///
    /// Returns the trimmed shape and the number of leading columns removed, which is
    /// how far the owner has to shift right to keep its cells in place. An empty
    /// shape is returned unchanged.
    #[must_use]
    pub fn trimmed_columns(&self) -> (Self, usize) {
        let column_used = |c: usize| (0..self.rows()).any(|r| self.cells[r][c]);
        let Some(first) = (0..self.cols()).find(|&c| column_used(c)) else {
            return (*self, 0);
        };
        let last = (0..self.cols()).rev().find(|&c| column_used(c)).unwrap_or(first);

        let mut cells = [[false; Self::MAX_SIDE]; Self::MAX_SIDE];
        for (r, row) in cells.iter_mut().enumerate().take(self.rows()) {
            for c in first..=last {
                row[c - first] = self.cells[r][c];
            }
        }
        (
            Self::with_cells(self.kind, self.rows(), last - first + 1, cells),
            first,
        )
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows() {
            if r > 0 {
                f.write_str("\n")?;
            }
            for c in 0..self.cols() {
                f.write_str(if self.cells[r][c] { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}

/// Picks a template uniformly, then rotates it once with probability 1/2 and flips
/// it vertically with probability 1/2.
///
/// Only these four orientations are produced per kind; for asymmetric kinds some
/// rotations are never dealt from the catalog and can only be reached by rotating
/// the piece in play.
pub fn random_shape<R: Rng + ?Sized>(rng: &mut R) -> Shape {
    let kind: ShapeKind = rng.random();
    let mut shape = kind.template();
    if rng.random_bool(0.5) {
        shape = shape.rotated();
    }
    if rng.random_bool(0.5) {
        shape = shape.flipped_vertically();
    }
    shape
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn shape(kind: ShapeKind, text: &str) -> Shape {
        let rows = text
            .split('/')
            .map(|row| row.bytes().map(|b| u8::from(b == b'#')).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let rows = rows.iter().map(Vec::as_slice).collect::<Vec<_>>();
        Shape::from_rows(kind, &rows)
    }

    #[test]
    fn test_templates_have_four_cells() {
        for kind in ShapeKind::ALL {
            let template = kind.template();
            assert_eq!(template.cells().count(), 4, "{kind:?}");
            assert_eq!(template.kind(), kind);
        }
    }

    #[test]
    fn test_rotated_is_counter_clockwise() {
        let t = ShapeKind::T.template();
        assert_eq!(t.rotated(), shape(ShapeKind::T, "#./##/#."));

        let i = ShapeKind::I.template();
        assert_eq!(i.rotated(), shape(ShapeKind::I, "####"));

        let l = ShapeKind::L.template();
        assert_eq!(l.rotated(), shape(ShapeKind::L, "#../###"));
    }

    #[test]
    fn test_four_rotations_restore_shape() {
        for kind in ShapeKind::ALL {
            let template = kind.template();
            let turned = template.rotated().rotated().rotated().rotated();
            assert_eq!(turned, template, "{kind:?}");
        }
    }

    #[test]
    fn test_flipped_vertically() {
        let l = ShapeKind::L.template();
        assert_eq!(l.flipped_vertically(), shape(ShapeKind::L, "#./#./##"));
        assert_eq!(l.flipped_vertically().flipped_vertically(), l);
    }

    #[test]
    fn test_without_row() {
        let t = ShapeKind::T.template();
        assert_eq!(t.without_row(0), shape(ShapeKind::T, ".#."));
        assert_eq!(t.without_row(1), shape(ShapeKind::T, "###"));

        let i = ShapeKind::I.template();
        let shed = i.without_row(2);
        assert_eq!((shed.rows(), shed.cols()), (3, 1));
        assert_eq!(shed.cells().count(), 3);
    }

    #[test]
    fn test_trimmed_columns_counts_leading_only() {
        let (trimmed, leading) = shape(ShapeKind::T, ".#.").trimmed_columns();
        assert_eq!(trimmed, shape(ShapeKind::T, "#"));
        assert_eq!(leading, 1);

        let (trimmed, leading) = shape(ShapeKind::L, "#./#.").trimmed_columns();
        assert_eq!(trimmed, shape(ShapeKind::L, "#/#"));
        assert_eq!(leading, 0);

        let (trimmed, leading) = shape(ShapeKind::O, "##").trimmed_columns();
        assert_eq!(trimmed, shape(ShapeKind::O, "##"));
        assert_eq!(leading, 0);
    }

    #[test]
    fn test_empty_shape() {
        let single = shape(ShapeKind::I, "#");
        let empty = single.without_row(0);
        assert!(empty.is_empty());
        assert_eq!(empty.trimmed_columns(), (empty, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(ShapeKind::S.template().to_string(), ".#\n##\n#.");
    }

    #[test]
    fn test_random_shape_reaches_only_catalog_orientations() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            let shape = random_shape(&mut rng);
            let template = shape.kind().template();
            let allowed = [
                template,
                template.rotated(),
                template.flipped_vertically(),
                template.rotated().flipped_vertically(),
            ];
            assert!(allowed.contains(&shape), "unexpected orientation:\n{shape}");
            seen.insert(shape);
        }
        let kinds = seen.iter().map(Shape::kind).collect::<HashSet<_>>();
        assert_eq!(kinds.len(), ShapeKind::LEN);
    }

    #[test]
    fn test_random_shape_never_deals_t_pointing_left() {
        let t_left = shape(ShapeKind::T, ".#/##/.#");
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..2000 {
            assert_ne!(random_shape(&mut rng), t_left);
        }
    }
}
