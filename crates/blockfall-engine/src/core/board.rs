use arrayvec::ArrayVec;

use crate::{
    BoardSizeError, PieceCollisionError,
    core::piece::{Piece, PieceKind},
};

/// Canonical playfield width in cells.
pub const STANDARD_WIDTH: usize = 10;
/// Canonical playfield height in cells.
pub const STANDARD_HEIGHT: usize = 20;

/// The playfield grid.
///
/// Each cell is either empty or holds the kind of the piece that locked
/// there. The kind is carried only so the renderer can color locked cells;
/// collision logic never inspects it.
///
/// Rows above the board (negative y) are outside the grid but are valid
/// piece positions, so pieces can spawn and rotate partially above the
/// visible area. Only the bottom and the sides are hard boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    grid: Vec<Vec<Option<PieceKind>>>,
    cleared_lines: u32,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Result<Self, BoardSizeError> {
        if width == 0 || height == 0 {
            return Err(BoardSizeError { width, height });
        }
        Ok(Self {
            width,
            height,
            grid: vec![vec![None; width]; height],
            cleared_lines: 0,
        })
    }

    /// The canonical 10x20 board.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            width: STANDARD_WIDTH,
            height: STANDARD_HEIGHT,
            grid: vec![vec![None; STANDARD_WIDTH]; STANDARD_HEIGHT],
            cleared_lines: 0,
        }
    }

    /// Creates a board from ASCII art for testing.
    ///
    /// `'.'` is an empty cell; any piece letter (`I O T S Z J L`) marks a
    /// cell occupied by that kind, and `'#'` marks a cell occupied by an
    /// unspecified kind. Rows are listed top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if the art is empty, rows have uneven widths, or a character
    /// is not recognized.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        assert!(!lines.is_empty(), "board art must contain at least one row");
        let width = lines[0].len();

        let grid = lines
            .iter()
            .enumerate()
            .map(|(y, line)| {
                assert_eq!(line.len(), width, "row {y} width differs from row 0");
                line.chars()
                    .map(|c| match c {
                        '.' => None,
                        '#' | 'I' => Some(PieceKind::I),
                        'O' => Some(PieceKind::O),
                        'T' => Some(PieceKind::T),
                        'S' => Some(PieceKind::S),
                        'Z' => Some(PieceKind::Z),
                        'J' => Some(PieceKind::J),
                        'L' => Some(PieceKind::L),
                        other => panic!("unrecognized board cell {other:?} at row {y}"),
                    })
                    .collect()
            })
            .collect::<Vec<_>>();

        Self {
            width,
            height: grid.len(),
            grid,
            cleared_lines: 0,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total lines cleared on this board since construction or reset.
    #[must_use]
    pub fn cleared_lines(&self) -> u32 {
        self.cleared_lines
    }

    /// Checks whether every cell of the piece is on an unoccupied, in-bounds
    /// position. Rows above the board count as in bounds; columns outside
    /// `[0, width)` and rows at or below the floor do not.
    #[must_use]
    pub fn is_valid_position(&self, piece: &Piece) -> bool {
        piece.cells().all(|(x, y)| {
            let Ok(col) = usize::try_from(x) else {
                return false;
            };
            if col >= self.width {
                return false;
            }
            match usize::try_from(y) {
                Ok(row) if row >= self.height => false,
                Ok(row) => self.grid[row][col].is_none(),
                // Above the visible board.
                Err(_) => true,
            }
        })
    }

    /// Locks a piece's cells into the grid.
    ///
    /// Validates first and leaves the board untouched on failure. Cells that
    /// sit above the visible board (negative row) are silently dropped.
    pub fn place(&mut self, piece: &Piece) -> Result<(), PieceCollisionError> {
        if !self.is_valid_position(piece) {
            return Err(PieceCollisionError);
        }
        for (x, y) in piece.cells() {
            let (Ok(col), Ok(row)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            self.grid[row][col] = Some(piece.kind());
        }
        Ok(())
    }

    /// Removes every fully occupied row, shifting the rows above it down and
    /// inserting empty rows at the top. Returns the number of rows cleared.
    pub fn clear_completed_lines(&mut self) -> usize {
        let completed: Vec<usize> = (0..self.height)
            .filter(|&row| self.grid[row].iter().all(Option::is_some))
            .collect();

        for &row in completed.iter().rev() {
            self.grid.remove(row);
        }
        for _ in 0..completed.len() {
            self.grid.insert(0, vec![None; self.width]);
        }

        #[expect(clippy::cast_possible_truncation)]
        let count = completed.len() as u32;
        self.cleared_lines += count;
        completed.len()
    }

    /// True when any cell of the topmost row is occupied. Meaningful only
    /// immediately after a lock.
    #[must_use]
    pub fn is_topped_out(&self) -> bool {
        self.grid[0].iter().any(Option::is_some)
    }

    /// Row the piece would come to rest on if dropped straight down.
    #[must_use]
    pub fn drop_position(&self, piece: &Piece) -> i32 {
        let mut resting = *piece;
        while self.is_valid_position(&resting.translated(0, 1)) {
            resting = resting.translated(0, 1);
        }
        resting.y()
    }

    /// Cells of the piece's landing outline, for ghost rendering.
    #[must_use]
    pub fn shadow_cells(&self, piece: &Piece) -> ArrayVec<(i32, i32), 4> {
        let resting = piece.translated(0, self.drop_position(piece) - piece.y());
        resting.cells().collect()
    }

    /// Bounds-checked read of a cell. Out-of-range coordinates read as empty.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> Option<PieceKind> {
        let (Ok(col), Ok(row)) = (usize::try_from(x), usize::try_from(y)) else {
            return None;
        };
        if col >= self.width || row >= self.height {
            return None;
        }
        self.grid[row][col]
    }

    /// Height of the stack in a column: distance from the floor to the
    /// topmost occupied cell, or 0 for an empty column.
    #[must_use]
    pub fn column_height(&self, col: usize) -> usize {
        (0..self.height)
            .find(|&row| self.grid[row][col].is_some())
            .map_or(0, |row| self.height - row)
    }

    /// Number of empty cells with at least one occupied cell above them in
    /// the same column.
    #[must_use]
    pub fn count_holes(&self) -> usize {
        let mut holes = 0;
        for col in 0..self.width {
            let mut roof_seen = false;
            for row in 0..self.height {
                if self.grid[row][col].is_some() {
                    roof_seen = true;
                } else if roof_seen {
                    holes += 1;
                }
            }
        }
        holes
    }

    /// Empties the grid and resets the cleared-line counter.
    pub fn reset(&mut self) {
        self.grid = vec![vec![None; self.width]; self.height];
        self.cleared_lines = 0;
    }
}
