use arrayvec::ArrayVec;
use blockfall_engine::{Board, Piece};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::widgets::CellDisplay;

/// The playfield with the falling piece and its landing ghost overlaid.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    falling_piece: Option<Piece>,
    ghost_cells: Option<ArrayVec<(i32, i32), 4>>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            falling_piece: None,
            ghost_cells: None,
            block: None,
        }
    }

    pub fn falling_piece(self, piece: Piece) -> Self {
        Self {
            falling_piece: Some(piece),
            ..self
        }
    }

    pub fn ghost_cells(self, cells: ArrayVec<(i32, i32), 4>) -> Self {
        Self {
            ghost_cells: Some(cells),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u16 {
        self.board.width() as u16 * CellDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        self.board.height() as u16 * CellDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Topmost overlay wins: the falling piece covers the ghost, which
    /// covers locked cells.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn cell(&self, x: usize, y: usize) -> CellDisplay {
        let pos = (x as i32, y as i32);
        if let Some(piece) = &self.falling_piece
            && piece.cells().any(|cell| cell == pos)
        {
            return CellDisplay::piece(piece.kind());
        }
        if let Some(ghost) = &self.ghost_cells
            && ghost.contains(&pos)
        {
            return CellDisplay::ghost();
        }
        match self.board.cell_at(pos.0, pos.1) {
            Some(kind) => CellDisplay::piece(kind),
            None => CellDisplay::empty(true),
        }
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.board.width()).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints =
            (0..self.board.height()).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_rows = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (y, grid_row) in grid_rows.enumerate() {
            for (x, grid_cell) in grid_row.into_iter().enumerate() {
                self.cell(x, y).render(grid_cell, buf);
            }
        }
    }
}
