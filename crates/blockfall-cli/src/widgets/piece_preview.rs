use blockfall_engine::{Piece, PieceKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::widgets::CellDisplay;

/// Preview of an upcoming piece in its spawn orientation.
#[derive(Debug)]
pub struct PiecePreview<'a> {
    kind: Option<PieceKind>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PiecePreview<'a> {
    pub fn new() -> Self {
        Self {
            kind: None,
            block: None,
        }
    }

    pub fn kind(self, kind: PieceKind) -> Self {
        Self {
            kind: Some(kind),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        // Every spawn orientation fits in a 4x2 cell box.
        4 * CellDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * CellDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PiecePreview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PiecePreview<'_> {
    #[expect(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(kind) = self.kind else {
            return;
        };

        // Trim the state grid to the occupied bounding box so the shape
        // sits centered regardless of grid size.
        let cells: Vec<(usize, usize)> = Piece::new(kind, 0, 0).relative_cells().collect();
        let min_col = cells.iter().map(|&(col, _)| col).min().unwrap_or(0);
        let min_row = cells.iter().map(|&(_, row)| row).min().unwrap_or(0);
        let cols = cells.iter().map(|&(col, _)| col + 1 - min_col).max().unwrap_or(0) as u16;
        let rows = cells.iter().map(|&(_, row)| row + 1 - min_row).max().unwrap_or(0) as u16;

        let piece_area = area.centered(
            Constraint::Length(cols * CellDisplay::width()),
            Constraint::Length(rows * CellDisplay::height()),
        );

        let col_constraints = (0..cols).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..rows).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (y, grid_row) in grid_rows.enumerate() {
            for (x, grid_cell) in grid_row.into_iter().enumerate() {
                if cells.contains(&(x + min_col, y + min_row)) {
                    CellDisplay::piece(kind).render(grid_cell, buf);
                } else {
                    CellDisplay::empty(false).render(grid_cell, buf);
                }
            }
        }
    }
}

impl Default for PiecePreview<'_> {
    fn default() -> Self {
        Self::new()
    }
}
