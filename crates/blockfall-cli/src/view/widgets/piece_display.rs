use blockfall_engine::{Cell, NextPreview};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::CellDisplay;

/// Largest tile matrix side; the panel is sized for it.
const MAX_TILES: u16 = 4;

/// Look-ahead piece, trimmed to its occupied rows and columns.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<&'a NextPreview>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: &'a NextPreview) -> Self {
        Self {
            piece: Some(piece),
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
        MAX_TILES * CellDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * CellDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Rows and columns of `tiles` holding at least one occupied tile.
fn occupied_bounds(tiles: &[Vec<Cell>]) -> (Vec<usize>, Vec<usize>) {
    let rows = (0..tiles.len())
        .filter(|&y| tiles[y].iter().any(|&c| c != 0))
        .collect();
    let width = tiles.first().map_or(0, Vec::len);
    let cols = (0..width)
        .filter(|&x| tiles.iter().any(|row| row[x] != 0))
        .collect();
    (rows, cols)
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(piece) = self.piece else {
            return;
        };
        let (rows, cols) = occupied_bounds(&piece.tiles);
        let piece_area = area.centered(
            Constraint::Length(super::cells(cols.len()) * CellDisplay::width()),
            Constraint::Length(super::cells(rows.len()) * CellDisplay::height()),
        );

        let horizontal = Layout::horizontal(
            cols.iter()
                .map(|_| Constraint::Length(CellDisplay::width())),
        )
        .flex(Flex::Center);
        let vertical = Layout::vertical(rows.iter().map(|_| Constraint::Length(CellDisplay::height())));

        for (&y, grid_row) in rows.iter().zip(piece_area.layout_vec(&vertical)) {
            for (&x, grid_cell) in cols.iter().zip(grid_row.layout_vec(&horizontal)) {
                CellDisplay::from_cell(piece.tiles[y][x], false).render(grid_cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_skip_empty_rows_and_columns() {
        let tiles = vec![
            vec![0, 0, 0, 0],
            vec![1, 1, 1, 1],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ];
        assert_eq!(occupied_bounds(&tiles), (vec![1], vec![0, 1, 2, 3]));

        let tiles = vec![vec![0, 6, 6], vec![6, 6, 0], vec![0, 0, 0]];
        assert_eq!(occupied_bounds(&tiles), (vec![0, 1], vec![0, 1, 2]));
    }
}
