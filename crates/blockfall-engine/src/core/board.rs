use crate::InvalidBoardSize;

use super::shape::{Position, Shape};

/// Value of a single grid cell: [`EMPTY`] or a piece color index (`1..=7`).
pub type Cell = u8;

/// Cell value for an unoccupied cell.
pub const EMPTY: Cell = 0;

/// Fixed-size grid of locked cells.
///
/// Rows are stored top to bottom; row `0` is the top of the visible area.
/// Every row has exactly `width` cells and the dimensions never change after
/// creation. Only [`Board::lock`] and [`Board::clear_full_rows`] mutate the
/// committed cells.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, PieceKind, Position, Shape};
///
/// let board = Board::new(20, 10).unwrap();
/// let shape = Shape::from_preset(PieceKind::O).at(Position::new(4, 18));
///
/// assert!(board.validate(&shape));
/// assert!(!board.validate_at(&shape, Position::new(4, 19)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    rows: Vec<Vec<Cell>>,
}

impl Board {
    pub const DEFAULT_HEIGHT: usize = 20;
    pub const DEFAULT_WIDTH: usize = 10;

    /// Creates an empty board.
    ///
    /// Zero dimensions are rejected.
    pub fn new(height: usize, width: usize) -> Result<Self, InvalidBoardSize> {
        if height == 0 || width == 0 {
            return Err(InvalidBoardSize { height, width });
        }
        Ok(Self {
            width,
            rows: vec![vec![EMPTY; width]; height],
        })
    }

    /// Returns an empty board with the same dimensions.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self {
            width: self.width,
            rows: vec![vec![EMPTY; self.width]; self.height()],
        }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Iterates over the committed rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Returns the committed cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        let (x, y) = self.grid_index(x, y)?;
        Some(self.rows[y][x])
    }

    /// Writes a single committed cell. Coordinates outside the grid are ignored.
    #[cfg(test)]
    pub(crate) fn fill_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some((x, y)) = self.grid_index(x, y) {
            self.rows[y][x] = cell;
        }
    }

    /// Returns a copy of the grid with `shape` drawn over the committed cells.
    ///
    /// Tiles that fall outside the grid are dropped. The board itself is not
    /// modified, so this serves both rendering and locking.
    #[must_use]
    pub fn place_preview(&self, shape: &Shape) -> Vec<Vec<Cell>> {
        let mut grid = self.rows.clone();
        for (x, y, cell) in shape.occupied_cells() {
            if let Some((x, y)) = self.grid_index(x, y) {
                grid[y][x] = cell;
            }
        }
        grid
    }

    /// Checks `shape` at its own position. See [`Self::validate_at`].
    #[must_use]
    pub fn validate(&self, shape: &Shape) -> bool {
        self.validate_at(shape, shape.position())
    }

    /// Checks whether `shape` would fit at `position`.
    ///
    /// An occupied tile fails the check when it lies left of, right of, or
    /// below the grid, or on a locked cell. Tiles above the top row are
    /// allowed so pieces can spawn partly hidden.
    #[must_use]
    pub fn validate_at(&self, shape: &Shape, position: Position) -> bool {
        let (height, width) = (self.height(), self.width);
        shape.occupied_cells_at(position).all(|(x, y, _)| {
            let Ok(x) = usize::try_from(x) else {
                return false;
            };
            if x >= width {
                return false;
            }
            let Ok(y) = usize::try_from(y) else {
                return true;
            };
            y < height && self.rows[y][x] == EMPTY
        })
    }

    /// Number of rows `shape` can fall from its position before colliding.
    #[must_use]
    pub fn drop_distance(&self, shape: &Shape) -> i32 {
        let mut distance = 0;
        while self.validate_at(shape, shape.position().offset(0, distance + 1)) {
            distance += 1;
        }
        distance
    }

    /// Commits `shape` into the grid.
    ///
    /// Tiles above the top row are dropped.
    ///
    /// # Returns
    ///
    /// The number of tiles written into the grid.
    pub fn lock(&mut self, shape: &Shape) -> usize {
        self.rows = self.place_preview(shape);
        shape
            .occupied_cells()
            .filter(|&(x, y, _)| self.grid_index(x, y).is_some())
            .count()
    }

    /// Removes every full row, shifting the rows above it down.
    ///
    /// The same number of empty rows appear at the top. Any number of full
    /// rows, adjacent or not, is handled in a single pass.
    ///
    /// # Returns
    ///
    /// The number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut count = 0;
        for y in (0..self.height()).rev() {
            if self.rows[y].iter().all(|&cell| cell != EMPTY) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows.swap(y, y + count);
            }
        }
        for row in &mut self.rows[..count] {
            row.fill(EMPTY);
        }
        count
    }

    fn grid_index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height())?;
        Some((x, y))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            rows: vec![vec![EMPTY; Self::DEFAULT_WIDTH]; Self::DEFAULT_HEIGHT],
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::PieceKind;

    use super::*;

    fn fill_row(board: &mut Board, y: i32, value: Cell) {
        for x in 0..board.width() {
            board.fill_cell(i32::try_from(x).unwrap(), y, value);
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(20, 10).unwrap();
        assert_eq!(board.height(), 20);
        assert_eq!(board.width(), 10);
        assert!(board.rows().all(|row| row.len() == 10));
        assert!(board.rows().flatten().all(|&c| c == EMPTY));
        assert_eq!(board, Board::default());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            Board::new(0, 10),
            Err(InvalidBoardSize {
                height: 0,
                width: 10
            })
        );
        assert!(Board::new(20, 0).is_err());
    }

    #[test]
    fn test_validate_horizontal_bounds() {
        let board = Board::default();
        let o = Shape::from_preset(PieceKind::O);
        assert!(board.validate_at(&o, Position::new(0, 5)));
        assert!(board.validate_at(&o, Position::new(8, 5)));
        assert!(!board.validate_at(&o, Position::new(-1, 5)));
        assert!(!board.validate_at(&o, Position::new(9, 5)));
        // Above the ceiling is no excuse for crossing a wall.
        assert!(!board.validate_at(&o, Position::new(-1, -3)));
        assert!(!board.validate_at(&o, Position::new(9, -3)));
    }

    #[test]
    fn test_validate_floor() {
        let board = Board::default();
        let o = Shape::from_preset(PieceKind::O);
        assert!(board.validate_at(&o, Position::new(4, 18)));
        assert!(!board.validate_at(&o, Position::new(4, 19)));
    }

    #[test]
    fn test_validate_allows_tiles_above_ceiling() {
        let board = Board::default();
        let i = Shape::from_preset(PieceKind::I);
        // All four tiles on row -1.
        assert!(board.validate_at(&i, Position::new(3, -2)));
        // Entirely above the board.
        assert!(board.validate_at(&i, Position::new(3, -10)));
    }

    #[test]
    fn test_validate_empty_tiles_may_overhang() {
        let board = Board::default();
        // The I bar's occupied row is row 1; its empty rows may leave the grid.
        let i = Shape::from_preset(PieceKind::I);
        assert!(board.validate_at(&i, Position::new(0, 18)));
        assert!(!board.validate_at(&i, Position::new(0, 19)));
        // The vertical bar sits in column 1 of its matrix; column 0 may hang off the left edge.
        let vertical = i.rotated_clockwise();
        let column = vertical.tiles().occupied().next().unwrap().0;
        let x = -i32::try_from(column).unwrap();
        assert!(board.validate_at(&vertical, Position::new(x, 5)));
        assert!(!board.validate_at(&vertical, Position::new(x - 1, 5)));
    }

    #[test]
    fn test_validate_against_locked_cells() {
        let mut board = Board::default();
        board.fill_cell(5, 19, PieceKind::T.color());
        let o = Shape::from_preset(PieceKind::O);
        assert!(!board.validate_at(&o, Position::new(4, 18)));
        assert!(!board.validate_at(&o, Position::new(5, 18)));
        assert!(board.validate_at(&o, Position::new(6, 18)));
        assert!(board.validate_at(&o, Position::new(4, 17)));
    }

    #[test]
    fn test_place_preview_does_not_mutate() {
        let board = Board::default();
        let t = Shape::from_preset(PieceKind::T).at(Position::new(3, 0));
        let first = board.place_preview(&t);
        let second = board.place_preview(&t);
        assert_eq!(first, second);
        assert!(board.rows().flatten().all(|&c| c == EMPTY));

        let color = PieceKind::T.color();
        assert_eq!(first[0][3..6], [color, color, color]);
        assert_eq!(first[1][4], color);
        assert_eq!(first.iter().flatten().filter(|&&c| c != EMPTY).count(), 4);
    }

    #[test]
    fn test_place_preview_clips_out_of_bounds_tiles() {
        let board = Board::default();
        let o = Shape::from_preset(PieceKind::O).at(Position::new(9, -1));
        let grid = board.place_preview(&o);
        assert_eq!(grid.len(), 20);
        assert!(grid.iter().all(|row| row.len() == 10));
        assert_eq!(grid[0][9], PieceKind::O.color());
        assert_eq!(grid.iter().flatten().filter(|&&c| c != EMPTY).count(), 1);
    }

    #[test]
    fn test_lock_drops_tiles_above_ceiling() {
        let mut board = Board::default();
        let o = Shape::from_preset(PieceKind::O);
        assert_eq!(board.lock(&o.at(Position::new(0, 18))), 4);
        assert_eq!(board.cell(0, 19), Some(PieceKind::O.color()));

        assert_eq!(board.lock(&o.at(Position::new(4, -1))), 2);
        assert_eq!(board.cell(4, 0), Some(PieceKind::O.color()));

        let i = Shape::from_preset(PieceKind::I);
        assert_eq!(board.lock(&i.at(Position::new(3, -2))), 0);
        assert_eq!(board.rows().flatten().filter(|&&c| c != EMPTY).count(), 6);
    }

    #[test]
    fn test_clear_full_rows_bottom_two() {
        let mut board = Board::default();
        fill_row(&mut board, 19, 1);
        fill_row(&mut board, 18, 2);
        board.fill_cell(0, 17, 3);
        board.fill_cell(4, 17, 3);
        let partial: Vec<Cell> = board.rows().nth(17).unwrap().to_vec();

        assert_eq!(board.clear_full_rows(), 2);
        assert_eq!(board.rows().nth(19).unwrap(), partial.as_slice());
        for row in board.rows().take(19) {
            assert!(row.iter().all(|&c| c == EMPTY));
        }
    }

    #[test]
    fn test_clear_full_rows_non_adjacent() {
        let mut board = Board::default();
        fill_row(&mut board, 19, 1);
        board.fill_cell(2, 18, 5);
        fill_row(&mut board, 17, 1);
        board.fill_cell(7, 16, 6);

        assert_eq!(board.clear_full_rows(), 2);
        assert_eq!(board.cell(2, 19), Some(5));
        assert_eq!(board.cell(7, 18), Some(6));
        assert_eq!(board.rows().flatten().filter(|&&c| c != EMPTY).count(), 2);
    }

    #[test]
    fn test_clear_full_rows_none() {
        let mut board = Board::default();
        board.fill_cell(0, 19, 1);
        let before = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_full_rows_all() {
        let mut board = Board::new(4, 3).unwrap();
        for y in 0..4 {
            fill_row(&mut board, y, 7);
        }
        assert_eq!(board.clear_full_rows(), 4);
        assert_eq!(board, Board::new(4, 3).unwrap());
    }

    #[test]
    fn test_drop_distance() {
        let mut board = Board::default();
        let o = Shape::from_preset(PieceKind::O).at(Position::new(4, -1));
        assert_eq!(board.drop_distance(&o), 19);

        board.fill_cell(4, 10, 1);
        assert_eq!(board.drop_distance(&o), 9);
    }

    #[test]
    fn test_cleared_keeps_dimensions() {
        let mut board = Board::new(5, 7).unwrap();
        board.fill_cell(1, 1, 2);
        let empty = board.cleared();
        assert_eq!((empty.height(), empty.width()), (5, 7));
        assert!(empty.rows().flatten().all(|&c| c == EMPTY));
    }
}
