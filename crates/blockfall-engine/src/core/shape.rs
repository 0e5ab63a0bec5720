use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use crate::UnknownPieceKind;

use super::board::{Cell, EMPTY};

/// Side length of the largest preset (the I bar).
pub const MAX_SHAPE_SIZE: usize = 4;

/// A falling piece: a square tile matrix placed at a grid offset.
///
/// `Shape` is a small `Copy` value. Moving or rotating a copy never affects
/// the original, which is what lets the engine build a candidate, ask the
/// [`Board`](super::board::Board) whether it fits, and only then commit it.
///
/// The position may be negative or past the board edges; whether a placement
/// is legal is decided by the board, not by the shape.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceKind, Position, Shape};
///
/// let shape = Shape::from_preset(PieceKind::T);
/// let candidate = shape.moved(1, 0).rotated_clockwise();
///
/// assert_eq!(shape.position(), Position::new(0, 0));
/// assert_eq!(candidate.position(), Position::new(1, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    kind: PieceKind,
    tiles: Tiles,
    position: Position,
}

impl Shape {
    /// Creates a shape from one of the presets at position `(0, 0)`.
    #[must_use]
    pub const fn from_preset(kind: PieceKind) -> Self {
        Self {
            kind,
            tiles: PRESETS[kind.index()],
            position: Position::new(0, 0),
        }
    }

    /// Creates a shape from a preset chosen uniformly at random.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng,
    {
        Self::from_preset(rng.random())
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn tiles(&self) -> &Tiles {
        &self.tiles
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.tiles.size
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns a copy of this shape placed at `position`.
    #[must_use]
    pub const fn at(self, position: Position) -> Self {
        Self { position, ..self }
    }

    /// Returns a copy of this shape shifted by `(dx, dy)`.
    #[must_use]
    pub const fn moved(self, dx: i32, dy: i32) -> Self {
        self.at(self.position.offset(dx, dy))
    }

    /// Rotates the tile matrix in place.
    ///
    /// The new matrix satisfies `new[size - 1 - x][y] == old[y][x]`.
    /// The position is left untouched.
    pub fn rotate_clockwise(&mut self) {
        self.tiles = self.tiles.rotated_clockwise();
    }

    /// Like [`Self::rotate_clockwise`], but returns the rotated copy.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let mut rotated = *self;
        rotated.rotate_clockwise();
        rotated
    }

    /// Returns the absolute grid coordinates and values of every occupied tile.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.occupied_cells_at(self.position)
    }

    /// Like [`Self::occupied_cells`], but as if the shape were at `position`.
    pub fn occupied_cells_at(
        &self,
        position: Position,
    ) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.tiles.occupied().map(move |(dx, dy, cell)| {
            (
                position.x + offset_from(dx),
                position.y + offset_from(dy),
                cell,
            )
        })
    }

    /// Where a new piece of this shape appears on a board of the given width.
    ///
    /// Pieces are centered horizontally. Every piece starts one row above the
    /// board except the I bar, which starts two rows above to hide its
    /// leading empty row.
    #[must_use]
    pub fn spawn_position(&self, board_width: usize) -> Position {
        let x = board_width.saturating_sub(self.size()) / 2;
        Position::new(offset_from(x), self.kind.spawn_y())
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn offset_from(n: usize) -> i32 {
    n as i32
}

/// Grid offset of a shape's top-left tile.
///
/// `x` grows rightward and `y` grows downward. Either coordinate may be
/// negative while a piece is partly above or left of the board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Square tile matrix of a shape.
///
/// Only the top-left `size × size` corner of the backing array is meaningful.
/// Non-zero entries are occupied and hold the piece's color index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiles {
    size: usize,
    cells: [[Cell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Tiles {
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the tile at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is not less than the matrix size.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        assert!(x < self.size && y < self.size, "tile ({x}, {y}) out of range");
        self.cells[y][x]
    }

    /// Iterates over the rows, each exactly `size` tiles wide.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells[..self.size].iter().map(|row| &row[..self.size])
    }

    /// Iterates over occupied tiles as `(x, y, value)` relative to the top-left corner.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.rows().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &cell)| cell != EMPTY)
                .map(move |(x, &cell)| (x, y, cell))
        })
    }

    #[must_use]
    pub const fn rotated_clockwise(&self) -> Self {
        let size = self.size;
        let mut cells = [[EMPTY; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                cells[size - 1 - x][y] = self.cells[y][x];
                x += 1;
            }
            y += 1;
        }
        Self { size, cells }
    }
}

/// The seven piece variants.
///
/// The order is fixed; a kind's color index on the board is its ordinal plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    /// Straight bar, 4×4 matrix.
    I = 0,
    J = 1,
    L = 2,
    /// Square, 2×2 matrix. Never rotated by the engine.
    O = 3,
    S = 4,
    T = 5,
    Z = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl TryFrom<u8> for PieceKind {
    type Error = UnknownPieceKind;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| UnknownPieceKind(index.to_string()))
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Value written into board cells occupied by this kind (`1..=7`).
    #[must_use]
    pub const fn color(self) -> Cell {
        self as u8 + 1
    }

    /// Inverse of [`Self::color`]. `None` for empty or unknown cells.
    #[must_use]
    pub fn from_color(cell: Cell) -> Option<Self> {
        let index = cell.checked_sub(1)?;
        Self::try_from(index).ok()
    }

    /// Side length of this kind's tile matrix.
    #[must_use]
    pub const fn size(self) -> usize {
        PRESETS[self.index()].size
    }

    /// Whether the engine accepts rotation requests for this kind.
    #[must_use]
    pub const fn is_rotatable(self) -> bool {
        !matches!(self, PieceKind::O)
    }

    const fn spawn_y(self) -> i32 {
        match self {
            PieceKind::I => -2,
            _ => -1,
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('O'), Ok(PieceKind::O));
    /// assert!(PieceKind::from_char('X').is_err());
    /// ```
    pub fn from_char(c: char) -> Result<Self, UnknownPieceKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_char() == c)
            .ok_or_else(|| UnknownPieceKind(c.to_string()))
    }
}

const PRESETS: [Tiles; PieceKind::LEN] = {
    const fn preset(kind: PieceKind, size: usize, pattern: [[bool; 4]; 4]) -> Tiles {
        let mut cells = [[EMPTY; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if pattern[y][x] {
                    cells[y][x] = kind.color();
                }
                x += 1;
            }
            y += 1;
        }
        Tiles { size, cells }
    }

    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];

    [
        preset(PieceKind::I, 4, [EEEE, [C, C, C, C], EEEE, EEEE]),
        preset(PieceKind::J, 3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        preset(PieceKind::L, 3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        preset(PieceKind::O, 2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
        preset(PieceKind::S, 3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        preset(PieceKind::T, 3, [[C, C, C, E], [E, C, E, E], EEEE, EEEE]),
        preset(PieceKind::Z, 3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn tile_rows(shape: &Shape) -> Vec<Vec<Cell>> {
        shape.tiles().rows().map(<[Cell]>::to_vec).collect()
    }

    #[test]
    fn test_preset_sizes() {
        assert_eq!(PieceKind::I.size(), 4);
        assert_eq!(PieceKind::O.size(), 2);
        for kind in [
            PieceKind::J,
            PieceKind::L,
            PieceKind::S,
            PieceKind::T,
            PieceKind::Z,
        ] {
            assert_eq!(kind.size(), 3, "{kind:?}");
        }
    }

    #[test]
    fn test_every_preset_has_four_tiles_colored_by_kind() {
        for kind in PieceKind::ALL {
            let shape = Shape::from_preset(kind);
            let cells: Vec<_> = shape.tiles().occupied().collect();
            assert_eq!(cells.len(), 4, "{kind:?}");
            assert!(cells.iter().all(|&(_, _, c)| c == kind.color()));
        }
    }

    #[test]
    fn test_from_preset_starts_at_origin() {
        let shape = Shape::from_preset(PieceKind::S);
        assert_eq!(shape.position(), Position::new(0, 0));
        assert_eq!(shape.kind(), PieceKind::S);
    }

    #[test]
    fn test_rotation_formula() {
        let l = Shape::from_preset(PieceKind::L);
        let c = PieceKind::L.color();
        // new[size - 1 - x][y] = old[y][x]
        assert_eq!(
            tile_rows(&l.rotated_clockwise()),
            vec![vec![c, c, 0], vec![0, c, 0], vec![0, c, 0]]
        );
    }

    #[test]
    fn test_rotation_has_order_four() {
        for kind in PieceKind::ALL {
            let original = Shape::from_preset(kind);
            let mut shape = original;
            for _ in 0..4 {
                shape.rotate_clockwise();
                assert_eq!(shape.size(), original.size());
            }
            assert_eq!(shape.tiles(), original.tiles(), "{kind:?}");
        }
    }

    #[test]
    fn test_square_rotates_into_itself() {
        let original = Shape::from_preset(PieceKind::O);
        let mut shape = original;
        for _ in 0..7 {
            shape.rotate_clockwise();
            assert_eq!(shape.tiles(), original.tiles());
        }
    }

    #[test]
    fn test_copies_are_independent() {
        let original = Shape::from_preset(PieceKind::T).at(Position::new(3, 5));
        let mut copy = original;
        copy.rotate_clockwise();
        copy = copy.moved(1, 1);

        assert_eq!(original.position(), Position::new(3, 5));
        assert_eq!(original.tiles(), Shape::from_preset(PieceKind::T).tiles());
        assert_eq!(copy.position(), Position::new(4, 6));
    }

    #[test]
    fn test_occupied_cells_are_absolute() {
        let shape = Shape::from_preset(PieceKind::I).at(Position::new(3, -2));
        let cells: Vec<_> = shape.occupied_cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(cells, vec![(3, -1), (4, -1), (5, -1), (6, -1)]);
    }

    #[test]
    fn test_spawn_position() {
        let o = Shape::from_preset(PieceKind::O);
        assert_eq!(o.spawn_position(10), Position::new(4, -1));

        let i = Shape::from_preset(PieceKind::I);
        assert_eq!(i.spawn_position(10), Position::new(3, -2));

        let t = Shape::from_preset(PieceKind::T);
        assert_eq!(t.spawn_position(10), Position::new(3, -1));
        assert_eq!(t.spawn_position(7), Position::new(2, -1));
    }

    #[test]
    fn test_kind_conversions() {
        for (i, kind) in PieceKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(PieceKind::try_from(u8::try_from(i).unwrap()), Ok(kind));
            assert_eq!(PieceKind::from_char(kind.as_char()), Ok(kind));
            assert_eq!(PieceKind::from_color(kind.color()), Some(kind));
        }
        assert_eq!(PieceKind::from_color(0), None);
        assert_eq!(PieceKind::from_color(8), None);
        assert!(PieceKind::try_from(7).is_err());
        assert!(PieceKind::from_char('x').is_err());
    }

    #[test]
    fn test_only_square_is_not_rotatable() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.is_rotatable(), kind != PieceKind::O);
        }
    }

    #[test]
    fn test_random_covers_all_kinds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = [false; PieceKind::LEN];
        for _ in 0..500 {
            seen[Shape::random(&mut rng).kind().index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
