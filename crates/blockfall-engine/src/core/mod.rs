//! Grid and piece geometry.
//!
//! - [`Board`] - Fixed-size grid of locked cells with preview, validation and row clearing
//! - [`Shape`] - A piece (tile matrix plus position) with clockwise rotation
//! - [`PieceKind`] - The 7 presets

pub use self::{board::*, shape::*};

pub(crate) mod board;
pub(crate) mod shape;
