pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board dimensions must be positive, got {height}x{width}")]
pub struct InvalidBoardSize {
    pub height: usize,
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown piece kind: {_0}")]
pub struct UnknownPieceKind(#[error(not(source))] pub String);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidEngineConfig {
    #[display("{_0}")]
    BoardSize(InvalidBoardSize),
    #[display("base drop interval must be positive")]
    ZeroInterval,
}
