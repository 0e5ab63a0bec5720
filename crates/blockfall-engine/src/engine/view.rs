use serde::{Deserialize, Serialize};

use crate::{
    core::{Cell, PieceKind},
    engine::game_engine::{Engine, Phase},
};

/// Receives a fresh [`GameView`] after every state-changing engine operation.
///
/// The sink only gets a shared reference to a snapshot; it cannot reach
/// back into the engine while it is being called.
pub trait RenderSink {
    fn render(&mut self, view: &GameView);
}

/// Renderer-agnostic snapshot of a session.
///
/// Everything a front end needs to draw one frame: the grid with the current
/// piece drawn in, the counters, the look-ahead piece and the label for the
/// start/pause control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Grid rows top to bottom, each cell `0` (empty) or a color index.
    pub rows: Vec<Vec<Cell>>,
    pub score: usize,
    pub lines: usize,
    pub level: usize,
    /// Pieces locked so far.
    pub pieces: usize,
    pub phase: Phase,
    /// What the start/pause control does when activated.
    pub action: ToggleAction,
    /// The piece that spawns after the current one.
    pub next: Option<NextPreview>,
}

impl GameView {
    /// Takes a snapshot of `engine`.
    #[must_use]
    pub fn capture(engine: &Engine) -> Self {
        let board = engine.board();
        let rows = match engine.current() {
            Some(shape) => board.place_preview(shape),
            None => board.rows().map(<[Cell]>::to_vec).collect(),
        };
        let stats = engine.stats();
        Self {
            rows,
            score: stats.score(),
            lines: stats.lines(),
            level: stats.level(),
            pieces: stats.completed_pieces(),
            phase: engine.phase(),
            action: ToggleAction::for_phase(engine.phase()),
            next: engine.next().map(|shape| NextPreview {
                kind: shape.kind(),
                tiles: shape.tiles().rows().map(<[Cell]>::to_vec).collect(),
            }),
        }
    }
}

/// Look-ahead piece in its spawn orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextPreview {
    pub kind: PieceKind,
    /// Square tile matrix, `0` for empty tiles.
    pub tiles: Vec<Vec<Cell>>,
}

/// Action performed by the start/pause control in the current phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
pub enum ToggleAction {
    Start,
    Pause,
    Continue,
}

impl ToggleAction {
    #[must_use]
    pub const fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Idle | Phase::GameOver => ToggleAction::Start,
            Phase::Running => ToggleAction::Pause,
            Phase::Paused => ToggleAction::Continue,
        }
    }
}
