use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    InvalidEngineConfig,
    core::{Board, Shape},
};

use super::{
    GameStats, GameView, Intent, PieceSeed, PieceSource, RenderSink, TickHandle, TickScheduler,
};

/// Lifecycle of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum Phase {
    /// No session started yet.
    Idle,
    /// Drop loop active with exactly one tick pending.
    Running,
    /// Drop loop suspended, board untouched.
    Paused,
    /// A freshly spawned piece collided. Only a new start leaves this phase.
    GameOver,
}

/// Board dimensions and the level 0 drop interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub height: usize,
    pub width: usize,
    pub base_interval: Duration,
}

impl EngineConfig {
    pub const DEFAULT_BASE_INTERVAL: Duration = Duration::from_millis(500);
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            height: Board::DEFAULT_HEIGHT,
            width: Board::DEFAULT_WIDTH,
            base_interval: Self::DEFAULT_BASE_INTERVAL,
        }
    }
}

/// Everything the engine needs from its surroundings during one call.
pub trait Host: TickScheduler + RenderSink {}

impl<T> Host for T where T: TickScheduler + RenderSink + ?Sized {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    const fn dx(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// A single game session: board, pieces, counters and the drop loop.
///
/// The engine owns all mutable game state. Its collaborators (a
/// [`TickScheduler`] and a [`RenderSink`]) are passed in on every call that
/// may need them, so nothing outside holds on to the engine between calls.
///
/// Every operation other than [`Engine::start`] and [`Engine::toggle_start`]
/// is ignored unless the session is [`Phase::Running`].
///
/// # Example
///
/// ```
/// use blockfall_engine::{
///     Engine, EngineConfig, GameView, Phase, PieceSeed, RenderSink, TickHandle, TickScheduler,
///     VirtualTimer,
/// };
///
/// struct Headless(VirtualTimer);
///
/// impl TickScheduler for Headless {
///     fn schedule_once(&mut self, delay: std::time::Duration) -> TickHandle {
///         self.0.schedule_once(delay)
///     }
///     fn cancel(&mut self, handle: TickHandle) {
///         self.0.cancel(handle);
///     }
/// }
///
/// impl RenderSink for Headless {
///     fn render(&mut self, _view: &GameView) {}
/// }
///
/// let seed = PieceSeed::from_bytes([7; 16]);
/// let mut engine = Engine::with_seed(EngineConfig::default(), seed).unwrap();
/// let mut host = Headless(VirtualTimer::new());
///
/// engine.start(&mut host);
/// while let Some(handle) = host.0.advance() {
///     engine.tick(&mut host, handle);
/// }
/// assert_eq!(engine.phase(), Phase::GameOver);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    board: Board,
    current: Option<Shape>,
    next: Option<Shape>,
    stats: GameStats,
    phase: Phase,
    pending_tick: Option<TickHandle>,
    pieces: PieceSource,
}

impl Engine {
    /// Creates an idle engine with a randomly seeded piece source.
    pub fn new(config: EngineConfig) -> Result<Self, InvalidEngineConfig> {
        Self::with_pieces(config, PieceSource::new())
    }

    /// Like [`Self::new`], but with a reproducible piece sequence.
    pub fn with_seed(config: EngineConfig, seed: PieceSeed) -> Result<Self, InvalidEngineConfig> {
        Self::with_pieces(config, PieceSource::with_seed(seed))
    }

    fn with_pieces(config: EngineConfig, pieces: PieceSource) -> Result<Self, InvalidEngineConfig> {
        if config.base_interval.is_zero() {
            return Err(InvalidEngineConfig::ZeroInterval);
        }
        let board =
            Board::new(config.height, config.width).map_err(InvalidEngineConfig::BoardSize)?;
        Ok(Self {
            config,
            board,
            current: None,
            next: None,
            stats: GameStats::new(),
            phase: Phase::Idle,
            pending_tick: None,
            pieces,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The falling piece, absent before the first start.
    #[must_use]
    pub fn current(&self) -> Option<&Shape> {
        self.current.as_ref()
    }

    /// The look-ahead piece.
    #[must_use]
    pub fn next(&self) -> Option<&Shape> {
        self.next.as_ref()
    }

    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.pieces.seed()
    }

    /// The tick the drop loop is waiting for, if any.
    #[must_use]
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending_tick
    }

    /// Delay before the next gravity step at the current level.
    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        self.stats.drop_interval(self.config.base_interval)
    }

    #[must_use]
    pub fn view(&self) -> GameView {
        GameView::capture(self)
    }

    /// Begins a new session, discarding any previous one.
    ///
    /// Counters reset, the board is emptied and two pieces are drawn. The
    /// first tick is scheduled at the base interval.
    pub fn start(&mut self, host: &mut impl Host) {
        self.cancel_tick(host);
        self.board = self.board.cleared();
        self.stats = GameStats::new();
        self.current = None;
        self.next = Some(self.pieces.draw());
        info!(seed = %self.pieces.seed(), "session started");

        if self.push_next() {
            self.phase = Phase::Running;
            self.render(host);
            self.schedule_tick(host);
        } else {
            self.game_over(host);
        }
    }

    /// Runs one gravity step if `handle` is the tick the engine is waiting for.
    ///
    /// Any other handle, such as one cancelled by a pause or one issued
    /// before a restart, is ignored.
    pub fn tick(&mut self, host: &mut impl Host, handle: TickHandle) {
        if self.pending_tick != Some(handle) || !self.phase.is_running() {
            debug!(handle = handle.id(), "ignoring stale tick");
            return;
        }
        self.pending_tick = None;
        self.step(host);
    }

    /// Suspends the drop loop. Only valid while running.
    pub fn pause(&mut self, host: &mut impl Host) {
        if !self.phase.is_running() {
            return;
        }
        self.cancel_tick(host);
        self.phase = Phase::Paused;
        info!(score = self.stats.score(), "paused");
        self.render(host);
    }

    /// Restarts the drop loop after [`Self::pause`].
    pub fn resume(&mut self, host: &mut impl Host) {
        if !self.phase.is_paused() {
            return;
        }
        self.phase = Phase::Running;
        info!("resumed");
        self.render(host);
        self.schedule_tick(host);
    }

    /// Starts, pauses or resumes depending on the current phase.
    pub fn toggle_start(&mut self, host: &mut impl Host) {
        match self.phase {
            Phase::Idle | Phase::GameOver => self.start(host),
            Phase::Running => self.pause(host),
            Phase::Paused => self.resume(host),
        }
    }

    /// Shifts the current piece one column. Returns whether it moved.
    pub fn move_horizontal(&mut self, host: &mut impl Host, direction: Direction) -> bool {
        self.try_commit(host, |shape| shape.moved(direction.dx(), 0))
    }

    /// Rotates the current piece clockwise in place. Returns whether it rotated.
    ///
    /// The square piece never rotates.
    pub fn rotate(&mut self, host: &mut impl Host) -> bool {
        if self.current.is_some_and(|shape| !shape.kind().is_rotatable()) {
            return false;
        }
        self.try_commit(host, |shape| shape.rotated_clockwise())
    }

    /// Moves the current piece one row down without locking it.
    pub fn soft_drop(&mut self, host: &mut impl Host) -> bool {
        self.try_commit(host, |shape| shape.moved(0, 1))
    }

    /// Moves the current piece to the lowest position it can reach.
    ///
    /// The piece is not locked here; the next tick finds it resting and
    /// locks it then.
    pub fn hard_drop(&mut self, host: &mut impl Host) -> bool {
        let Some(shape) = self.current else {
            return false;
        };
        let distance = self.board.drop_distance(&shape);
        self.try_commit(host, |shape| shape.moved(0, distance))
    }

    /// Dispatches a player intent.
    pub fn apply_intent(&mut self, host: &mut impl Host, intent: Intent) {
        if intent.needs_running() && !self.phase.is_running() {
            debug!(?intent, phase = ?self.phase, "ignoring intent");
            return;
        }
        match intent {
            Intent::MoveLeft => {
                self.move_horizontal(host, Direction::Left);
            }
            Intent::MoveRight => {
                self.move_horizontal(host, Direction::Right);
            }
            Intent::RotateCw => {
                self.rotate(host);
            }
            Intent::SoftDrop => {
                self.soft_drop(host);
            }
            Intent::HardDrop => {
                self.hard_drop(host);
            }
            Intent::ToggleStart => self.toggle_start(host),
        }
    }

    /// Moves the current piece down, locking and respawning as long as it
    /// cannot move, until it either moves or the game ends.
    fn step(&mut self, host: &mut impl Host) {
        while let Some(shape) = self.current {
            let below = shape.moved(0, 1);
            if self.board.validate(&below) {
                self.current = Some(below);
                self.render(host);
                self.schedule_tick(host);
                return;
            }

            let placed = self.board.lock(&shape);
            let cleared = self.board.clear_full_rows();
            self.stats.record_lock(cleared);
            debug!(
                kind = %shape.kind().as_char(),
                x = shape.position().x,
                y = shape.position().y,
                placed,
                cleared,
                "locked piece"
            );

            if !self.push_next() {
                self.game_over(host);
                return;
            }
        }
    }

    /// Promotes the look-ahead piece to current at its spawn position and
    /// draws a new look-ahead piece. Returns whether the spawn position is free.
    fn push_next(&mut self) -> bool {
        let next = self.next.replace(self.pieces.draw());
        let Some(next) = next else {
            return false;
        };
        let spawned = next.at(next.spawn_position(self.board.width()));
        self.current = Some(spawned);
        debug!(kind = %spawned.kind().as_char(), "spawned piece");
        self.board.validate(&spawned)
    }

    fn game_over(&mut self, host: &mut impl Host) {
        self.cancel_tick(host);
        self.phase = Phase::GameOver;
        info!(
            score = self.stats.score(),
            lines = self.stats.lines(),
            level = self.stats.level(),
            "game over"
        );
        self.render(host);
    }

    fn try_commit(&mut self, host: &mut impl Host, f: impl FnOnce(Shape) -> Shape) -> bool {
        if !self.phase.is_running() {
            return false;
        }
        let Some(shape) = self.current else {
            return false;
        };
        let candidate = f(shape);
        if candidate == shape || !self.board.validate(&candidate) {
            return false;
        }
        self.current = Some(candidate);
        self.render(host);
        true
    }

    fn schedule_tick(&mut self, host: &mut impl Host) {
        self.cancel_tick(host);
        self.pending_tick = Some(host.schedule_once(self.drop_interval()));
    }

    fn cancel_tick(&mut self, host: &mut impl Host) {
        if let Some(handle) = self.pending_tick.take() {
            host.cancel(handle);
        }
    }

    fn render(&self, host: &mut impl Host) {
        host.render(&self.view());
    }
}

#[cfg(test)]
impl Engine {
    pub(crate) fn force_pieces(&mut self, current: Shape, next: Shape) {
        self.current = Some(current);
        self.next = Some(next);
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}
