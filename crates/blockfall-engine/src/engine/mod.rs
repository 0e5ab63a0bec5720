//! Session logic on top of the core data structures.
//!
//! - [`Engine`] - One game session: pieces, counters, the drop loop and its
//!   [`Phase`] state machine
//! - [`GameStats`] - Score, lines, level and the speed curve
//! - [`PieceSource`] - Seeded uniform piece generation
//! - [`GameView`] - Renderer-agnostic snapshot handed to a [`RenderSink`]
//! - [`TickScheduler`] / [`VirtualTimer`] - One-shot timer seam and a
//!   deterministic implementation of it
//! - [`Intent`] - Player requests
//!
//! # Control flow
//!
//! 1. [`Engine::start`] draws two pieces and schedules the first tick
//! 2. Each [`Engine::tick`] moves the current piece one row down, or locks
//!    it, clears full rows, and spawns the next piece
//! 3. Intents move, rotate or drop the current piece in between ticks
//! 4. The session ends when a piece cannot enter the board
//!
//! The engine never keeps a reference to its collaborators. Every call that
//! may render or (re)schedule takes a [`Host`], which is any type
//! implementing both [`TickScheduler`] and [`RenderSink`].

pub use self::{game_engine::*, game_stats::*, intent::*, piece_source::*, timer::*, view::*};

mod game_engine;
mod game_stats;
mod intent;
mod piece_source;
mod timer;
mod view;
