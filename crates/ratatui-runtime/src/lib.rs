//! Minimal terminal application runtime on top of ratatui and crossterm.
//!
//! A [`Runtime`] multiplexes three event sources into calls on an [`App`]:
//! crossterm input, render requests (see [`RenderMode`]) and one-shot timers
//! scheduled with [`Runtime::schedule_once`].

pub use self::{
    app::App,
    event_loop::RenderMode,
    runtime::Runtime,
    timer::{TimerId, TimerQueue},
};

mod app;
mod event;
mod event_loop;
mod runtime;
mod timer;
