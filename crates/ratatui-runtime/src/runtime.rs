use std::{io, time::Duration};

use crate::{
    App, TimerId,
    event::TuiEvent,
    event_loop::{EventLoop, RenderMode},
};

/// TUI application runtime.
///
/// Manages the event loop and executes applications that implement the `App` trait.
#[derive(Default, Debug)]
pub struct Runtime {
    events: EventLoop,
}

impl Runtime {
    /// Creates a new Runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a single `App::on_timer()` call after `delay`.
    pub fn schedule_once(&mut self, delay: Duration) -> TimerId {
        self.events.schedule_once(delay)
    }

    /// Cancels a pending timer. Expired or unknown timers are ignored.
    pub fn cancel(&mut self, timer: TimerId) {
        self.events.cancel(timer);
    }

    /// Number of timers that have neither expired nor been cancelled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.events.pending_timers()
    }

    /// Sets the render mode.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.events.set_render_mode(mode);
    }

    /// Runs the application.
    ///
    /// 1. Calls `app.init()` for initialization
    /// 2. Runs the event loop until `app.should_exit()` returns true
    ///    - timer expiry: calls `app.on_timer()`
    ///    - render: calls `app.draw()`
    ///    - crossterm event: calls `app.handle_event()`
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Timer(timer) => {
                        app.on_timer(&mut self, timer);
                    }
                    TuiEvent::Render => {
                        terminal.draw(|f| app.draw(f))?;
                    }
                    TuiEvent::Crossterm(event) => {
                        app.handle_event(&mut self, event);
                    }
                }
            }
            Ok(())
        })
    }
}
