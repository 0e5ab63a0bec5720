use std::{collections::HashMap, time::Duration};

use blockfall_engine::{Engine, GameView, Intent, RenderSink, TickHandle, TickScheduler};
use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use ratatui_runtime::{App, RenderMode, Runtime, TimerId};

use crate::view::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay};

const FPS: f64 = 60.0;

#[derive(Debug)]
pub struct PlayApp {
    engine: Engine,
    view: GameView,
    ticks: HashMap<TickHandle, TimerId>,
    is_exiting: bool,
}

/// Bridges engine callbacks to the terminal runtime for one call.
struct PlayHost<'a> {
    runtime: &'a mut Runtime,
    ticks: &'a mut HashMap<TickHandle, TimerId>,
    view: &'a mut GameView,
}

impl TickScheduler for PlayHost<'_> {
    fn schedule_once(&mut self, delay: Duration) -> TickHandle {
        let timer = self.runtime.schedule_once(delay);
        let handle = TickHandle::new(timer.id());
        self.ticks.insert(handle, timer);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(timer) = self.ticks.remove(&handle) {
            self.runtime.cancel(timer);
        }
    }
}

impl RenderSink for PlayHost<'_> {
    fn render(&mut self, view: &GameView) {
        self.view.clone_from(view);
    }
}

impl PlayApp {
    pub fn new(engine: Engine) -> Self {
        let view = engine.view();
        Self {
            engine,
            view,
            ticks: HashMap::new(),
            is_exiting: false,
        }
    }

    fn host<'a>(
        runtime: &'a mut Runtime,
        ticks: &'a mut HashMap<TickHandle, TimerId>,
        view: &'a mut GameView,
    ) -> PlayHost<'a> {
        PlayHost {
            runtime,
            ticks,
            view,
        }
    }

    fn apply(&mut self, runtime: &mut Runtime, intent: Intent) {
        let mut host = Self::host(runtime, &mut self.ticks, &mut self.view);
        self.engine.apply_intent(&mut host, intent);
    }

    fn key_bindings(&self) -> &'static [KeyBinding<'static>] {
        let phase = self.view.phase;
        if phase.is_running() {
            &[
                (&["←", "→"], "Move"),
                (&["↑", "X"], "Rotate"),
                (&["↓"], "Soft Drop"),
                (&["Space"], "Hard Drop"),
                (&["Enter", "P"], "Pause"),
                (&["Q"], "Quit"),
            ]
        } else if phase.is_paused() {
            &[(&["Enter", "P"], "Continue"), (&["Q"], "Quit")]
        } else {
            &[(&["Enter", "P"], "Start"), (&["Q"], "Quit")]
        }
    }
}

/// Maps a key to the intent it triggers.
fn intent_for_key(code: KeyCode) -> Option<Intent> {
    let intent = match code {
        KeyCode::Left => Intent::MoveLeft,
        KeyCode::Right => Intent::MoveRight,
        KeyCode::Up | KeyCode::Char('x') => Intent::RotateCw,
        KeyCode::Down => Intent::SoftDrop,
        KeyCode::Char(' ') => Intent::HardDrop,
        KeyCode::Enter | KeyCode::Char('p') => Intent::ToggleStart,
        _ => return None,
    };
    Some(intent)
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_render_mode(RenderMode::throttled_from_rate(FPS));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: Event) {
        let Some(event) = event.as_key_event() else {
            return;
        };
        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            code => {
                if let Some(intent) = intent_for_key(code) {
                    self.apply(runtime, intent);
                }
            }
        }
    }

    fn on_timer(&mut self, runtime: &mut Runtime, timer: TimerId) {
        let handle = TickHandle::new(timer.id());
        if self.ticks.remove(&handle).is_none() {
            return;
        }
        let mut host = Self::host(runtime, &mut self.ticks, &mut self.view);
        self.engine.tick(&mut host, handle);
    }

    fn draw(&self, frame: &mut Frame) {
        let session_display = SessionDisplay::new(&self.view);
        let help = KeyBindingDisplay::new(self.key_bindings());

        let [main_area, help_area] = Layout::vertical([
            Constraint::Length(session_display.height()),
            Constraint::Length(1),
        ])
        .areas::<2>(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help, help_area);
    }
}
