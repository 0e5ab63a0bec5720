use blockfall_engine::{GameView, Phase};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::view::widgets::{BoardDisplay, PieceDisplay, StatsDisplay, color, style};

/// Board in the middle, stats on the left, next piece on the right, and a
/// banner over the board when the game is not running.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    view: &'a GameView,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(view: &'a GameView) -> Self {
        Self {
            view,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }

    fn board(&self) -> BoardDisplay<'a> {
        BoardDisplay::new(&self.view.rows).block(
            Block::bordered()
                .border_style(border_color(self.view.phase))
                .style(style::DEFAULT),
        )
    }

    pub fn height(&self) -> u16 {
        self.board().height()
    }
}

fn border_color(phase: Phase) -> ratatui::style::Color {
    match phase {
        Phase::Idle => color::GRAY,
        Phase::Running => color::WHITE,
        Phase::Paused => color::YELLOW,
        Phase::GameOver => color::RED,
    }
}

/// Banner text and style for phases that show one.
fn banner(phase: Phase) -> Option<(&'static str, Style)> {
    match phase {
        Phase::Running => None,
        Phase::Idle => Some((
            "PRESS ENTER",
            Style::new().fg(color::BLACK).bg(color::WHITE),
        )),
        Phase::Paused => Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW))),
        Phase::GameOver => Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED))),
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let block_padding = Padding::symmetric(self.horizontal_padding, self.vertical_padding);
        let border_style = border_color(self.view.phase);
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let game_board = self.board();
        let next_panel = {
            let panel = PieceDisplay::new().block(panel("NEXT"));
            match &self.view.next {
                Some(next) => panel.piece(next),
                None => panel,
            }
        };
        let stats = StatsDisplay::new(self.view).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let game_board_width = game_board.width();
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        if let Some((text, style)) = banner(self.view.phase) {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
