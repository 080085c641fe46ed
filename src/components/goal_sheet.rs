use crate::state::app_state::{EntryColumn, LeagueState, ScoreSheet};
use league_api::Side;
use league_api::composer::GoalEntry;
use tui::buffer::Buffer;
use tui::layout::{Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Block, BorderType, Borders, Widget};

const KEY_HINT: &str =
    "+/- score  Tab side  j/k goal  h/l field  [ ] player  0-9 minute  x remove  s save  Esc close";

/// The open goal sheet: score line on top, one column of goal entries per side.
pub struct GoalSheetView<'a> {
    pub sheet: &'a ScoreSheet,
    pub league: &'a LeagueState,
}

impl GoalSheetView<'_> {
    fn player_label(&self, id: Option<&str>, placeholder: &str) -> String {
        match id {
            Some(id) => self.league.player_name(id),
            None => placeholder.to_string(),
        }
    }

    fn entry_cells(&self, entry: &GoalEntry) -> [String; 3] {
        let minute = if entry.minute == 0 { "--'".to_string() } else { format!("{}'", entry.minute) };
        [
            self.player_label(entry.scorer.as_deref(), "<pick scorer>"),
            minute,
            self.player_label(entry.assist.as_deref(), "no assist"),
        ]
    }

    fn render_side(&self, side: Side, area: Rect, buf: &mut Buffer) {
        let composer = &self.sheet.composer;
        let focused = self.sheet.side == side;
        let border = if focused { Color::Yellow } else { Color::DarkGray };
        let team = self.league.team_name(composer.team_id(side));
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(format!(" {}: {} ({}) ", side.label(), team, composer.score(side)));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width < 12 || inner.height == 0 {
            return;
        }

        let entries = composer.entries(side);
        if entries.is_empty() {
            buf.set_string(inner.x, inner.y, "No goals", Style::default().fg(Color::DarkGray));
            return;
        }

        let width = inner.width as usize;
        let minute_width = 5;
        let name_width = width.saturating_sub(minute_width + 5) / 2;
        // Keep the focused row on screen.
        let offset = if focused {
            self.sheet.row.saturating_sub(inner.height.saturating_sub(1) as usize)
        } else {
            0
        };
        for (index, entry) in entries.iter().enumerate().skip(offset) {
            let y = inner.y + (index - offset) as u16;
            if y >= inner.bottom() {
                break;
            }
            let [scorer, minute, assist] = self.entry_cells(entry);
            let on_row = focused && self.sheet.row == index;
            let cell_style = |column: EntryColumn, missing: bool| {
                let mut style = Style::default().fg(if missing { Color::Red } else { Color::White });
                if on_row && self.sheet.column == column {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                style
            };

            let mut x = inner.x;
            buf.set_string(x, y, format!("{:>2}.", index + 1), Style::default().fg(Color::Gray));
            x += 4;
            buf.set_stringn(x, y, &scorer, name_width, cell_style(EntryColumn::Scorer, entry.scorer.is_none()));
            x += name_width as u16 + 1;
            buf.set_stringn(x, y, &minute, minute_width, cell_style(EntryColumn::Minute, false));
            x += minute_width as u16;
            buf.set_stringn(x, y, &assist, name_width, cell_style(EntryColumn::Assist, false));
        }
    }
}

impl Widget for GoalSheetView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 4 {
            return;
        }
        let [score_line, sides, hint] =
            Layout::vertical([Constraint::Length(2), Constraint::Fill(1), Constraint::Length(1)])
                .areas(area);

        let composer = &self.sheet.composer;
        let score = format!(
            "{} {} - {} {}",
            self.league.team_name(composer.team_id(Side::Home)),
            composer.score(Side::Home),
            composer.score(Side::Away),
            self.league.team_name(composer.team_id(Side::Away)),
        );
        buf.set_stringn(
            score_line.x,
            score_line.y,
            score,
            score_line.width as usize,
            Style::default().add_modifier(Modifier::BOLD),
        );

        let [home, away] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(sides);
        self.render_side(Side::Home, home, buf);
        self.render_side(Side::Away, away, buf);

        buf.set_stringn(hint.x, hint.y, KEY_HINT, hint.width as usize, Style::default().fg(Color::DarkGray));
    }
}
