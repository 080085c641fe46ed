use league_api::Standing;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Width of each numeric column: P W D L GF GA GD Pts.
const STAT_WIDTH: u16 = 5;
const STAT_HEADERS: [&str; 8] = ["P", "W", "D", "L", "GF", "GA", "GD", "Pts"];
const POS_WIDTH: u16 = 4;
const MIN_NAME_WIDTH: u16 = 8;

/// Standings table, one row per team, drawn from the top `scroll` rows down.
pub struct LeagueTable<'a> {
    pub standings: &'a [Standing],
    pub scroll: u16,
}

impl LeagueTable<'_> {
    fn name_width(area: Rect) -> u16 {
        area.width
            .saturating_sub(POS_WIDTH + STAT_WIDTH * STAT_HEADERS.len() as u16)
            .max(MIN_NAME_WIDTH)
    }
}

impl Widget for LeagueTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < POS_WIDTH + MIN_NAME_WIDTH || area.height == 0 {
            return;
        }
        let name_width = Self::name_width(area);
        let header_style = Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD);

        buf.set_string(area.x, area.y, "#", header_style);
        buf.set_stringn(area.x + POS_WIDTH, area.y, "Team", name_width as usize, header_style);
        for (i, label) in STAT_HEADERS.iter().enumerate() {
            let x = area.x + POS_WIDTH + name_width + STAT_WIDTH * i as u16;
            if x >= area.right() {
                break;
            }
            buf.set_string(x, area.y, format!("{label:>4}"), header_style);
        }

        if self.standings.is_empty() {
            if area.height > 2 {
                buf.set_string(
                    area.x,
                    area.y + 2,
                    "No teams registered yet",
                    Style::default().fg(Color::DarkGray),
                );
            }
            return;
        }

        let scroll = self.scroll as usize;
        for (row, standing) in self.standings.iter().enumerate().skip(scroll) {
            let y = area.y + 1 + (row - scroll) as u16;
            if y >= area.bottom() {
                break;
            }
            let style = row_style(standing, row);
            let position = standing
                .position
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            buf.set_string(area.x, y, position, style);
            buf.set_stringn(
                area.x + POS_WIDTH,
                y,
                &standing.team_name,
                name_width.saturating_sub(1) as usize,
                style,
            );

            let goal_difference = format!("{:+}", standing.goal_difference);
            let stats = [
                standing.played.to_string(),
                standing.won.to_string(),
                standing.drawn.to_string(),
                standing.lost.to_string(),
                standing.goals_for.to_string(),
                standing.goals_against.to_string(),
                goal_difference,
                standing.points.to_string(),
            ];
            for (i, value) in stats.iter().enumerate() {
                let x = area.x + POS_WIDTH + name_width + STAT_WIDTH * i as u16;
                if x >= area.right() {
                    break;
                }
                buf.set_string(x, y, format!("{value:>4}"), style);
            }
        }
    }
}

fn row_style(standing: &Standing, index: usize) -> Style {
    let style = Style::default().fg(Color::White);
    if index == 0 && standing.played > 0 {
        style.fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        style
    }
}
