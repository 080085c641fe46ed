use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::goal_sheet::GoalSheetView;
use crate::components::league_table::LeagueTable;
use crate::state::app_state::ManageSection;
use crate::state::forms::FormState;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use league_api::standings::{top_assists, top_scorers};
use league_api::{EventType, Match};

static TABS: &[&str; 6] = &["Table", "Fixtures", "Results", "Squads", "Scores", "Manage"];

const HELP_TEXT: &str = "\
Public
  1 Table  2 Fixtures  3 Results  4 Squads   j/k scroll   r reload

Admin (login required)
  5 Scores   Enter open goal sheet
             +/- score  Tab side  j/k goal  h/l field  [ ] player
             0-9 minute  x remove goal  s save  Esc close
  6 Manage   Tab section  n new  e edit player  a (de)activate  d delete

Session
  L log in   O log out

Other
  f full screen   \" logs   ? help   Esc back   q quit";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let _ = terminal.draw(|f| {
        if app.state.show_intro {
            draw_intro(f, f.area(), app);
            draw_overlays(f, app);
            return;
        }

        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }
        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        let main = layout.main;

        match app.state.active_tab {
            MenuItem::Table => draw_table(f, main, app),
            MenuItem::Fixtures => draw_fixtures(f, main, app),
            MenuItem::Results => draw_results(f, main, app),
            MenuItem::Squads => draw_squads(f, main, app),
            MenuItem::Scores => draw_scores(f, main, app),
            MenuItem::Manage => draw_manage(f, main, app),
            MenuItem::Help => draw_help(f, main),
        }

        draw_status(f, layout.status, app);
        draw_loading_spinner(f, f.area(), app, loading);
        draw_overlays(f, app);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn selected(on: bool) -> Style {
    if on {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn draw_intro(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::DarkGray).title(" Alumni League ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [_top_pad, title_area, store_area, prompt_area, _bottom_pad] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(inner);

    f.render_widget(
        Paragraph::new("ALUMNI FOOTBALL LEAGUE")
            .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        title_area,
    );
    f.render_widget(
        Paragraph::new(format!("Data: {}", app.settings.store.describe()))
            .style(dim())
            .alignment(Alignment::Center),
        store_area,
    );
    f.render_widget(
        Paragraph::new("Press Enter to view the league table  ·  L to log in as admin")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        prompt_area,
    );
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Table => 0,
        MenuItem::Fixtures => 1,
        MenuItem::Results => 2,
        MenuItem::Squads => 3,
        MenuItem::Scores => 4,
        MenuItem::Manage => 5,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let session = match app.state.admin.session.as_ref() {
        Some(session) => format!("{} | Help: ? ", session.name),
        None => "Help: ? ".to_string(),
    };
    let help = Paragraph::new(session)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg).style(dim()).alignment(Alignment::Center),
        inner,
    );
}

fn not_loaded(f: &mut Frame, area: Rect, app: &App) -> bool {
    if app.state.league.loaded {
        return false;
    }
    draw_placeholder(f, area, "Loading league data...");
    true
}

// ---------------------------------------------------------------------------
// Public tabs
// ---------------------------------------------------------------------------

fn draw_table(f: &mut Frame, area: Rect, app: &App) {
    if not_loaded(f, area, app) {
        return;
    }
    let [table_area, leaders_area] = if area.width >= 110 {
        Layout::horizontal([Constraint::Fill(2), Constraint::Length(38)]).areas(area)
    } else {
        Layout::vertical([Constraint::Fill(1), Constraint::Length(9)]).areas(area)
    };

    let block = default_border(Color::White).title(" League Table ");
    let inner = block.inner(table_area);
    f.render_widget(block, table_area);
    f.render_widget(
        LeagueTable {
            standings: &app.state.league.data.standings,
            scroll: app.state.table_scroll,
        },
        inner,
    );

    draw_leaders(f, leaders_area, app);
}

fn draw_leaders(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::DarkGray).title(" Leaders ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let leaders = &app.state.league.leaders;
    if leaders.is_empty() {
        f.render_widget(Paragraph::new("No goals recorded yet").style(dim()), inner);
        return;
    }

    let [scorers_area, assists_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);
    let rows = inner.height.saturating_sub(1) as usize;

    let mut scorers = vec![Line::from(Span::styled("Goals", Style::default().fg(Color::Gray)))];
    for leader in top_scorers(leaders, rows) {
        scorers.push(Line::from(format!("{:>2} {}", leader.goals, leader.player_name)));
    }
    let mut assists = vec![Line::from(Span::styled("Assists", Style::default().fg(Color::Gray)))];
    for leader in top_assists(leaders, rows) {
        assists.push(Line::from(format!("{:>2} {}", leader.assists, leader.player_name)));
    }
    f.render_widget(Paragraph::new(scorers), scorers_area);
    f.render_widget(Paragraph::new(assists), assists_area);
}

fn fixture_line(app: &App, m: &Match) -> String {
    let league = &app.state.league;
    let kick_off = m
        .match_time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "TBC".to_string());
    let venue = m.venue.as_deref().unwrap_or("venue TBC");
    format!(
        "MD{:<2} {}  {}  {} v {}  ({venue})",
        m.match_day,
        m.match_date.format("%a %d %b"),
        kick_off,
        league.team_name(&m.home_team_id),
        league.team_name(&m.away_team_id),
    )
}

fn draw_fixtures(f: &mut Frame, area: Rect, app: &App) {
    if not_loaded(f, area, app) {
        return;
    }
    let block = default_border(Color::White).title(" Fixtures ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut fixtures = app.state.league.fixtures();
    if fixtures.is_empty() {
        f.render_widget(Paragraph::new("No upcoming matches").style(dim()), inner);
        return;
    }
    fixtures.sort_by_key(|m| (m.match_date, m.match_time));

    let lines: Vec<Line> = fixtures
        .iter()
        .map(|m| Line::from(fixture_line(app, m)))
        .collect();
    f.render_widget(
        Paragraph::new(lines).scroll((app.state.fixtures_scroll, 0)),
        inner,
    );
}

fn draw_results(f: &mut Frame, area: Rect, app: &App) {
    if not_loaded(f, area, app) {
        return;
    }
    let block = default_border(Color::White).title(" Results ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let results = app.state.league.results();
    if results.is_empty() {
        f.render_widget(Paragraph::new("No results yet").style(dim()), inner);
        return;
    }

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(inner);

    let league = &app.state.league;
    let selected_index = app.state.results_selected;
    let lines: Vec<Line> = results
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let (home, away) = m.result().unwrap_or_default();
            let marker = if i == selected_index { ">" } else { " " };
            Line::styled(
                format!(
                    "{marker} {}  {} {home}-{away} {}",
                    m.match_date.format("%d %b"),
                    league.team_name(&m.home_team_id),
                    league.team_name(&m.away_team_id),
                ),
                selected(i == selected_index),
            )
        })
        .collect();
    let offset = selected_index.saturating_sub(list_area.height.saturating_sub(1) as usize);
    f.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), list_area);

    if let Some(m) = results.get(selected_index) {
        draw_goal_details(f, detail_area, app, m);
    }
}

fn draw_goal_details(f: &mut Frame, area: Rect, app: &App, m: &Match) {
    let block = default_border(Color::DarkGray).title(" Goals ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let league = &app.state.league;
    let mut events: Vec<_> = league.data.events.iter().filter(|e| e.match_id == m.id).collect();
    events.sort_by_key(|e| (e.minute.is_none(), e.minute));

    let mut lines = Vec::new();
    for side_team in [&m.home_team_id, &m.away_team_id] {
        lines.push(Line::styled(league.team_name(side_team), Style::default().fg(Color::Gray)));
        let goals: Vec<_> = events
            .iter()
            .filter(|e| &e.team_id == side_team && e.event_type == EventType::Goal)
            .collect();
        if goals.is_empty() {
            lines.push(Line::styled("  no goal details", dim()));
        }
        for goal in goals {
            let minute = goal.minute.map(|min| format!("{min}'")).unwrap_or_else(|| "--".to_string());
            lines.push(Line::from(format!("  {minute:>4} {}", league.player_name(&goal.player_id))));
        }
        let assists: Vec<String> = events
            .iter()
            .filter(|e| &e.team_id == side_team && e.event_type == EventType::Assist)
            .map(|e| league.player_name(&e.player_id))
            .collect();
        if !assists.is_empty() {
            lines.push(Line::styled(format!("  assists: {}", assists.join(", ")), dim()));
        }
        lines.push(Line::from(""));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_squads(f: &mut Frame, area: Rect, app: &App) {
    if not_loaded(f, area, app) {
        return;
    }
    let league = &app.state.league;
    let teams = &league.data.teams;
    if teams.is_empty() {
        draw_placeholder(f, area, "No teams registered yet");
        return;
    }

    let [teams_area, squad_area] =
        Layout::horizontal([Constraint::Length(28), Constraint::Fill(1)]).areas(area);

    let block = default_border(Color::White).title(" Teams ");
    let inner = block.inner(teams_area);
    f.render_widget(block, teams_area);
    let lines: Vec<Line> = teams
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let style = if t.is_active { selected(i == app.state.squads_selected) } else { dim() };
            Line::styled(t.name.clone(), style)
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);

    let Some(team) = teams.get(app.state.squads_selected) else {
        return;
    };
    let block = default_border(Color::DarkGray).title(format!(" {} ", team.name));
    let inner = block.inner(squad_area);
    f.render_widget(block, squad_area);

    let mut lines = Vec::new();
    if let Some(rep) = team.representative_name.as_deref() {
        lines.push(Line::styled(format!("Representative: {rep}"), dim()));
        lines.push(Line::from(""));
    }
    let squad = league.squad(&team.id);
    if squad.is_empty() {
        lines.push(Line::styled("No players registered", dim()));
    }
    for player in squad {
        let position = player.position.map(|p| p.abbrev()).unwrap_or("--");
        let text = format!("{position:<3} {}", player.display_name());
        let style = if player.is_active { Style::default().fg(Color::White) } else { dim() };
        lines.push(Line::styled(text, style));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Admin tabs
// ---------------------------------------------------------------------------

fn draw_scores(f: &mut Frame, area: Rect, app: &App) {
    if not_loaded(f, area, app) {
        return;
    }

    if let Some(sheet) = app.state.scores.sheet.as_ref() {
        let block = default_border(Color::Yellow).title(" Goal Sheet ");
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(GoalSheetView { sheet, league: &app.state.league }, inner);
        return;
    }

    let block = default_border(Color::White).title(" Scores ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let matches = app.score_matches();
    if matches.is_empty() {
        f.render_widget(Paragraph::new("No matches scheduled").style(dim()), inner);
        return;
    }

    let [legend, list_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new("j/k select  Enter enter or correct result").style(dim()),
        legend,
    );

    let selected_index = app.state.scores.selected_match;
    let lines: Vec<Line> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let marker = if i == selected_index { ">" } else { " " };
            let state = match m.result() {
                Some((home, away)) => format!("[{home}-{away}]"),
                None => "[ - ]".to_string(),
            };
            Line::styled(format!("{marker} {state:<7} {}", fixture_line(app, m)), selected(i == selected_index))
        })
        .collect();
    let offset = selected_index.saturating_sub(list_area.height.saturating_sub(1) as usize);
    f.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), list_area);
}

fn draw_manage(f: &mut Frame, area: Rect, app: &App) {
    if not_loaded(f, area, app) {
        return;
    }
    let section = app.state.manage.section;
    let block = default_border(Color::White).title(format!(" Manage: {} ", section.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [legend, list_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    let keys = match section {
        ManageSection::Teams => "Tab section  n register  a (de)activate  d delete",
        ManageSection::Players => "Tab section  n register  e edit  a (de)activate  d delete",
        ManageSection::Matches => "Tab section  n schedule  d delete",
    };
    f.render_widget(Paragraph::new(keys).style(dim()), legend);

    let league = &app.state.league;
    let rows: Vec<(String, bool)> = match section {
        ManageSection::Teams => league
            .data
            .teams
            .iter()
            .map(|t| {
                let contact = t.contact_email.as_deref().or(t.contact_phone.as_deref()).unwrap_or("");
                (format!("{:<24} {contact}", t.name), t.is_active)
            })
            .collect(),
        ManageSection::Players => league
            .data
            .players
            .iter()
            .map(|p| (format!("{:<28} {}", p.display_name(), league.team_name(&p.team_id)), p.is_active))
            .collect(),
        ManageSection::Matches => league
            .data
            .matches
            .iter()
            .map(|m| (fixture_line(app, m), true))
            .collect(),
    };
    if rows.is_empty() {
        f.render_widget(Paragraph::new("Nothing here yet. Press n to add.").style(dim()), list_area);
        return;
    }

    let selected_index = app.state.manage.selected;
    let lines: Vec<Line> = rows
        .into_iter()
        .enumerate()
        .map(|(i, (text, active))| {
            let marker = if i == selected_index { ">" } else { " " };
            let suffix = if active { "" } else { "  (inactive)" };
            let style = if active { selected(i == selected_index) } else { dim() };
            Line::styled(format!("{marker} {text}{suffix}"), style)
        })
        .collect();
    let offset = selected_index.saturating_sub(list_area.height.saturating_sub(1) as usize);
    f.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), list_area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT), inner);
}

// ---------------------------------------------------------------------------
// Status, logs, overlays
// ---------------------------------------------------------------------------

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    if let Some(status) = app.state.status.as_deref() {
        f.render_widget(
            Paragraph::new(format!(" {status}")).style(Style::default().fg(Color::Green)),
            area,
        );
    }
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn draw_overlays(f: &mut Frame, app: &App) {
    let area = f.area();
    if let Some(form) = app.state.form.as_ref() {
        draw_form(f, area, form);
    }
    if let Some(confirm) = app.state.confirm.as_ref() {
        let popup = centered(area, 60, 5);
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(format!("{}\n\ny = yes   n = no", confirm.prompt))
                .wrap(Wrap { trim: true })
                .block(default_border(Color::Yellow).title(" Confirm ")),
            popup,
        );
    }
    if let Some(alert) = app.state.alert.as_deref() {
        let popup = centered(area, 64, 7);
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(format!("{alert}\n\nEnter to dismiss"))
                .wrap(Wrap { trim: true })
                .block(default_border(Color::Red).title(" Error ")),
            popup,
        );
    }
}

fn draw_form(f: &mut Frame, area: Rect, form: &FormState) {
    let height = form.fields.len() as u16 + 4;
    let popup = centered(area, 64, height);
    f.render_widget(Clear, popup);
    let block = default_border(Color::Cyan).title(form.title());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let value = if field.secret {
                "*".repeat(field.value.chars().count())
            } else {
                field.value.clone()
            };
            let focused = i == form.focus;
            let cursor = if focused { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:>14}: ", field.label), Style::default().fg(Color::Gray)),
                Span::styled(format!("{value}{cursor}"), selected(focused)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::styled("Tab next field  Enter submit  Esc cancel", dim()));
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
