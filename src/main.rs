use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
};

use league_trends::args::{arg_value, cli_args};
use league_trends::config::{PipelineConfig, TEAM_MATCH_CLEAN};
use league_trends::trends::{
    TeamMatchRecord, TeamTotal, cumulative_points, goals_for_against, load_team_matches,
    team_list, xg_vs_points,
};

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Points,
    Goals,
    XgPoints,
}

struct App {
    records: Vec<TeamMatchRecord>,
    teams: Vec<String>,
    // None = all teams overlaid.
    focus: Option<usize>,
    screen: Screen,
    status: String,
    help_overlay: bool,
    should_quit: bool,
}

impl App {
    fn new(records: Vec<TeamMatchRecord>, focus_team: Option<&str>, status: String) -> Self {
        let teams = team_list(&records);
        let focus = focus_team.and_then(|name| teams.iter().position(|t| t == name));
        let status = match (focus_team, focus) {
            (Some(name), None) => format!("{status} | unknown team {name:?}, showing all"),
            _ => status,
        };
        Self {
            records,
            teams,
            focus,
            screen: Screen::Points,
            status,
            help_overlay: false,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.screen = Screen::Points,
            KeyCode::Char('2') => self.screen = Screen::Goals,
            KeyCode::Char('3') => self.screen = Screen::XgPoints,
            KeyCode::Char('t') | KeyCode::Right => self.cycle_focus(true),
            KeyCode::Char('T') | KeyCode::Left => self.cycle_focus(false),
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    /// all -> first team -> ... -> last team -> all
    fn cycle_focus(&mut self, forward: bool) {
        if self.teams.is_empty() {
            self.focus = None;
            return;
        }
        let last = self.teams.len() - 1;
        self.focus = match (self.focus, forward) {
            (None, true) => Some(0),
            (None, false) => Some(last),
            (Some(i), true) if i < last => Some(i + 1),
            (Some(i), false) if i > 0 => Some(i - 1),
            _ => None,
        };
    }

    fn focus_team(&self) -> Option<&str> {
        self.focus
            .and_then(|i| self.teams.get(i))
            .map(|s| s.as_str())
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = cli_args();
    let mut config = PipelineConfig::from_env();
    if let Some(dir) = arg_value(&args, "--data-dir") {
        config.set_data_dir(dir);
    }
    let team = arg_value(&args, "--team");

    let path = config.processed_path(TEAM_MATCH_CLEAN);
    let (records, status) = match load_team_matches(&path) {
        Ok(records) => {
            let status = format!("[INFO] Loaded {} rows from {}", records.len(), path.display());
            (records, status)
        }
        Err(err) => (Vec::new(), format!("[WARN] {err:#}")),
    };
    let mut app = App::new(records, team.as_deref(), status);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    if app.records.is_empty() {
        let empty = Paragraph::new("No processed match data. Run fetch_raw and clean_raw first.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, chunks[1]);
    } else {
        match app.screen {
            Screen::Points => render_points(frame, chunks[1], app),
            Screen::Goals => render_goals(frame, chunks[1], app),
            Screen::XgPoints => render_xg_points(frame, chunks[1], app),
        }
    }

    let footer = Paragraph::new(footer_text(app))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let view = match app.screen {
        Screen::Points => format!(
            "Cumulative points - {}",
            app.focus_team().unwrap_or("all teams")
        ),
        Screen::Goals => "Goals scored / conceded".to_string(),
        Screen::XgPoints => "xG vs points - team level".to_string(),
    };
    format!("LEAGUE TRENDS | {view}")
}

fn footer_text(app: &App) -> String {
    format!(
        "1 Points | 2 Goals | 3 xG | t/T Team | ? Help | q Quit    {}",
        app.status
    )
}

fn render_points(frame: &mut Frame, area: Rect, app: &App) {
    let series = cumulative_points(&app.records, app.focus_team());
    let data = series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .map(|(week, pts)| (f64::from(*week), f64::from(*pts)))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let max_week = data
        .iter()
        .flatten()
        .map(|(x, _)| *x)
        .fold(1.0_f64, f64::max);
    let max_points = data
        .iter()
        .flatten()
        .map(|(_, y)| *y)
        .fold(1.0_f64, f64::max);

    let single = app.focus.is_some();
    let datasets = series
        .iter()
        .zip(data.iter())
        .enumerate()
        .map(|(idx, (s, points))| {
            let dataset = Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .data(points);
            if single {
                dataset
                    .name(s.team.clone())
                    .style(Style::default().fg(Color::Cyan))
            } else {
                // Overlay: dimmed, no legend entries.
                let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
                dataset.style(Style::default().fg(color).add_modifier(Modifier::DIM))
            }
        })
        .collect::<Vec<_>>();

    let chart = Chart::new(datasets)
        .block(Block::default().title("Cumulative points").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Matchweek")
                .bounds([0.0, max_week])
                .labels(axis_labels(0.0, max_week)),
        )
        .y_axis(
            Axis::default()
                .title("Cumulative points")
                .bounds([0.0, max_points])
                .labels(axis_labels(0.0, max_points)),
        );
    frame.render_widget(chart, area);
}

fn axis_labels(min: f64, max: f64) -> Vec<Span<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Span::raw(format!("{min:.0}")),
        Span::raw(format!("{mid:.0}")),
        Span::raw(format!("{max:.0}")),
    ]
}

fn render_goals(frame: &mut Frame, area: Rect, app: &App) {
    let summary = goals_for_against(&app.records);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    frame.render_widget(
        totals_bar_chart("Total goals scored (GF)", &summary.scored, Color::Green),
        cols[0],
    );
    frame.render_widget(
        totals_bar_chart("Total goals conceded (GA)", &summary.conceded, Color::Red),
        cols[1],
    );
}

fn totals_bar_chart<'a>(title: &'a str, totals: &[TeamTotal], color: Color) -> BarChart<'a> {
    let bars = totals
        .iter()
        .map(|t| {
            Bar::default()
                .value(t.value.max(0.0).round() as u64)
                .label(Line::from(t.team.clone()))
                .text_value(format!("{:.0}", t.value))
                .style(Style::default().fg(color))
        })
        .collect::<Vec<_>>();

    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
}

fn render_xg_points(frame: &mut Frame, area: Rect, app: &App) {
    let rows = xg_vs_points(&app.records);
    let max_xg = rows.iter().map(|r| r.xg).fold(1.0_f64, f64::max) * 1.1;
    let max_points = rows.iter().map(|r| r.points).fold(1.0_f64, f64::max) * 1.1;
    let coords = rows.iter().map(|r| (r.xg, r.points)).collect::<Vec<_>>();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(
                    "xG vs points | x: total xG (0-{max_xg:.0}) | y: total points (0-{max_points:.0})"
                ))
                .borders(Borders::ALL),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, max_xg])
        .y_bounds([0.0, max_points])
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &coords,
                color: Color::Yellow,
            });
            ctx.layer();
            for row in &rows {
                ctx.print(
                    row.xg,
                    row.points,
                    Span::styled(row.team.clone(), Style::default().fg(Color::Gray)),
                );
            }
        });
    frame.render_widget(canvas, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "League Trends - Help",
        "",
        "  1            Cumulative points",
        "  2            Goals for / against",
        "  3            xG vs points",
        "  t / →        Next team (points chart)",
        "  T / ←        Previous team",
        "  ?            Toggle help",
        "  q / Esc      Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
