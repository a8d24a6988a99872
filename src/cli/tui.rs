//! Terminal UI shared by `watch` and `replay --format tui`.

use std::collections::BTreeMap;
use std::io::{Stdout, stdout};
use std::time::Duration;

use clash::game::{Coord, FactionId, FactionView, GameState, TerrainKind, Unit, project_view};
use clash::referee::TurnReport;
use clash::replay::render_events;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::CliError;

pub(super) type Term = Terminal<CrosstermBackend<Stdout>>;

const FACTION_COLORS: [Color; 2] = [Color::Blue, Color::Red];

/// Everything one frame shows.
pub(super) struct Screen<'a> {
    pub(super) title: &'a str,
    pub(super) status: &'a str,
    pub(super) state: &'a GameState,
    pub(super) report: Option<&'a TurnReport>,
    pub(super) max_turns: u32,
    pub(super) oracles: &'a BTreeMap<FactionId, String>,
    /// Index of the faction whose fog-of-war is shown, `None` for all.
    pub(super) view: Option<usize>,
    pub(super) radius: u16,
    pub(super) controls: &'a str,
}

/// Set up the alternate screen, run `body`, and restore the terminal even
/// when `body` fails.
pub(super) fn with_terminal<T>(
    body: impl FnOnce(&mut Term) -> Result<T, CliError>,
) -> Result<T, CliError> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .map_err(CliError::from)
        .and_then(|mut terminal| body(&mut terminal));

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    result
}

/// Wait up to `timeout` for a key press.
pub(super) fn poll_key(timeout: Duration) -> Result<Option<KeyCode>, CliError> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key.code));
    }
    Ok(None)
}

/// Cycle all -> first faction -> second faction -> all.
pub(super) const fn next_view(view: Option<usize>) -> Option<usize> {
    match view {
        None => Some(0),
        Some(0) => Some(1),
        Some(_) => None,
    }
}

pub(super) fn draw(f: &mut Frame, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(10),    // Main content
            Constraint::Length(3),  // Footer
        ])
        .split(f.area());

    let fog = screen.view.and_then(|idx| {
        let faction = screen.state.factions().get(idx)?;
        Some(project_view(screen.state, faction, screen.radius))
    });

    render_header(f, chunks[0], screen, fog.as_ref());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(24), Constraint::Length(44)])
        .split(chunks[1]);
    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_chunks[1]);

    render_map(f, main_chunks[0], screen.state, fog.as_ref());
    render_factions(f, side_chunks[0], screen, fog.as_ref());
    render_report(f, side_chunks[1], screen.report);

    let footer = Paragraph::new(screen.controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, screen: &Screen, fog: Option<&FactionView>) {
    let view = fog.map_or_else(|| "all".to_string(), |v| format!("{} fog", v.faction));
    let title = format!(
        " {} | Turn {}/{} | {} | View: {view} ",
        screen.title,
        screen.state.turn(),
        screen.max_turns,
        screen.status
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_map(f: &mut Frame, area: Rect, state: &GameState, fog: Option<&FactionView>) {
    let board = state.board();
    let mut lines: Vec<Line> = Vec::with_capacity(usize::from(board.height()));

    for y in 0..board.height() {
        let mut spans = Vec::with_capacity(usize::from(board.width()) * 2);
        for x in 0..board.width() {
            let coord = Coord::new(x, y);
            spans.push(tile_span(state, coord, fog));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    let map_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Map "));

    f.render_widget(map_widget, area);
}

fn tile_span(state: &GameState, coord: Coord, fog: Option<&FactionView>) -> Span<'static> {
    let unit = match fog {
        Some(view) => view.unit_at(coord),
        None => state.unit_at(coord),
    };
    if let Some(unit) = unit {
        let idx = faction_index(state, &unit.faction);
        return Span::styled(
            (idx + 1).to_string(),
            Style::default()
                .fg(FACTION_COLORS[idx])
                .add_modifier(Modifier::BOLD),
        );
    }

    if let Some(owner) = state
        .factions()
        .iter()
        .position(|f| state.headquarters(f) == Some(coord))
    {
        return Span::styled("H", Style::default().fg(FACTION_COLORS[owner]));
    }

    let Some(tile) = state.tile(coord) else {
        return Span::raw("?");
    };
    let lit = fog.is_none_or(|view| view.is_visible(coord));
    let color = if lit {
        match tile.terrain {
            TerrainKind::Water => Color::Cyan,
            TerrainKind::Forest => Color::Green,
            TerrainKind::Urban => Color::Yellow,
            TerrainKind::Rural => Color::Gray,
        }
    } else {
        Color::DarkGray
    };
    Span::styled(tile.terrain.glyph().to_string(), Style::default().fg(color))
}

fn render_factions(f: &mut Frame, area: Rect, screen: &Screen, fog: Option<&FactionView>) {
    let state = screen.state;
    let mut lines = Vec::new();

    for (idx, faction) in state.factions().iter().enumerate() {
        let oracle = screen.oracles.get(faction).map_or("unknown", String::as_str);
        let units: Vec<&Unit> = match fog {
            Some(view) => view.units.iter().filter(|u| u.belongs_to(faction)).collect(),
            None => state.living_units_of(faction).collect(),
        };

        let status = if state.is_defeated(faction) {
            " [DEFEATED]".to_string()
        } else {
            format!(" [ACTIVE, {} units]", state.living_units_of(faction).count())
        };
        lines.push(Line::from(vec![
            Span::styled(
                faction.to_string(),
                Style::default()
                    .fg(FACTION_COLORS[idx])
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(status),
        ]));
        lines.push(Line::from(format!("  {oracle}")));
        for unit in units {
            lines.push(Line::from(format!(
                "  {:<8} {:<8} {:>3} HP",
                unit.id.as_str(),
                unit.coord.to_string(),
                unit.hp
            )));
        }
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Factions "))
        .wrap(Wrap { trim: false });

    f.render_widget(widget, area);
}

fn render_report(f: &mut Frame, area: Rect, report: Option<&TurnReport>) {
    let lines: Vec<Line> = match report {
        Some(report) => render_events(report)
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect(),
        None => vec![Line::from("No turn resolved yet.")],
    };

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Events "))
        .wrap(Wrap { trim: false });

    f.render_widget(widget, area);
}

fn faction_index(state: &GameState, faction: &FactionId) -> usize {
    state
        .factions()
        .iter()
        .position(|f| f == faction)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_cycle() {
        assert_eq!(next_view(None), Some(0));
        assert_eq!(next_view(Some(0)), Some(1));
        assert_eq!(next_view(Some(1)), None);
    }
}
