//! Shared rendering helpers for the binder screens

use ratatui::{prelude::*, widgets::*};

use crate::app::state::NoticeLevel;
use crate::messages::render::GridCell;

/// Renders the All / Favorites tab bar
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::White).bold().underlined())
        .divider("|")
}

/// Label and style for one grid cell
pub fn grid_cell(cell: &GridCell, selected: bool) -> Span<'static> {
    let label = if cell.occupied {
        let mark = if cell.favorite { '♥' } else { '■' };
        format!("{}{:>3}", mark, cell.slot)
    } else {
        format!(" {:>3}", cell.slot)
    };

    let mut style = if cell.occupied && cell.favorite {
        Style::default().fg(Color::LightRed).bold()
    } else if cell.occupied {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    if cell.pending {
        style = style.italic();
    }
    if selected {
        style = style.bg(Color::Magenta).fg(Color::White);
    }

    Span::styled(format!("{} ", label), style)
}

pub fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Error => Color::Red,
    }
}

/// A bordered popup block with a title
pub fn popup_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(title)
}

/// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
