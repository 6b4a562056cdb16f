//! Garistagram TUI - Actor-based card binder
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Backend Layer (Tokio) - async Supabase calls

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::layout::Flex;
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use garistagram_tui::app::AppActor;
use garistagram_tui::backend::{BackendActor, CardBackend, SupabaseBackend};
use garistagram_tui::config::AppConfig;
use garistagram_tui::constants::{APP_NAME, APP_VERSION, GRID_COLUMNS, LOG_FILE, SLOT_COUNT};
use garistagram_tui::messages::render::DetailView;
use garistagram_tui::messages::ui_events::{key_to_ui_event, AppTab, Focus, UploadField};
use garistagram_tui::messages::{BackendCommand, BackendResponse, RenderState, UiEvent};
use garistagram_tui::ui::{centered_rect, grid_cell, notice_color, popup_block, render_tabs};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    tracing::info!(app = APP_NAME, version = APP_VERSION, "Starting");

    let mut startup_error = None;
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Config could not be loaded, using defaults");
            startup_error = Some(format!("Config error: {:#}", e));
            let mut config = AppConfig::default();
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
    };
    if let Some(reason) = config.backend.missing() {
        tracing::warn!(%reason, "Backend not configured");
        startup_error.get_or_insert_with(|| format!("Backend not configured: {}", reason));
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<BackendCommand>();
    let (resp_tx, resp_rx) = mpsc::unbounded_channel::<BackendResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn backend actor
    let card_backend: Arc<dyn CardBackend> = Arc::new(SupabaseBackend::new(config.backend.clone()));
    let backend_actor = BackendActor::new(card_backend, resp_tx);
    tokio::spawn(backend_actor.run(cmd_rx));

    // Spawn app actor
    let mut app_actor = AppActor::new(config.profile.clone(), cmd_tx, render_tx);
    if let Some(message) = startup_error {
        app_actor = app_actor.with_startup_error(message);
    }
    tokio::spawn(app_actor.run(ui_rx, resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(key, current_state.focus) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Account bar
            Constraint::Length(6), // Profile
            Constraint::Length(1), // Tab bar
            Constraint::Min(3),    // Grid
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(f, state, chunks[0]);
    draw_profile(f, state, chunks[1]);
    draw_tab_bar(f, state, chunks[2]);
    draw_grid(f, state, chunks[3]);
    draw_status_bar(f, state, chunks[4]);

    // Popups, innermost last
    if state.show_upload {
        draw_upload_popup(f, state, area);
    }
    if state.focus == Focus::ConfirmOverwrite {
        draw_overwrite_popup(f, state, area);
    }
    if let Some(detail) = &state.detail {
        draw_detail_popup(f, detail, area);
        if state.focus == Focus::ConfirmDelete {
            draw_delete_popup(f, detail, area);
        }
    }
    if state.fortune.is_some() {
        draw_fortune_overlay(f, state, area);
    }
    if state.focus == Focus::Help {
        draw_help_popup(f, area);
    }
}

fn draw_header(f: &mut Frame, state: &RenderState, area: Rect) {
    let line = Line::from(vec![
        Span::styled(format!(" {} ", state.profile.handle), Style::default().fg(Color::White).bold()),
        Span::styled("✔", Style::default().fg(Color::LightBlue)),
        Span::styled(
            if state.is_loading { "  syncing..." } else { "" },
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line).style(Style::default().bg(Color::Rgb(13, 4, 21))), area);
}

fn draw_profile(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let profile = &state.profile;
    let mut lines = vec![
        Line::from(Span::styled(profile.display_name.as_str(), Style::default().bold())),
        Line::from(Span::styled(profile.category.as_str(), Style::default().fg(Color::Gray))),
        Line::from(profile.bio.as_str()),
    ];
    if !profile.link.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("🔗 {}", profile.link),
            Style::default().fg(Color::LightBlue),
        )));
    }
    lines.push(Line::from(Span::styled(
        "p / Space: draw your fortune",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(1))), chunks[0]);

    let stats = Line::from(vec![
        Span::styled(format!("{}", state.occupied_count), Style::default().bold()),
        Span::styled(" posts   ", Style::default().fg(Color::Gray)),
        Span::styled(profile.followers.as_str(), Style::default().bold()),
        Span::styled(" followers   ", Style::default().fg(Color::Gray)),
        Span::styled(format!("{}", SLOT_COUNT), Style::default().bold()),
        Span::styled(" following", Style::default().fg(Color::Gray)),
    ]);
    let favorites = Line::from(Span::styled(
        format!("♥ {} favorites", state.favorite_count),
        Style::default().fg(Color::LightRed),
    ));
    f.render_widget(Paragraph::new(vec![Line::default(), stats, favorites]), chunks[1]);
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let selected = match state.active_tab {
        AppTab::All => 0,
        AppTab::Favorites => 1,
    };
    f.render_widget(render_tabs(&[" 1:All ", " 2:♥ Favorites "], selected), area);
}

fn draw_grid(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default().borders(Borders::TOP).border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if state.cells.is_empty() {
        let text = if state.active_tab == AppTab::Favorites {
            "♡ No favorite cards yet"
        } else {
            "Nothing to show"
        };
        let empty = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    // Scroll so the cursor row stays visible
    let visible_rows = inner.height.max(1) as usize;
    let cursor_row = state.cursor / GRID_COLUMNS;
    let first_row = (cursor_row + 1).saturating_sub(visible_rows);

    let lines: Vec<Line> = state
        .cells
        .chunks(GRID_COLUMNS)
        .enumerate()
        .skip(first_row)
        .take(visible_rows)
        .map(|(row, cells)| {
            let spans: Vec<Span> = cells
                .iter()
                .enumerate()
                .map(|(col, cell)| grid_cell(cell, row * GRID_COLUMNS + col == state.cursor))
                .collect();
            Line::from(spans)
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let line = match &state.notice {
        Some(notice) => Line::from(vec![
            Span::styled(
                format!(" {} ", notice.timestamp.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(notice.text.as_str(), Style::default().fg(notice_color(notice.level))),
        ]),
        None => Line::from(Span::styled(
            " ←↑↓→:move | Enter:open | f:favorite | u:upload | p:fortune | r:reload | ?:help | q:quit ",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_upload_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(70, 70, area);
    f.render_widget(Clear, popup_area);

    let block = popup_block(" 🖼 Register cards ", Color::Cyan).style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Path input
            Constraint::Min(3),    // Staged list
            Constraint::Length(3), // Slot edit / commit button
            Constraint::Length(1), // Key hints
        ])
        .split(inner);

    let path_focused = state.focus == Focus::Upload(UploadField::Path);
    let path_text = if state.upload_path_input.is_empty() {
        Span::styled("Image file or folder, e.g. ~/Pictures/cards", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.upload_path_input.as_str())
    };
    let path_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if path_focused { Style::default().fg(Color::Yellow) } else { Style::default() })
        .title(" Add images (Enter, Tab completes) ");
    f.render_widget(Paragraph::new(Line::from(path_text)).block(path_block), chunks[0]);

    let items: Vec<ListItem> = state
        .staged
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == state.selected_staged {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default()
            };
            ListItem::new(format!("No.{:>3}  {}", item.slot, item.preview)).style(style)
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Staged ({}) ", state.staged.len())),
    );
    f.render_widget(list, chunks[1]);

    if state.focus == Focus::Upload(UploadField::Slot) {
        let slot_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" No. (1-300, Enter to apply) ");
        f.render_widget(Paragraph::new(state.slot_input.as_str()).block(slot_block), chunks[2]);
    } else {
        let (label, style) = if state.is_committing {
            (
                format!("Archiving {} cards...", state.staged.len()),
                Style::default().fg(Color::Yellow),
            )
        } else if state.staged.is_empty() {
            (String::from("Archive 0 cards"), Style::default().fg(Color::DarkGray))
        } else {
            (
                format!("Archive {} cards (Ctrl+S)", state.staged.len()),
                Style::default().fg(Color::Black).bg(Color::White).bold(),
            )
        };
        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(button, chunks[2]);
    }

    let hints = Paragraph::new(" ↑↓:select | Ctrl+N:edit No. | Ctrl+D:remove | Ctrl+S:archive | Esc:close ")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(hints, chunks[3]);
}

fn draw_overwrite_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(50, 30, area);
    let slots: Vec<String> = state.conflicts.iter().map(|s| s.to_string()).collect();

    let text = vec![
        Line::from(Span::styled("Overwrite cards?", Style::default().bold())),
        Line::default(),
        Line::from(format!("No. {} already registered.", slots.join(", "))),
        Line::from("Replace them with the new images?"),
        Line::default(),
        Line::from(Span::styled(
            "Cards without a conflict are saved in the same batch.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(" y/Enter: overwrite and save   n/Esc: cancel "),
    ];

    let popup = Paragraph::new(text)
        .block(popup_block(" Confirm ", Color::LightBlue).style(Style::default().bg(Color::Black)))
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup_area);
    f.render_widget(popup, popup_area);
}

fn draw_detail_popup(f: &mut Frame, detail: &DetailView, area: Rect) {
    let popup_area = centered_rect(50, 40, area);

    let (fav_label, fav_style) = if detail.favorite {
        ("♥ Favorite (f to remove)", Style::default().fg(Color::Magenta).bold())
    } else {
        ("♡ Add to favorites (f)", Style::default())
    };

    let text = vec![
        Line::default(),
        Line::from(Span::styled(detail.image_url.as_str(), Style::default().fg(Color::LightBlue))),
        Line::default(),
        Line::from(Span::styled(fav_label, fav_style)),
        Line::default(),
        Line::from(Span::styled("d: delete   Esc: close", Style::default().fg(Color::DarkGray))),
    ];

    let title = format!(" No.{} ", detail.slot);
    let popup = Paragraph::new(text)
        .block(popup_block(&title, Color::Yellow).style(Style::default().bg(Color::Black)))
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup_area);
    f.render_widget(popup, popup_area);
}

fn draw_delete_popup(f: &mut Frame, detail: &DetailView, area: Rect) {
    let popup_area = centered_rect(40, 20, area);
    let text = vec![
        Line::from(format!("Send No.{} to another world?", detail.slot)),
        Line::from(Span::styled(
            "The record and its stored image are removed.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(" y: delete   n/Esc: keep "),
    ];
    let popup = Paragraph::new(text)
        .block(popup_block(" Delete ", Color::Red).style(Style::default().bg(Color::Black)))
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup_area);
    f.render_widget(popup, popup_area);
}

fn draw_fortune_overlay(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(draw) = &state.fortune else {
        return;
    };
    f.render_widget(Clear, area);
    f.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Length(2),  // Title
            Constraint::Length(9),  // Cards
            Constraint::Length(3),  // Result
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new("Your card of fate!")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).bold());
    f.render_widget(title, chunks[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .flex(Flex::Center)
        .constraints(draw.cards().iter().map(|_| Constraint::Length(16)))
        .spacing(2)
        .split(chunks[2]);

    for (i, card) in draw.cards().iter().enumerate() {
        let revealed = draw.revealed_index() == Some(i);
        let under_cursor = draw.cursor() == i;
        let border = if revealed {
            Style::default().fg(Color::Yellow).bold()
        } else if under_cursor && draw.revealed_index().is_none() {
            Style::default().fg(Color::White).bold()
        } else {
            Style::default().fg(Color::Blue)
        };
        let body = if revealed {
            vec![
                Line::default(),
                Line::from(Span::styled(format!("No.{}", card.slot), Style::default().bold())),
                Line::from(if card.favorite { "♥" } else { "" }),
            ]
        } else {
            vec![Line::default(), Line::default(), Line::from("?")]
        };
        let card_widget = Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(border),
            );
        f.render_widget(card_widget, columns[i]);
    }

    let result = match draw.revealed() {
        Some(card) => vec![
            Line::from(Span::styled(card.image_url.as_str(), Style::default().fg(Color::LightBlue))),
            Line::from(Span::styled("Enter: close", Style::default().fg(Color::DarkGray))),
        ],
        None => vec![Line::from(Span::styled(
            "←/→ choose a card, Enter to flip it",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    f.render_widget(Paragraph::new(result).alignment(Alignment::Center), chunks[3]);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 GARISTAGRAM TUI - Keyboard Shortcuts

 GRID
   ←↑↓→ / hjkl        Move between slots
   1 / 2              All cards / Favorites
   Enter              Open card details
   f                  Toggle favorite
   r                  Reload from backend

 CARD DETAILS
   f                  Toggle favorite
   d                  Delete card (asks first)

 UPLOAD (u)
   Enter / Tab        Add path / complete folder
   ↑ / ↓              Select staged image
   Ctrl+N             Edit target No.
   Ctrl+D             Remove staged image
   Ctrl+S             Archive all staged images

 FORTUNE (p / Space)
   ←/→, Enter         Pick and flip a card

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}
