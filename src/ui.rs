//! UI rendering for the terminal interface.
//!
//! Everything drawn here comes from the app's [`BrowseView`] snapshot and
//! the session accessors; nothing is mutated while drawing.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Focus};
use crate::browser::{BrowseItem, BrowseView, ItemKind};
use crate::config::{ControlsSettings, UiSettings};
use crate::library::{DirectoryAccess, SortMode};
use crate::session::PlaybackSurface;

const PROGRESS_CELLS: usize = 10;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("j/k", "up/down"),
        ("enter", "open/play"),
        ("bksp/u", "parent folder"),
        ("~", "home"),
        ("1-9", "breadcrumb"),
        ("r", "reload"),
        ("space/p", "play/pause"),
        ("n/N", "next/prev video"),
        ("alt+←/→", "prev/next video"),
        ("[/]", "slower/faster"),
        ("s", "sort"),
        ("a", "autoplay"),
        ("x", "stop"),
        ("q", "quit"),
    ])
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "j/k", "enter", "bksp/u", "~", "1-9", "r", "space/p", "n/N", "alt+←/→", "H/L", "[/]", "s", "a",
        "x", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{scrub_seconds}s"))
            } else {
                CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `MM:SS`, or `H:MM:SS` past the hour.
fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

fn progress_bar(percentage: f64) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * PROGRESS_CELLS as f64).round() as usize;
    format!(
        "{}{} {:>3.0}%",
        "█".repeat(filled),
        "░".repeat(PROGRESS_CELLS - filled),
        percentage
    )
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn status_text<S: PlaybackSurface, A: DirectoryAccess>(app: &App<S, A>) -> String {
    let session = &app.session;
    let mut parts: Vec<String> = Vec::new();

    parts.push(session.state().label().to_string());

    let playlist = session.playlist();
    if let Some(i) = playlist.current_index() {
        parts.push(format!("Video {}/{}", i + 1, playlist.len()));
    } else if !playlist.is_empty() {
        parts.push(format!("{} videos", playlist.len()));
    }

    if let Some(video) = session.active() {
        let position = format_clock(session.position());
        match session.duration() {
            Some(d) => parts.push(format!("Video: {} [{position} / {}]", video.name, format_clock(d))),
            None => parts.push(format!("Video: {} [{position}]", video.name)),
        }
    }

    parts.push(format!("Rate: {}x", session.prefs().rate()));
    parts.push(if session.prefs().autoplay() {
        "Autoplay: ON".to_string()
    } else {
        "Autoplay: OFF".to_string()
    });
    if session.has_pending_advance() {
        parts.push("Next video shortly".to_string());
    }
    parts.push(format!("Sort: {}", app.browser.sort_mode()));
    if !session.progress().is_empty() {
        parts.push(format!("Watched: {}", session.progress().len()));
    }

    if let Some(notice) = session.notice() {
        parts.push(notice.to_string());
    }
    if let Some(err) = &app.status {
        parts.push(format!("Error: {err}"));
    }

    parts.join(" • ")
}

fn list_item(item: &BrowseItem) -> ListItem<'static> {
    let marker = if item.is_current { "▶ " } else { "  " };
    let mut spans = vec![Span::raw(marker)];
    match item.kind {
        ItemKind::Folder => spans.push(Span::raw(format!("{}/", item.name)).bold()),
        ItemKind::Video => spans.push(Span::raw(item.name.clone())),
        ItemKind::Other => spans.push(Span::raw(item.name.clone()).dim()),
    }
    if let Some(p) = item.progress {
        spans.push(Span::raw("  "));
        spans.push(Span::raw(progress_bar(p)).dim());
    }
    ListItem::new(Line::from(spans))
}

/// Render the entire UI into `frame`.
pub fn draw<S: PlaybackSurface, A: DirectoryAccess>(
    frame: &mut Frame,
    app: &App<S, A>,
    view: &BrowseView,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" vidshelf ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Listing, titled with the breadcrumb.
    {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", view.crumb_line()));

        if let Some(message) = &view.message {
            let empty = Paragraph::new(message.as_str())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, chunks[2]);
        } else {
            // Only build rows for the visible window, keeping the cursor centered.
            let total = view.items.len();
            let list_height = chunks[2].height.saturating_sub(2) as usize;
            let sel = app.selected.min(total.saturating_sub(1));
            let (start, end) = if total <= list_height || list_height == 0 {
                (0, total)
            } else {
                let half = list_height / 2;
                let start = sel.saturating_sub(half).min(total - list_height);
                (start, start + list_height)
            };

            let rows: Vec<ListItem> = view.items[start..end].iter().map(list_item).collect();
            let list = List::new(rows)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            let mut state = ListState::default();
            if total > 0 {
                state.select(Some(sel - start));
            }
            frame.render_stateful_widget(list, chunks[2], &mut state);
        }
    }

    if app.focus == Focus::SortPicker {
        let popup_area = centered_rect_sized(32, SortMode::ALL.len() as u16 + 2, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let rows: Vec<ListItem> = SortMode::ALL
            .iter()
            .map(|m| {
                let mark = if *m == view.sort { "• " } else { "  " };
                ListItem::new(format!("{mark}{}", m.label()))
            })
            .collect();
        let picker = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" sort by (enter/esc) "),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        state.select(Some(app.sort_cursor));
        frame.render_stateful_widget(picker, popup_area, &mut state);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
