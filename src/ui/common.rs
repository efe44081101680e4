//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_elapsed;
use crate::data::CurrentTest;

/// Render the header bar: instance, running test and breached metrics.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let instance = app
        .instance()
        .map_or("no instance", |instance| instance.name.as_str());

    let mut spans = vec![
        Span::styled(" INSTANCE MONITOR ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(instance.to_string(), app.theme.header),
    ];
    if app.instances.len() > 1 {
        spans.push(Span::styled(
            format!(" ({}/{})", app.selected_instance + 1, app.instances.len()),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    spans.push(Span::raw(" │ "));
    spans.push(Span::raw(current_test_label(&app.data.current_test)));
    spans.push(Span::raw(" │ "));

    if !app.data.has_data() {
        spans.push(Span::styled("-", Style::default().add_modifier(Modifier::DIM)));
    } else if app.data.alerts.is_empty() {
        spans.push(Span::styled("● ok", Style::default().fg(app.theme.healthy)));
    } else {
        let breached: Vec<&str> = app.data.alerts.iter().map(|key| key.as_str()).collect();
        spans.push(Span::styled(
            format!("● {}", breached.join(" ")),
            Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// "Current Test: {type} (Duration: {n}s)".
pub fn current_test_label(test: &CurrentTest) -> String {
    format!("Current Test: {} (Duration: {}s)", test.kind, test.duration)
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{}:{}", i + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Column ranges of the tabs as drawn by [`render_tabs`].
///
/// Used to map mouse clicks back to views.
pub fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for (i, view) in View::ALL.iter().enumerate() {
        // title, one column of padding on each side, then the divider
        let width = format!("{}:{}", i + 1, view.label()).chars().count() as u16 + 3;
        if column < start + width {
            return Some(*view);
        }
        start += width;
    }
    None
}

/// Render the status bar at the bottom.
///
/// Shows: time since last accepted sample, last cycle error, controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "Tab:view i:instance t:threshold +/-:adjust e:export ?:help q:quit";

    let updated = match app.data.last_updated {
        Some(at) => format!("Updated {} ago", format_elapsed(at.elapsed())),
        None if app.data.loading => "Loading...".to_string(),
        None => "Waiting for data".to_string(),
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", updated),
        Style::default().add_modifier(Modifier::DIM),
    )];
    if let Some(ref err) = app.data.last_error {
        spans.push(Span::styled(
            format!("| Error: {} ", err),
            Style::default().fg(app.theme.alert),
        ));
    }
    spans.push(Span::styled(
        format!("| {}", controls),
        Style::default().add_modifier(Modifier::DIM),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(" Views", bold)]),
        Line::from("  Tab/←/→ h/l  Switch charts"),
        Line::from("  1 2 3        Resources, I/O, Network"),
        Line::from(""),
        Line::from(vec![Span::styled(" Instances", bold)]),
        Line::from("  i ]          Next instance"),
        Line::from("  I [          Previous instance"),
        Line::from(""),
        Line::from(vec![Span::styled(" Thresholds", bold)]),
        Line::from("  T            Show/hide panel"),
        Line::from("  t            Select next threshold"),
        Line::from("  + -          Raise/lower selected"),
        Line::from(""),
        Line::from(vec![Span::styled(" General", bold)]),
        Line::from("  e            Export to JSON"),
        Line::from("  Esc          Close panel"),
        Line::from("  q            Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
