//! Bar chart views.
//!
//! Each view draws one bar group per retained snapshot, labelled with the
//! snapshot time. Bars whose value exceeds its threshold are drawn in the
//! theme's alert color, using the thresholds as they are right now.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, View};
use crate::data::thresholds::breaches;
use crate::data::{MetricKey, MonitorState, ThresholdField};

/// Bar values are integers; floats are scaled by this factor first.
const VALUE_SCALE: f64 = 100.0;

/// Width reserved for the threshold panel.
const THRESHOLD_PANEL_WIDTH: u16 = 30;

pub const NO_DATA_MESSAGE: &str = "No data available. Check API.";
pub const LOADING_MESSAGE: &str = "Loading metrics...";

/// One bar of a group: which metric and its value.
type Reading = (MetricKey, f64);

/// Render the chart for the current view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (chart_area, panel_area) = if app.show_thresholds {
        let chunks = Layout::horizontal([
            Constraint::Min(20),
            Constraint::Length(THRESHOLD_PANEL_WIDTH),
        ])
        .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    render_chart(frame, app, chart_area);

    if let Some(panel_area) = panel_area {
        render_threshold_panel(frame, app, panel_area);
    }
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.current_view;
    let block = Block::default()
        .title(chart_title(app, view))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if let Some(message) = empty_message(&app.data) {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let y = inner.y + inner.height / 2;
        let line_area = Rect::new(inner.x, y, inner.width, 1.min(inner.height));
        let paragraph = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, line_area);
        return;
    }

    let thresholds = app.threshold_config();
    let (groups, ceiling) = readings(app, view);
    let bars_per_group = groups.first().map_or(1, |(_, bars)| bars.len());

    let inner_width = area.width.saturating_sub(2);
    let width = bar_width(inner_width, groups.len(), bars_per_group);

    let chart = groups.iter().fold(
        BarChart::default()
            .block(block)
            .bar_width(width)
            .bar_gap(0)
            .group_gap(1)
            .max(axis_max(ceiling)),
        |chart, (time, bars)| {
            let bars: Vec<Bar> = bars
                .iter()
                .map(|&(key, value)| {
                    let breached = breaches(key, value, &thresholds);
                    Bar::default()
                        .value(scale(value))
                        .text_value(format_value(key, value))
                        .style(app.theme.bar_style(key, breached))
                        .value_style(Style::default().add_modifier(Modifier::REVERSED))
                })
                .collect();
            chart.data(BarGroup::default().label(Line::from(time.clone())).bars(&bars))
        },
    );

    frame.render_widget(chart, area);
}

/// Title line with the view name and a colored legend.
fn chart_title(app: &App, view: View) -> Line<'static> {
    let mut spans = vec![Span::styled(format!(" {} ", view.label()), app.theme.header)];
    for key in metrics(view) {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "■ ",
            Style::default().fg(app.theme.metric_color(key)),
        ));
        spans.push(Span::raw(key.label()));
    }
    spans.push(Span::raw(" "));
    Line::from(spans)
}

/// Metrics drawn by a view, in bar order.
pub fn metrics(view: View) -> Vec<MetricKey> {
    match view {
        View::Resources => vec![MetricKey::Cpu, MetricKey::Memory, MetricKey::Disk],
        View::Io => vec![MetricKey::IoIn, MetricKey::IoOut],
        View::Network => vec![MetricKey::NetworkIn, MetricKey::NetworkOut],
    }
}

/// Bar groups for `view` plus the axis ceiling.
fn readings(app: &App, view: View) -> (Vec<(String, Vec<Reading>)>, f64) {
    let series = app.series();
    match view {
        View::Resources => (
            series
                .resources
                .iter()
                .map(|p| {
                    (
                        p.time.clone(),
                        vec![
                            (MetricKey::Cpu, p.cpu),
                            (MetricKey::Memory, p.memory),
                            (MetricKey::Disk, p.disk),
                        ],
                    )
                })
                .collect(),
            series.resource_ceiling,
        ),
        View::Io => (
            series
                .io
                .iter()
                .map(|p| {
                    (
                        p.time.clone(),
                        vec![(MetricKey::IoIn, p.io_in), (MetricKey::IoOut, p.io_out)],
                    )
                })
                .collect(),
            series.io_ceiling,
        ),
        View::Network => (
            series
                .network
                .iter()
                .map(|p| {
                    (
                        p.time.clone(),
                        vec![
                            (MetricKey::NetworkIn, p.network_in as f64),
                            (MetricKey::NetworkOut, p.network_out as f64),
                        ],
                    )
                })
                .collect(),
            series.network_ceiling,
        ),
    }
}

/// Side panel listing thresholds; the selected one is adjustable with +/-.
fn render_threshold_panel(frame: &mut Frame, app: &App, area: Rect) {
    let config = app.threshold_config();
    let mut lines = vec![Line::from("")];
    for field in ThresholdField::ALL {
        let selected = field == app.selected_threshold;
        let text = format!(
            "{} {:<12}{:>8}",
            if selected { "▶" } else { " " },
            field.label(),
            field.get(&config)
        );
        let style = if selected {
            app.theme.selected
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " t:next  +/-:adjust",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Thresholds ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Message to show instead of a chart, if the window is empty.
pub fn empty_message(state: &MonitorState) -> Option<&'static str> {
    if state.has_data() {
        None
    } else if state.loading {
        Some(LOADING_MESSAGE)
    } else {
        Some(NO_DATA_MESSAGE)
    }
}

/// Convert a metric value to an integer bar height.
fn scale(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        (value * VALUE_SCALE).round() as u64
    } else {
        0
    }
}

/// Scaled axis maximum; never zero, which BarChart treats as "auto".
fn axis_max(ceiling: f64) -> u64 {
    scale(ceiling).max(1)
}

/// Widest bar that still fits every group on screen.
fn bar_width(available: u16, groups: usize, bars_per_group: usize) -> u16 {
    if groups == 0 || bars_per_group == 0 {
        return 1;
    }
    let per_group = (available as usize / groups).saturating_sub(1);
    (per_group / bars_per_group).clamp(1, 9) as u16
}

fn format_value(key: MetricKey, value: f64) -> String {
    match key {
        MetricKey::Cpu | MetricKey::Memory | MetricKey::Disk => format!("{:.0}", value),
        MetricKey::IoIn | MetricKey::IoOut => format!("{:.1}", value),
        MetricKey::NetworkIn | MetricKey::NetworkOut => format!("{}", value as u64),
    }
}
