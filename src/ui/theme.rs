//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::MetricKey;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for bars and labels of breached metrics.
    pub alert: Color,
    /// Color used when nothing is breached.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Per-series bar colors, indexed by [`Theme::metric_color`].
    pub series: [Color; 7],
    /// Style for section headers.
    pub header: Style,
    /// Style for the selected threshold row.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            alert: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            series: [
                Color::LightBlue,
                Color::LightGreen,
                Color::Yellow,
                Color::LightCyan,
                Color::LightMagenta,
                Color::LightBlue,
                Color::LightGreen,
            ],
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            alert: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            series: [
                Color::Blue,
                Color::Green,
                Color::Magenta,
                Color::Cyan,
                Color::Magenta,
                Color::Blue,
                Color::Green,
            ],
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Normal bar color of a metric.
    pub fn metric_color(&self, key: MetricKey) -> Color {
        let index = match key {
            MetricKey::Cpu => 0,
            MetricKey::Memory => 1,
            MetricKey::Disk => 2,
            MetricKey::IoIn => 3,
            MetricKey::IoOut => 4,
            MetricKey::NetworkIn => 5,
            MetricKey::NetworkOut => 6,
        };
        self.series[index]
    }

    /// Bar style for a metric, switching to the alert color when breached.
    pub fn bar_style(&self, key: MetricKey, breached: bool) -> Style {
        if breached {
            Style::default().fg(self.alert).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.metric_color(key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_style_uses_alert_color_when_breached() {
        let theme = Theme::dark();
        assert_eq!(theme.bar_style(MetricKey::Cpu, true).fg, Some(Color::Red));
        assert_eq!(
            theme.bar_style(MetricKey::Disk, false).fg,
            Some(theme.metric_color(MetricKey::Disk))
        );
    }
}
