//! Weekly usage bar chart for one user.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders};
use timewarden_core::DayBar;
use timewarden_core::chart::format_hours;

use crate::theme::Palette;

/// Render a week of usage bars. Weekend bars (and their labels) use
/// the accent color, matching the schedule editor's weekend rows.
pub fn render(frame: &mut Frame, area: Rect, palette: &Palette, bars: &[DayBar]) {
    let block = Block::default()
        .title(Line::styled(" Usage This Week ", palette.title()))
        .borders(Borders::ALL)
        .border_style(palette.border_default());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if bars.is_empty() || inner.height < 3 {
        return;
    }

    let chart_bars: Vec<Bar> = bars
        .iter()
        .map(|bar| {
            let color = if bar.weekend {
                palette.weekend
            } else {
                palette.bar
            };
            Bar::default()
                .value(scaled_minutes(bar.hours))
                .text_value(format_hours(bar.hours))
                .label(Line::styled(bar.label.clone(), Style::default().fg(color)))
                .style(Style::default().fg(color))
        })
        .collect();

    // Bars carry minutes so sub-hour usage still gets visible height.
    let max = bars
        .iter()
        .map(|b| scaled_minutes(b.hours))
        .max()
        .unwrap_or(0)
        .max(60);

    let width = (inner.width.saturating_sub(6) / 7).clamp(3, 9);
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&chart_bars))
        .bar_width(width)
        .bar_gap(1)
        .max(max);
    frame.render_widget(chart, inner);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_minutes(hours: f64) -> u64 {
    (hours.max(0.0) * 60.0).round() as u64
}
