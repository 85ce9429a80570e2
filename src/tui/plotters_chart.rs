//! Plotters-powered time-series chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! X values are day numbers (see `dashboard::date_to_x`); tick labels are
//! formatted back into dates by the caller-supplied formatter.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// High-contrast palette; series `i` uses entry `i % len` in both the chart and the legend.
const PALETTE: [(u8, u8, u8); 6] = [
    (0, 255, 255), // cyan
    (255, 200, 0), // amber
    (0, 255, 0),   // green
    (255, 80, 80), // red
    (200, 120, 255),
    (255, 255, 255),
];

pub fn series_rgb(idx: usize) -> (u8, u8, u8) {
    PALETTE[idx % PALETTE.len()]
}

/// Legend color matching [`series_rgb`].
pub fn series_color(idx: usize) -> Color {
    let (r, g, b) = series_rgb(idx);
    Color::Rgb(r, g, b)
}

/// One line of the chart, already in plot coordinates and sorted by x.
pub struct PlotLine {
    pub points: Vec<(f64, f64)>,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct SeriesChart<'a> {
    pub lines: &'a [PlotLine],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for (idx, line) in self.lines.iter().enumerate() {
                let (r, g, b) = series_rgb(idx);
                let color = RGBColor(r, g, b);

                chart.draw_series(LineSeries::new(line.points.iter().copied(), &color))?;

                // `Circle` radii are mis-scaled by the ratatui backend; a colored
                // `Pixel` marks each observation instead.
                chart.draw_series(line.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
