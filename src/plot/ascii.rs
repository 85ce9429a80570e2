//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal (`econ show`)
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - each series: `-` line between consecutive dates
//! - observed points: one marker per series (`o`, `*`, `+`, ...)

use crate::dashboard::{ChartData, date_to_x, x_to_date};

/// Markers assigned to series in order; wraps around past the end.
pub const MARKERS: [char; 6] = ['o', '*', '+', 'x', '#', '@'];

pub fn marker_for(series_idx: usize) -> char {
    MARKERS[series_idx % MARKERS.len()]
}

/// Render every series of `chart` on one grid, followed by a legend.
pub fn render_ascii_chart(chart: &ChartData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let [x_min, x_max] = chart.x_bounds;
    let [y_min, y_max] = chart.y_bounds;

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so markers overlay them.
    for series in &chart.series {
        let mut prev = None;
        for &(date, y) in &series.points {
            let x = map_x(date_to_x(date), x_min, x_max, width);
            let yy = map_y(y, y_min, y_max, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, yy, '-');
            }
            prev = Some((x, yy));
        }
    }
    for (idx, series) in chart.series.iter().enumerate() {
        let marker = marker_for(idx);
        for &(date, y) in &series.points {
            let x = map_x(date_to_x(date), x_min, x_max, width);
            let yy = map_y(y, y_min, y_max, height);
            grid[yy][x] = marker;
        }
    }

    let fmt_date = |x: f64| {
        x_to_date(x)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "?".to_string())
    };

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}..{} | y=[{y_min:.2}, {y_max:.2}]\n",
        fmt_date(x_min),
        fmt_date(x_max)
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (idx, series) in chart.series.iter().enumerate() {
        out.push_str(&format!(
            "  {} {} ({} pts)\n",
            marker_for(idx),
            series.label,
            series.points.len()
        ));
    }

    out
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish); only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
