//! Ratatui-based terminal dashboard.
//!
//! One screen: a sheet selector and an item multi-select on the left, the
//! chart (or a status message) on the right, an optional raw-data panel, and a
//! refresh key that deletes the workbook and re-runs the fetch pipeline.
//!
//! All data decisions live in [`crate::dashboard::DashboardState`]; this module
//! only maps keys to state transitions and draws the current state.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::Pipeline;
use crate::dashboard::{ChartData, DashboardState, RAW_PREVIEW_ROWS, RenderOutcome, SheetView, date_to_x, x_to_date};
use crate::error::{AppError, ErrorKind};

mod plotters_chart;

use plotters_chart::{PlotLine, SeriesChart, series_color};

/// Cell width in the raw-data panel.
const RAW_CELL_WIDTH: usize = 12;

/// Start the dashboard on `path`, fetching first when the workbook is missing.
pub fn run(path: PathBuf, pipeline: Pipeline) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).map_err(|e| terminal_error("Failed to initialize terminal", e))?;

    let mut app = App::new(path, pipeline);
    app.start(&mut terminal)?;
    app.event_loop(&mut terminal)
}

fn terminal_error(context: &str, e: io::Error) -> AppError {
    AppError::new(ErrorKind::Terminal, format!("{context}: {e}"))
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| terminal_error("Failed to enable raw mode", e))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(terminal_error("Failed to enter alternate screen", e));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sheets,
    Items,
}

struct App {
    path: PathBuf,
    pipeline: Pipeline,
    state: DashboardState,
    focus: Focus,
    sheet_cursor: usize,
    item_cursor: usize,
    show_raw: bool,
    status: String,
}

impl App {
    fn new(path: PathBuf, pipeline: Pipeline) -> Self {
        Self {
            path,
            pipeline,
            state: DashboardState::NoData,
            focus: Focus::Sheets,
            sheet_cursor: 0,
            item_cursor: 0,
            show_raw: false,
            status: String::new(),
        }
    }

    fn start<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        if !self.path.is_file() {
            self.status = format!("No workbook at {}; fetching all series...", self.path.display());
            self.redraw(terminal)?;
        }
        self.state = DashboardState::start(&self.path, &mut self.pipeline);
        self.after_load(None);
        Ok(())
    }

    /// Delete the workbook, fetch again, and reload; keeps the sheet by name if it survives.
    fn refresh<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let keep = self.state.view().map(|v| v.name.clone());
        self.status = "Refreshing: workbook deleted, fetching all series...".to_string();
        self.redraw(terminal)?;

        let path = self.path.clone();
        let pipeline = &mut self.pipeline;
        let state = std::mem::replace(&mut self.state, DashboardState::NoData);
        self.state = state.refresh(&path, pipeline);
        self.after_load(keep);
        Ok(())
    }

    fn after_load(&mut self, keep: Option<String>) {
        let Some(loaded) = self.state.workbook() else {
            self.status = match self.state.error() {
                Some(err) => format!("ERROR: {err}"),
                None => "No data.".to_string(),
            };
            return;
        };

        let count = loaded.sheet_names().len();
        let sheet = keep.and_then(|name| loaded.position(&name)).unwrap_or(0);
        self.status = format!("Loaded {count} sheet(s) from {}", loaded.path.display());
        self.select_sheet(sheet);
    }

    fn transition(&mut self, f: impl FnOnce(DashboardState) -> DashboardState) {
        let state = std::mem::replace(&mut self.state, DashboardState::NoData);
        self.state = f(state);
    }

    fn select_sheet(&mut self, idx: usize) {
        self.sheet_cursor = idx;
        self.item_cursor = 0;
        self.transition(|s| s.select(idx, None).render());
    }

    fn set_items(&mut self, items: Vec<String>) {
        self.transition(|s| s.set_items(items).render());
    }

    fn toggle_item(&mut self) {
        let Some(view) = self.state.view() else {
            return;
        };
        let all = view.frame.unique_items();
        let Some(item) = all.get(self.item_cursor) else {
            return;
        };

        let mut selected = view.selected_items.clone();
        match selected.iter().position(|s| s == item) {
            Some(pos) => {
                selected.remove(pos);
            }
            None => selected.push(item.clone()),
        }
        // Keep the sheet's item order regardless of toggle order.
        let ordered: Vec<String> = all.iter().filter(|i| selected.contains(i)).cloned().collect();
        self.set_items(ordered);
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                self.redraw(terminal)?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| terminal_error("Event poll error", e))? {
                continue;
            }

            match event::read().map_err(|e| terminal_error("Event read error", e))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code, terminal)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn redraw<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        terminal
            .draw(|f| self.draw(f))
            .map(|_| ())
            .map_err(|e| terminal_error("Terminal draw error", e))
    }

    fn handle_key<B: Backend>(&mut self, code: KeyCode, terminal: &mut Terminal<B>) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('r') => self.refresh(terminal)?,
            KeyCode::Char('v') => self.show_raw = !self.show_raw,
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                self.focus = match self.focus {
                    Focus::Sheets => Focus::Items,
                    Focus::Items => Focus::Sheets,
                };
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Char(' ') | KeyCode::Enter if self.focus == Focus::Items => self.toggle_item(),
            KeyCode::Char('a') => {
                if let Some(view) = self.state.view() {
                    let all = view.frame.unique_items();
                    self.set_items(all);
                    self.status = "Selected all items.".to_string();
                }
            }
            KeyCode::Char('c') => {
                if self.state.view().is_some() {
                    self.set_items(Vec::new());
                    self.status = "Cleared item selection.".to_string();
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Focus::Sheets => {
                let count = self.state.workbook().map(|w| w.sheet_names().len()).unwrap_or(0);
                if let Some(next) = step(self.sheet_cursor, delta, count) {
                    if next != self.sheet_cursor {
                        self.select_sheet(next);
                    }
                }
            }
            Focus::Items => {
                let count = self.state.view().map(|v| v.frame.unique_items().len()).unwrap_or(0);
                if let Some(next) = step(self.item_cursor, delta, count) {
                    self.item_cursor = next;
                }
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("econ", Style::default().fg(Color::Cyan)),
            Span::raw(" | Korean macro indicators (ECOS, 지표누리, KOSIS)"),
        ]));

        let sheets = self.state.workbook().map(|w| w.sheet_names().len()).unwrap_or(0);
        lines.push(Line::from(Span::styled(
            format!(
                "workbook: {} | sheets: {sheets} | state: {:?}",
                self.path.display(),
                self.state.phase()
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[0]);
        self.draw_sheets(frame, sidebar[0]);
        self.draw_items(frame, sidebar[1]);

        let raw_height = if self.show_raw { RAW_PREVIEW_ROWS as u16 + 4 } else { 0 };
        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2), Constraint::Length(raw_height)])
            .split(columns[1]);
        self.draw_chart(frame, main[0]);
        self.draw_legend(frame, main[1]);
        if self.show_raw {
            self.draw_raw(frame, main[2]);
        }
    }

    fn draw_sheets(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let names = self.state.workbook().map(|w| w.sheet_names()).unwrap_or_default();
        let items: Vec<ListItem> = names.iter().map(|n| ListItem::new(n.to_string())).collect();

        let list = List::new(items)
            .block(focus_block("Sheets", self.focus == Focus::Sheets))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !names.is_empty() {
            state.select(Some(self.sheet_cursor.min(names.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_items(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = focus_block("Items", self.focus == Focus::Items);
        let Some(view) = self.state.view() else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };
        if view.frame.item_col.is_none() {
            let p = Paragraph::new("(no item column; all rows)")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(p, area);
            return;
        }

        let all = view.frame.unique_items();
        let items: Vec<ListItem> = all
            .iter()
            .map(|item| {
                let mark = if view.selected_items.contains(item) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{mark} {item}"))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !all.is_empty() {
            state.select(Some(self.item_cursor.min(all.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self.state.view().map(|v| v.name.clone()).unwrap_or_else(|| "Chart".to_string());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if let Some(err) = self.state.error() {
            let mut text = format!("{} error: {}", err.kind().label(), err.message());
            if !text.contains("Press r") {
                text.push_str("\n\nPress r to retry.");
            }
            draw_message(frame, inner, &text, Color::Red);
            return;
        }

        let Some(view) = self.state.view() else {
            draw_message(frame, inner, "Waiting for data...", Color::Yellow);
            return;
        };

        match self.state.outcome() {
            Some(RenderOutcome::Chart(chart)) => draw_series_chart(frame, inner, view, chart),
            Some(RenderOutcome::NoData) => {
                draw_message(frame, inner, "No data to plot for the current selection.", Color::Yellow);
            }
            Some(RenderOutcome::MissingColumns) => {
                draw_message(
                    frame,
                    inner,
                    "This sheet has no date/value column to plot (expected 시점/날짜 and 지표값/값).",
                    Color::Yellow,
                );
            }
            None => draw_message(frame, inner, "Select a sheet.", Color::Yellow),
        }
    }

    fn draw_legend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(view) = self.state.view() else {
            return;
        };

        let mut legend: Vec<Span> = Vec::new();
        if let Some(RenderOutcome::Chart(chart)) = self.state.outcome() {
            for (idx, series) in chart.series.iter().enumerate() {
                legend.push(Span::styled("■ ", Style::default().fg(series_color(idx))));
                legend.push(Span::raw(format!("{}  ", series.label)));
            }
        }

        let summary = crate::report::format_null_summary(&view.null_summary());
        let lines = vec![
            Line::from(legend),
            Line::from(Span::styled(summary, Style::default().fg(Color::Gray))),
        ];
        frame.render_widget(Paragraph::new(Text::from(lines)), area);
    }

    fn draw_raw(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("Raw data (first {RAW_PREVIEW_ROWS} rows)"))
            .borders(Borders::ALL);
        let text = match self.state.view() {
            Some(view) => crate::report::format_raw_rows(&view.frame.columns, &view.raw_rows(RAW_PREVIEW_ROWS), RAW_CELL_WIDTH),
            None => String::new(),
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ move  Tab focus  Space toggle  a all  c clear  v raw  r refresh  q quit";
        let style = if self.state.error().is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Move `cursor` by `delta` within `0..count`; `None` when the list is empty.
fn step(cursor: usize, delta: isize, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let next = cursor.saturating_add_signed(delta);
    Some(next.min(count - 1))
}

fn focus_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Block::default().title(title).borders(Borders::ALL).border_style(style)
}

fn draw_message(frame: &mut ratatui::Frame<'_>, area: Rect, text: &str, color: Color) {
    let msg = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false });
    frame.render_widget(msg, area);
}

fn draw_series_chart(frame: &mut ratatui::Frame<'_>, inner: Rect, view: &SheetView, chart: &ChartData) {
    let lines = plot_lines(chart);
    let y_label = view.frame.column_name(view.frame.value_col).unwrap_or("value");

    let (chart_rect, insets) = chart_layout(inner);
    let widget = SeriesChart {
        lines: &lines,
        x_bounds: chart.x_bounds,
        y_bounds: chart.y_bounds,
        x_label: "date",
        y_label,
        fmt_x: fmt_axis_date,
        fmt_y: fmt_axis_value,
    };
    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, chart.x_bounds, chart.y_bounds);
    }
}

fn plot_lines(chart: &ChartData) -> Vec<PlotLine> {
    chart
        .series
        .iter()
        .map(|s| PlotLine {
            points: s.points.iter().map(|&(d, y)| (date_to_x(d), y)).collect(),
        })
        .collect()
}

fn fmt_axis_date(v: f64) -> String {
    x_to_date(v).map(|d| d.format("%Y-%m").to_string()).unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

/// Date ticks under the chart and value ticks to its left.
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_axis_date(x_bounds[0] + u * (x_bounds[1] - x_bounds[0]));
        let label_len = label.chars().count() as u16;
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .min((chart.x + chart.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_axis_value(y_bounds[0] + u * (y_bounds[1] - y_bounds[0]));
        let label_len = label.len() as u16;
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("date")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }
}
