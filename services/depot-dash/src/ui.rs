// services/depot-dash/src/ui.rs
//
// Terminal rendering and key handling for the dashboard binary
//

use crossterm::event::{KeyCode, KeyEvent};
use depot_dash::aggregator::ChartDataset;
use depot_dash::chart::{ChartRenderer, ChartShape, ChartStyle, HslColor};
use depot_dash::poller::PollStatus;
use depot_dash::selection::filter_clients;
use depot_dash::state::{DashboardModel, LogLevel};
use ratatui::{prelude::*, widgets::*};
use svckit::metrics::FetchSummary;
use svckit::types::{PendingRequest, RequestKind};

// Color palette: Navy, White, Silver, Amber
mod colors {
    use ratatui::style::Color;

    pub const ACCENT: Color = Color::Rgb(0, 95, 135);
    pub const WHITE: Color = Color::Rgb(253, 246, 227);
    pub const SILVER: Color = Color::Rgb(147, 161, 161);
    pub const AMBER: Color = Color::Rgb(255, 176, 0);
    pub const BG_DARK: Color = Color::Rgb(0, 20, 30);
    pub const BG_PANEL: Color = Color::Rgb(7, 30, 41);
    pub const SUCCESS: Color = Color::Rgb(133, 153, 0);
    pub const ERROR: Color = Color::Rgb(220, 50, 47);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Chart,
    Appointments,
    Trucks,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Chart => Focus::Appointments,
            Focus::Appointments => Focus::Trucks,
            Focus::Trucks => Focus::Chart,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Chart => Focus::Trucks,
            Focus::Appointments => Focus::Chart,
            Focus::Trucks => Focus::Appointments,
        }
    }

    fn request_kind(self) -> Option<RequestKind> {
        match self {
            Focus::Chart => None,
            Focus::Appointments => Some(RequestKind::Appointment),
            Focus::Trucks => Some(RequestKind::Truck),
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    pub focus: Focus,
    pub searching: bool,
    chart_cursor: usize,
    appointment_cursor: usize,
    truck_cursor: usize,
}

impl ViewState {
    fn cursor(&self, focus: Focus) -> usize {
        match focus {
            Focus::Chart => self.chart_cursor,
            Focus::Appointments => self.appointment_cursor,
            Focus::Trucks => self.truck_cursor,
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.focus {
            Focus::Chart => &mut self.chart_cursor,
            Focus::Appointments => &mut self.appointment_cursor,
            Focus::Trucks => &mut self.truck_cursor,
        }
    }

    /// Keeps every cursor inside its (possibly shrunk) list.
    pub fn clamp(&mut self, model: &DashboardModel) {
        let clamp = |cursor: usize, len: usize| cursor.min(len.saturating_sub(1));
        self.chart_cursor = clamp(self.chart_cursor, model.dataset().len());
        self.appointment_cursor = clamp(
            self.appointment_cursor,
            model.visible_requests(RequestKind::Appointment).len(),
        );
        self.truck_cursor = clamp(self.truck_cursor, model.visible_requests(RequestKind::Truck).len());
    }
}

pub enum KeyAction {
    Continue,
    Quit,
}

pub fn handle_key(model: &mut DashboardModel, view: &mut ViewState, key: KeyEvent) -> KeyAction {
    if view.searching {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => view.searching = false,
            KeyCode::Backspace => model.pop_search_char(),
            KeyCode::Char(c) => model.push_search_char(c),
            _ => {}
        }
        view.clamp(model);
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Esc => {
            if model.detail().is_some() {
                model.on_detail_close();
            } else {
                model.clear_search();
            }
        }
        KeyCode::Tab => model.cycle_filter(true),
        KeyCode::BackTab => model.cycle_filter(false),
        KeyCode::Right => view.focus = view.focus.next(),
        KeyCode::Left => view.focus = view.focus.prev(),
        KeyCode::Up => {
            let cursor = view.cursor_mut();
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Down => *view.cursor_mut() += 1,
        KeyCode::Enter => {
            let cursor = view.cursor(view.focus);
            match view.focus.request_kind() {
                None => {
                    let index = (!model.dataset().is_empty()).then_some(cursor);
                    model.on_chart_click(index);
                }
                Some(kind) => {
                    model.on_request_click(kind, Some(cursor));
                }
            }
        }
        KeyCode::Char(' ') => {
            if let Some(kind) = view.focus.request_kind() {
                model.toggle_bulk(kind, view.cursor(view.focus));
            }
        }
        KeyCode::Char('a') => model.select_all_bulk(),
        KeyCode::Char('c') => model.clear_bulk(),
        KeyCode::Char('/') => view.searching = true,
        KeyCode::Char('t') => model.toggle_mode(),
        _ => {}
    }

    view.clamp(model);
    KeyAction::Continue
}

/// Draws a dataset as a legend with proportional bars.
pub struct TuiChart<'a, 'b> {
    frame: &'a mut Frame<'b>,
    area: Rect,
    title: String,
    selected: Option<usize>,
}

impl ChartRenderer for TuiChart<'_, '_> {
    fn render_chart(&mut self, dataset: &ChartDataset, style: ChartStyle) {
        let shape = match style.shape {
            ChartShape::Pie => "PIE".to_string(),
            ChartShape::Ring => format!("RING {}%", style.cutout_percent),
        };
        let block = panel_block(&format!(" {} [{}] ", self.title, shape), self.selected.is_some());

        if dataset.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No data for this view",
                Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
            )))
            .alignment(Alignment::Center)
            .block(block);
            self.frame.render_widget(empty, self.area);
            return;
        }

        let bar_char = match style.shape {
            ChartShape::Pie => "█",
            ChartShape::Ring => "▓",
        };
        let max = dataset.values().iter().copied().max().unwrap_or(0);
        let bar_width = self.area.width.saturating_sub(48).max(4);

        let items: Vec<ListItem> = dataset
            .entries()
            .into_iter()
            .map(|entry| {
                let color = rgb(entry.color);
                let bar_len = bar_length(entry.value, max, bar_width);
                ListItem::new(Line::from(vec![
                    Span::styled("● ", Style::default().fg(color)),
                    Span::styled(
                        format!("{:<22.22}", entry.label),
                        Style::default().fg(colors::WHITE),
                    ),
                    Span::styled(format!("{:>5}", entry.value), Style::default().fg(colors::WHITE).bold()),
                    Span::styled(format!("{:>8} ", entry.percent), Style::default().fg(colors::SILVER)),
                    Span::styled(bar_char.repeat(bar_len), Style::default().fg(color)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(colors::BG_DARK).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");

        let mut state = ListState::default().with_selected(self.selected);
        self.frame.render_stateful_widget(list, self.area, &mut state);
    }
}

/// Share of `width` for `value` against the largest value. Server counts are
/// unbounded, so this stays in floating point.
fn bar_length(value: u64, max: u64, width: u16) -> usize {
    if max == 0 {
        return 0;
    }
    (value as f64 / max as f64 * f64::from(width)).round() as usize
}

fn rgb(color: HslColor) -> Color {
    let (r, g, b) = color.to_rgb();
    Color::Rgb(r, g, b)
}

fn panel_block(title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .title(Span::styled(title.to_string(), Style::default().fg(colors::WHITE).bold()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { colors::AMBER } else { colors::SILVER }))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL))
}

pub fn draw(
    frame: &mut Frame,
    model: &DashboardModel,
    view: &ViewState,
    status: &PollStatus,
    fetches: &FetchSummary,
    source: &str,
    demo_mode: bool,
) {
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(colors::BG_DARK)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(6), // Pending stats
            Constraint::Min(12),   // Chart + lists
            Constraint::Length(3), // Footer
        ])
        .split(area);

    draw_header(frame, chunks[0], model, status, fetches, source, demo_mode);
    draw_stats_panel(frame, chunks[1], model);
    draw_main_content(frame, chunks[2], model, view);
    draw_footer(frame, chunks[3], view, model);

    if model.detail().is_some() {
        draw_detail(frame, area, model);
    }
}

fn draw_header(
    frame: &mut Frame,
    area: Rect,
    model: &DashboardModel,
    status: &PollStatus,
    fetches: &FetchSummary,
    source: &str,
    demo_mode: bool,
) {
    let (mode_text, mode_color) = if demo_mode {
        ("DEMO", colors::AMBER)
    } else if status.is_connected() {
        ("LIVE", colors::SUCCESS)
    } else {
        ("DISCONNECTED", colors::ERROR)
    };

    let updated = status
        .last_success
        .map(|t| format!("updated {}", t.format("%H:%M:%S")))
        .unwrap_or_else(|| "waiting for data".to_string());

    let mut spans = vec![
        Span::styled(
            " DEPOT-DASH ",
            Style::default().fg(colors::WHITE).bg(colors::ACCENT).bold(),
        ),
        Span::raw("  "),
        Span::styled(model.filter_label(), Style::default().fg(colors::AMBER).bold()),
        Span::raw("  "),
        Span::styled(format!("[{}]", mode_text), Style::default().fg(mode_color).bold()),
        Span::raw("  "),
        Span::styled(source.to_string(), Style::default().fg(colors::SILVER)),
        Span::raw("  "),
        Span::styled(updated, Style::default().fg(colors::SILVER)),
    ];
    if let Some(label) = fetch_label(fetches) {
        let color = if fetches.failed > 0 { colors::AMBER } else { colors::SILVER };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(label, Style::default().fg(color)));
    }
    let title = Line::from(spans);

    let header = Paragraph::new(title)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors::ACCENT))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(header, area);
}

/// "fetches 12 ok / 1 failed, avg 85 ms", or nothing before the first fetch.
fn fetch_label(fetches: &FetchSummary) -> Option<String> {
    if fetches.total() == 0 {
        return None;
    }
    Some(format!(
        "fetches {} ok / {} failed, avg {:.0} ms",
        fetches.succeeded,
        fetches.failed,
        fetches.mean_seconds * 1000.0
    ))
}

fn draw_stats_panel(frame: &mut Frame, area: Rect, model: &DashboardModel) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let stats = model.pending_stats();

    draw_stat_box(frame, chunks[0], "TOTAL PENDING", &stats.total.to_string(), "", colors::WHITE);
    draw_stat_box(
        frame,
        chunks[1],
        "APPOINTMENTS",
        &stats.appointments.to_string(),
        &stats.appointment_share,
        colors::AMBER,
    );
    draw_stat_box(
        frame,
        chunks[2],
        "TRUCKS",
        &stats.trucks.to_string(),
        &stats.truck_share,
        colors::AMBER,
    );
    draw_stat_box(
        frame,
        chunks[3],
        "BRANCHES / CLIENTS",
        &format!("{} / {}", model.branches().len(), model.clients().len()),
        "",
        colors::SUCCESS,
    );
}

fn draw_stat_box(frame: &mut Frame, area: Rect, label: &str, value: &str, share: &str, value_color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SILVER))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(value_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(share.to_string(), Style::default().fg(colors::SILVER))),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn draw_main_content(frame: &mut Frame, area: Rect, model: &DashboardModel, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(chunks[1]);

    let selected = (view.focus == Focus::Chart && !model.dataset().is_empty())
        .then(|| view.cursor(Focus::Chart));
    let mut chart = TuiChart {
        frame: &mut *frame,
        area: chunks[0],
        title: format!("CLIENT DISTRIBUTION · {}", model.filter_label().to_uppercase()),
        selected,
    };
    model.render(&mut chart);

    draw_request_list(frame, right[0], model, view, RequestKind::Appointment);
    draw_request_list(frame, right[1], model, view, RequestKind::Truck);
    draw_activity_panel(frame, right[2], model);
}

fn draw_request_list(
    frame: &mut Frame,
    area: Rect,
    model: &DashboardModel,
    view: &ViewState,
    kind: RequestKind,
) {
    let focus = match kind {
        RequestKind::Appointment => Focus::Appointments,
        RequestKind::Truck => Focus::Trucks,
    };
    let focused = view.focus == focus;
    let rows: Vec<&PendingRequest> = model.visible_requests(kind);

    let mut title = format!(" RECENT {}S ({}) ", kind.label().to_uppercase(), rows.len());
    if !model.selection().search().is_empty() {
        title.push_str(&format!("/{} ", model.selection().search()));
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|request| {
            let mark = if model.selection().is_bulk_selected(kind, request.id) { "[x]" } else { "[ ]" };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", mark), Style::default().fg(colors::AMBER)),
                Span::styled(format!("#{:<6}", request.id), Style::default().fg(colors::SILVER)),
                Span::styled(request.display_name(), Style::default().fg(colors::WHITE)),
                Span::styled(
                    format!("  {}", request.status.as_deref().unwrap_or("")),
                    Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(panel_block(&title, focused))
        .highlight_style(Style::default().bg(colors::BG_DARK).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    let selected = (focused && !rows.is_empty()).then(|| view.cursor(focus));
    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_activity_panel(frame: &mut Frame, area: Rect, model: &DashboardModel) {
    let logs: Vec<Line> = model
        .activity_log
        .iter()
        .rev()
        .take(20)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Error => colors::ERROR,
                LogLevel::Warn => colors::AMBER,
                LogLevel::Info => colors::SUCCESS,
            };

            Line::from(vec![
                Span::styled(
                    format!("{} ", entry.timestamp.format("%H:%M:%S")),
                    Style::default().fg(colors::SILVER).add_modifier(Modifier::DIM),
                ),
                Span::styled(format!("{:<5} ", entry.level.as_str()), Style::default().fg(color)),
                Span::styled(entry.message.clone(), Style::default().fg(colors::WHITE)),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(logs)
        .block(panel_block(" ACTIVITY LOG ", false))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_detail(frame: &mut Frame, area: Rect, model: &DashboardModel) {
    let Some(detail) = model.detail() else {
        return;
    };
    let popup = centered_rect(70, 70, area);

    let heading = Style::default().fg(colors::AMBER).bold();
    let body = Style::default().fg(colors::WHITE);
    let muted = Style::default().fg(colors::SILVER);

    let mut lines: Vec<Line> = Vec::new();

    // Branch and client details; a request detail only lists the request.
    if detail.requests.is_empty() {
        let clients = filter_clients(&detail.clients, model.selection().search());
        lines.push(Line::from(Span::styled(format!("Clients ({})", clients.len()), heading)));
        if clients.is_empty() {
            lines.push(Line::from(Span::styled("  none", muted)));
        }
        for client in clients {
            lines.push(Line::from(vec![
                Span::styled(format!("  #{:<6}", client.id), muted),
                Span::styled(client.name.clone(), body),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("Trucks ({})", detail.trucks.len()), heading)));
        if detail.trucks.is_empty() {
            lines.push(Line::from(Span::styled("  none", muted)));
        }
        for truck in &detail.trucks {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<12}", truck.plate_number), body),
                Span::styled(truck.extra_str("driver_name").unwrap_or("").to_string(), muted),
            ]));
        }
    }

    for request in &detail.requests {
        lines.push(Line::from(Span::styled(format!("Request #{}", request.id), heading)));
        lines.push(Line::from(vec![Span::styled("  Name     ", muted), Span::styled(request.display_name(), body)]));
        if let Some(status) = &request.status {
            lines.push(Line::from(vec![Span::styled("  Status   ", muted), Span::styled(status.clone(), body)]));
        }
        if let Some(created) = &request.created_at {
            lines.push(Line::from(vec![Span::styled("  Created  ", muted), Span::styled(created.clone(), body)]));
        }
        for (key, value) in &request.extra {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<9}", key), muted),
                Span::styled(value.to_string().trim_matches('"').to_string(), body),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(panel_block(&format!(" {} · [ESC] close ", detail.title), true))
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

fn draw_footer(frame: &mut Frame, area: Rect, view: &ViewState, model: &DashboardModel) {
    let help = if view.searching {
        Line::from(vec![
            Span::styled(" SEARCH ", Style::default().fg(colors::BG_DARK).bg(colors::AMBER)),
            Span::styled(format!(" {}█ ", model.selection().search()), Style::default().fg(colors::WHITE)),
            Span::styled(" [ENTER] done ", Style::default().fg(colors::SILVER)),
        ])
    } else {
        Line::from(vec![
            Span::styled(" [Q] ", Style::default().fg(colors::BG_DARK).bg(colors::ERROR)),
            Span::styled(" Quit ", Style::default().fg(colors::SILVER)),
            Span::raw(" "),
            Span::styled(" [TAB] ", Style::default().fg(colors::BG_DARK).bg(colors::AMBER)),
            Span::styled(" Branch ", Style::default().fg(colors::SILVER)),
            Span::raw(" "),
            Span::styled(" [←/→] ", Style::default().fg(colors::BG_DARK).bg(colors::SILVER)),
            Span::styled(" Panel ", Style::default().fg(colors::SILVER)),
            Span::raw(" "),
            Span::styled(" [ENTER] ", Style::default().fg(colors::BG_DARK).bg(colors::WHITE)),
            Span::styled(" Details ", Style::default().fg(colors::SILVER)),
            Span::raw(" "),
            Span::styled(" [SPACE] ", Style::default().fg(colors::BG_DARK).bg(colors::SILVER)),
            Span::styled(
                format!(" Select ({}) ", model.selection().bulk_selected().len()),
                Style::default().fg(colors::SILVER),
            ),
            Span::raw(" "),
            Span::styled(" [/] ", Style::default().fg(colors::BG_DARK).bg(colors::SILVER)),
            Span::styled(" Search ", Style::default().fg(colors::SILVER)),
            Span::raw(" "),
            Span::styled(" [T] ", Style::default().fg(colors::BG_DARK).bg(colors::SILVER)),
            Span::styled(" Theme ", Style::default().fg(colors::SILVER)),
        ])
    };

    let footer = Paragraph::new(help)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors::ACCENT))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(footer, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use depot_dash::poller::DirectoryUpdate;
    use depot_dash::selection::BranchFilter;
    use svckit::types::{Branch, Client};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn model() -> DashboardModel {
        let mut model = DashboardModel::default();
        model.apply_directory(DirectoryUpdate {
            branches: Some(vec![
                Branch { id: 1, name: "Marilao".to_string(), client_count: 5 },
                Branch { id: 2, name: "Taguig".to_string(), client_count: 2 },
            ]),
            clients: Some(vec![Client { id: 10, name: "Acme Freight".to_string(), branch_id: Some(2) }]),
            trucks: Some(vec![]),
        });
        model
    }

    #[test]
    fn test_enter_drills_into_highlighted_slice() {
        let mut model = model();
        let mut view = ViewState::default();

        handle_key(&mut model, &mut view, key(KeyCode::Down));
        handle_key(&mut model, &mut view, key(KeyCode::Enter));
        assert_eq!(model.detail().unwrap().title, "Taguig");

        handle_key(&mut model, &mut view, key(KeyCode::Esc));
        assert!(model.detail().is_none());
    }

    #[test]
    fn test_tab_changes_filter_and_clamps_cursor() {
        let mut model = model();
        let mut view = ViewState::default();

        handle_key(&mut model, &mut view, key(KeyCode::Down));
        handle_key(&mut model, &mut view, key(KeyCode::Tab));
        handle_key(&mut model, &mut view, key(KeyCode::Tab));
        assert_eq!(model.selection().active_branch(), BranchFilter::Branch(2));
        assert_eq!(view.cursor(Focus::Chart), 0);
    }

    #[test]
    fn test_search_mode_captures_keys() {
        let mut model = model();
        let mut view = ViewState::default();

        handle_key(&mut model, &mut view, key(KeyCode::Char('/')));
        assert!(view.searching);
        handle_key(&mut model, &mut view, key(KeyCode::Char('q')));
        assert!(matches!(
            handle_key(&mut model, &mut view, key(KeyCode::Enter)),
            KeyAction::Continue
        ));
        assert_eq!(model.selection().search(), "q");
        assert!(matches!(
            handle_key(&mut model, &mut view, key(KeyCode::Char('q'))),
            KeyAction::Quit
        ));
    }

    #[test]
    fn test_bar_length_handles_huge_counts() {
        assert_eq!(bar_length(5, 10, 20), 10);
        assert_eq!(bar_length(0, 0, 20), 0);
        assert_eq!(bar_length(u64::MAX, u64::MAX, 30), 30);
        assert_eq!(bar_length(u64::MAX / 2, u64::MAX, 30), 15);
    }

    #[test]
    fn test_fetch_label() {
        assert_eq!(fetch_label(&FetchSummary::default()), None);
        let fetches = FetchSummary { succeeded: 12, failed: 1, mean_seconds: 0.085 };
        assert_eq!(
            fetch_label(&fetches).as_deref(),
            Some("fetches 12 ok / 1 failed, avg 85 ms")
        );
    }

    #[test]
    fn test_enter_on_empty_chart_is_noop() {
        let mut model = DashboardModel::default();
        let mut view = ViewState::default();
        handle_key(&mut model, &mut view, key(KeyCode::Enter));
        assert!(model.detail().is_none());
    }
}
