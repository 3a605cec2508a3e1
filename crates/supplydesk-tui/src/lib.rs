// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::time::Duration;
use supplydesk_app::{
    AppCommand, AppEvent, AppState, DashboardCounts, Desk, PromptKind, Recommendation, ScreenKind,
};
use supplydesk_grid::{
    Align, FormatContext, HeaderCell, TableCommand, TableEvent, TableProjection,
};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

const SELECTED_MARK: &str = "✓";
const EXPANDED_MARK: &str = "▾";
const MAX_COLUMN_WIDTH: usize = 36;
const DETAIL_PAIRS_PER_LINE: usize = 3;
const MAX_DETAIL_HEIGHT: u16 = 12;

/// Supplies data and side effects to the event loop.
pub trait AppRuntime {
    fn load_desk(&mut self) -> Result<Desk>;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    /// Called when a row is activated with enter. Returns the status text.
    fn activate(&mut self, _screen: ScreenKind, id: &str) -> Result<String> {
        Ok(format!("opened {id}"))
    }
}

/// Colors and spacing for the renderer. Grid logic never sees this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub header: Color,
    pub selected: Color,
    pub muted: Color,
    pub empty: Color,
    pub column_spacing: u16,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            header: Color::White,
            selected: Color::DarkGray,
            muted: Color::Gray,
            empty: Color::Yellow,
            column_spacing: 1,
        }
    }
}

pub fn parse_color(value: &str) -> Result<Color> {
    value.trim().parse::<Color>().map_err(|_| {
        anyhow!("unknown color {value:?}; use a name like \"cyan\" or a hex value like \"#00aaff\"")
    })
}

pub struct ViewData {
    desk: Desk,
    theme: Theme,
    now: OffsetDateTime,
}

impl ViewData {
    pub fn new(desk: Desk, theme: Theme, now: OffsetDateTime) -> Self {
        Self { desk, theme, now }
    }

    pub fn desk(&self) -> &Desk {
        &self.desk
    }

    fn projection(&self, screen: ScreenKind) -> TableProjection {
        self.desk
            .table(screen)
            .project(&FormatContext::new(self.now))
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R, theme: Theme) -> Result<()> {
    let desk = runtime.load_desk().context("load desk data")?;
    let mut view_data = ViewData::new(desk, theme, runtime.now());

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    info!(screen = state.active_screen.as_str(), "terminal ui started");

    let mut result = Ok(());
    loop {
        view_data.now = runtime.now();
        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if handle_key_event(state, runtime, &mut view_data, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("terminal ui stopped");
    result
}

/// Returns true when the app should exit.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return true;
    }

    if state.prompt.is_some() {
        handle_prompt_key(state, runtime, view_data, key);
        return false;
    }

    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            state.dispatch(AppCommand::ToggleHelp);
        }
        return false;
    }

    let app_command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => Some(AppCommand::NextScreen),
        KeyCode::BackTab => Some(AppCommand::PrevScreen),
        KeyCode::Char(digit @ '1'..='4') => {
            let index = usize::from(digit as u8 - b'1');
            Some(AppCommand::GoToScreen(ScreenKind::ALL[index]))
        }
        KeyCode::Char('?') => Some(AppCommand::ToggleHelp),
        KeyCode::Char('/') => Some(AppCommand::OpenPrompt {
            kind: PromptKind::Query,
            initial: view_data
                .desk
                .table(state.active_screen)
                .filters()
                .query()
                .to_owned(),
        }),
        KeyCode::Char('w') => Some(AppCommand::OpenPrompt {
            kind: PromptKind::SaveView,
            initial: String::new(),
        }),
        KeyCode::Esc => Some(AppCommand::ClearStatus),
        _ => None,
    };

    if let Some(command) = app_command {
        let events = state.dispatch(command);
        apply_app_events(state, runtime, view_data, events);
    } else if let Some(command) = table_command_for_key(key) {
        apply_table_command(state, runtime, view_data, command);
    }
    false
}

fn handle_prompt_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Esc => AppCommand::CancelPrompt,
        KeyCode::Enter => AppCommand::SubmitPrompt,
        KeyCode::Backspace => AppCommand::PromptBackspace,
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            AppCommand::PromptInput(ch)
        }
        _ => return,
    };
    let events = state.dispatch(command);
    apply_app_events(state, runtime, view_data, events);
}

fn apply_app_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    events: Vec<AppEvent>,
) {
    for event in events {
        match event {
            AppEvent::ScreenChanged(screen) => {
                debug!(screen = screen.as_str(), "screen changed");
            }
            AppEvent::PromptSubmitted { kind, input } => {
                let command = match kind {
                    PromptKind::Query => TableCommand::SetQuery(input),
                    PromptKind::SaveView => TableCommand::SaveView(input),
                };
                apply_table_command(state, runtime, view_data, command);
            }
            AppEvent::HelpToggled(_)
            | AppEvent::PromptOpened(_)
            | AppEvent::PromptEdited { .. }
            | AppEvent::PromptCancelled(_)
            | AppEvent::StatusUpdated(_)
            | AppEvent::StatusCleared => {}
        }
    }
}

fn apply_table_command<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: TableCommand,
) {
    let screen = state.active_screen;
    let events = view_data.desk.table_mut(screen).dispatch(command);
    debug!(
        screen = screen.as_str(),
        events = events.len(),
        "table command applied"
    );

    let mut status = None;
    for event in &events {
        match event {
            TableEvent::RowSelected(id) => match runtime.activate(screen, id) {
                Ok(message) => status = Some(message),
                Err(error) => {
                    warn!(id = %id, error = %error, "row activation failed");
                    status = Some(format!("open failed: {error}"));
                }
            },
            other => {
                if let Some(message) = other.message() {
                    status = Some(message);
                }
            }
        }
    }
    if let Some(message) = status {
        state.dispatch(AppCommand::ShowStatus(message));
    }
}

fn table_command_for_key(key: KeyEvent) -> Option<TableCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some(TableCommand::MoveRow(1)),
        KeyCode::Char('k') | KeyCode::Up => Some(TableCommand::MoveRow(-1)),
        KeyCode::Char('h') | KeyCode::Left => Some(TableCommand::MoveColumn(-1)),
        KeyCode::Char('l') | KeyCode::Right => Some(TableCommand::MoveColumn(1)),
        KeyCode::Char('g') | KeyCode::Home => Some(TableCommand::JumpFirstRow),
        KeyCode::Char('G') | KeyCode::End => Some(TableCommand::JumpLastRow),
        KeyCode::Char('s') => Some(TableCommand::SortCurrentColumn),
        KeyCode::Char('n') | KeyCode::PageDown => Some(TableCommand::NextPage),
        KeyCode::Char('p') | KeyCode::PageUp => Some(TableCommand::PrevPage),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(TableCommand::StepPageSize(1)),
        KeyCode::Char('-') => Some(TableCommand::StepPageSize(-1)),
        KeyCode::Char(' ') => Some(TableCommand::ToggleSelectCurrent),
        KeyCode::Char('a') => Some(TableCommand::SelectAll),
        KeyCode::Char('A') => Some(TableCommand::ClearSelection),
        KeyCode::Enter => Some(TableCommand::ActivateCurrent),
        KeyCode::Char('e') => Some(TableCommand::ToggleExpandCurrent),
        KeyCode::Char('f') => Some(TableCommand::FilterCurrentCell),
        KeyCode::Char('F') => Some(TableCommand::ClearFilters),
        KeyCode::Char('c') => Some(TableCommand::HideCurrentColumn),
        KeyCode::Char('C') => Some(TableCommand::ShowAllColumns),
        KeyCode::Char('v') => Some(TableCommand::CycleView(1)),
        KeyCode::Char('V') => Some(TableCommand::CycleView(-1)),
        KeyCode::Char('x') => Some(TableCommand::DeleteCurrentView),
        _ => None,
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let theme = view_data.theme;
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ScreenKind::ALL
        .iter()
        .position(|screen| *screen == state.active_screen)
        .unwrap_or(0);
    let titles = ScreenKind::ALL
        .iter()
        .map(|screen| tab_title(*screen, &view_data.desk))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("supplydesk").borders(Borders::ALL))
        .style(Style::default().fg(theme.header))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let counts = Paragraph::new(render_counts_text(view_data.desk.counts()))
        .style(Style::default().fg(theme.muted));
    frame.render_widget(counts, layout[1]);

    let projection = view_data.projection(state.active_screen);
    let mut panels = Vec::new();
    if let Some(detail) = render_detail_text(&projection) {
        panels.push(("details", detail));
    }
    if state.active_screen == ScreenKind::Inventory
        && let Some(insights) = render_insights_text(&view_data.desk.recommendations())
    {
        panels.push(("insights", insights));
    }

    let mut constraints = vec![Constraint::Min(5)];
    constraints.extend(panels.iter().map(|(_, text)| {
        Constraint::Length((text.lines().count() as u16 + 2).min(MAX_DETAIL_HEIGHT))
    }));
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(layout[2]);
    render_table(frame, body[0], &projection, &theme);
    for ((title, text), area) in panels.into_iter().zip(body.iter().skip(1)) {
        let panel = Paragraph::new(text).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .style(Style::default().fg(theme.muted)),
        );
        frame.render_widget(panel, *area);
    }

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(theme.empty))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if state.show_help {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    projection: &TableProjection,
    theme: &Theme,
) {
    let block = Block::default()
        .title(table_title(projection))
        .borders(Borders::ALL);

    if let Some(message) = &projection.empty_message {
        let empty = Paragraph::new(message.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.empty))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let widths = column_widths(projection);
    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(widths.iter().map(|width| Constraint::Length(*width as u16)));

    let mut header_cells = vec![Cell::from("")];
    header_cells.extend(projection.headers.iter().map(|header| {
        Cell::from(Line::from(header_label(header)).alignment(alignment(header.align))).style(
            Style::default()
                .fg(theme.header)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = projection.rows.iter().enumerate().map(|(row_index, row)| {
        let on_cursor = row_index == projection.cursor_row;
        let mark = if row.selected {
            SELECTED_MARK
        } else if row.expanded {
            EXPANDED_MARK
        } else {
            ""
        };
        let mut cells = vec![Cell::from(mark).style(Style::default().fg(theme.accent))];
        cells.extend(row.cells.iter().enumerate().map(|(column_index, text)| {
            let align = projection
                .headers
                .get(column_index)
                .map_or(Align::Left, |header| header.align);
            let mut style = Style::default();
            if on_cursor {
                style = style.bg(theme.selected);
            }
            if on_cursor && column_index == projection.cursor_column {
                style = Style::default()
                    .fg(Color::Black)
                    .bg(theme.accent)
                    .add_modifier(Modifier::BOLD);
            }
            Cell::from(Line::from(text.as_str()).alignment(alignment(align))).style(style)
        }));
        Row::new(cells)
    });

    let table = Table::new(rows, constraints)
        .header(Row::new(header_cells))
        .column_spacing(theme.column_spacing)
        .block(block);
    frame.render_widget(table, area);
}

fn alignment(align: Align) -> Alignment {
    match align {
        Align::Left => Alignment::Left,
        Align::Center => Alignment::Center,
        Align::Right => Alignment::Right,
    }
}

fn tab_title(screen: ScreenKind, desk: &Desk) -> String {
    let table = desk.table(screen);
    if table.matching() == table.total() {
        format!("{} {}", screen.label(), table.total())
    } else {
        format!("{} {}/{}", screen.label(), table.matching(), table.total())
    }
}

fn render_counts_text(counts: DashboardCounts) -> String {
    format!(
        " critical alerts {} | overdue payments {} | low stock {} | suppliers needing attention {}",
        counts.critical_alerts,
        counts.overdue_payments,
        counts.low_stock_items,
        counts.suppliers_needing_attention,
    )
}

fn header_label(header: &HeaderCell) -> String {
    match header.sorted {
        Some(direction) => format!("{} {}", header.label, direction.arrow()),
        None => header.label.clone(),
    }
}

fn table_title(projection: &TableProjection) -> String {
    let mut parts = Vec::new();
    if let Some(view) = &projection.view_name {
        parts.push(view.clone());
    }
    parts.push(projection.range_label());
    parts.push(format!(
        "page {}/{}",
        projection.page.page + 1,
        projection.page_count.max(1)
    ));
    if projection.active_filters > 0 {
        parts.push(format!("{} filters", projection.active_filters));
    }
    if !projection.query.is_empty() {
        parts.push(format!("/{}", projection.query));
    }
    if projection.selected > 0 {
        parts.push(format!("{} selected", projection.selected));
    }
    parts.join(" | ")
}

fn render_detail_text(projection: &TableProjection) -> Option<String> {
    let mut lines = Vec::new();
    for row in projection.rows.iter().filter(|row| row.expanded) {
        lines.push(row.id.clone());
        for chunk in row.detail.chunks(DETAIL_PAIRS_PER_LINE) {
            let pairs = chunk
                .iter()
                .map(|(label, value)| format!("{label}: {value}"))
                .collect::<Vec<_>>();
            lines.push(format!("  {}", pairs.join("    ")));
        }
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn render_insights_text(recommendations: &[Recommendation]) -> Option<String> {
    let lines = recommendations
        .iter()
        .map(|rec| format!("{} -> {}", rec.summary(), rec.kind.suggested_action()))
        .collect::<Vec<_>>();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn status_text(state: &AppState) -> String {
    if let Some(prompt) = &state.prompt {
        return format!("{}: {}_  (enter apply, esc cancel)", prompt.kind.label(), prompt.input);
    }
    let hints = "j/k/h/l move | s sort | n/p page | space/a select | e expand | f/F filter | / search | v/w/x views | ? help | q quit";
    match &state.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "screens: tab/shift+tab next/prev | 1-4 jump\n\
move: j/k rows | h/l columns | g/G first/last row\n\
sort: s sort by cursor column (again to reverse)\n\
pages: n/p next/prev | +/- page size\n\
select: space toggle | a all matching | A clear | enter open\n\
expand: e toggle details\n\
filter: f filter on cursor cell | F clear filters | / search\n\
columns: c hide cursor column | C show all\n\
views: v/V next/prev | w save as | x delete current\n\
quit: q or ctrl+c | ? close help"
}

fn column_widths(projection: &TableProjection) -> Vec<usize> {
    projection
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let cells = projection
                .rows
                .iter()
                .filter_map(|row| row.cells.get(index))
                .map(|cell| cell.chars().count());
            cells
                .chain(std::iter::once(header_label(header).chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let len = text.chars().count();
    if len > width {
        let mut truncated = text.chars().take(width.saturating_sub(1)).collect::<String>();
        truncated.push('…');
        return truncated;
    }
    let gap = width - len;
    match align {
        Align::Left => format!("{text}{}", " ".repeat(gap)),
        Align::Right => format!("{}{text}", " ".repeat(gap)),
        Align::Center => {
            let left = gap / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(gap - left))
        }
    }
}

/// One page as aligned plain text, for non-interactive output.
pub fn plain_table_text(projection: &TableProjection, column_spacing: u16) -> String {
    let widths = column_widths(projection);
    let gap = " ".repeat(usize::from(column_spacing.max(1)));
    let line = |cells: Vec<String>| cells.join(gap.as_str()).trim_end().to_owned();

    let mut out = Vec::new();
    if let Some(view) = &projection.view_name {
        out.push(format!("{view} ({})", projection.range_label()));
    } else {
        out.push(projection.range_label());
    }
    out.push(line(
        projection
            .headers
            .iter()
            .zip(&widths)
            .map(|(header, width)| pad(&header_label(header), *width, header.align))
            .collect(),
    ));
    out.push(line(widths.iter().map(|width| "-".repeat(*width)).collect()));

    match &projection.empty_message {
        Some(message) => out.push(message.clone()),
        None => {
            for row in &projection.rows {
                out.push(line(
                    row.cells
                        .iter()
                        .zip(&projection.headers)
                        .zip(&widths)
                        .map(|((cell, header), width)| pad(cell, *width, header.align))
                        .collect(),
                ));
            }
        }
    }
    out.push(format!(
        "page {}/{}",
        projection.page.page + 1,
        projection.page_count.max(1)
    ));
    out.join("\n") + "\n"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, Theme, ViewData, column_widths, handle_key_event, header_label,
        help_overlay_text, parse_color, plain_table_text, render_counts_text, render_detail_text,
        render_insights_text, status_text, table_command_for_key, table_title,
    };
    use anyhow::Result;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::style::Color;
    use supplydesk_app::{
        AppState, DashboardCounts, Desk, DeskData, PromptKind, RECOMMENDATION_LIMIT, ScreenKind,
        ScreenOptions,
    };
    use supplydesk_grid::{Align, FormatContext, HeaderCell, SortDirection, TableCommand};
    use supplydesk_testkit::{ProcurementFaker, RecordCounts, reference_now};
    use time::OffsetDateTime;

    #[derive(Debug, Default)]
    struct TestRuntime {
        activated: Vec<String>,
    }

    impl AppRuntime for TestRuntime {
        fn load_desk(&mut self) -> Result<Desk> {
            let data = ProcurementFaker::new(7).desk_data(RecordCounts::default());
            Desk::new(data, &ScreenOptions::default(), reference_now().date())
        }

        fn now(&self) -> OffsetDateTime {
            reference_now()
        }

        fn activate(&mut self, _screen: ScreenKind, id: &str) -> Result<String> {
            self.activated.push(id.to_owned());
            Ok(format!("opened {id}"))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn setup() -> Result<(AppState, TestRuntime, ViewData)> {
        let mut runtime = TestRuntime::default();
        let desk = runtime.load_desk()?;
        let view_data = ViewData::new(desk, Theme::default(), reference_now());
        Ok((AppState::default(), runtime, view_data))
    }

    fn press(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        codes: &[KeyCode],
    ) -> bool {
        let mut quit = false;
        for code in codes {
            quit = handle_key_event(state, runtime, view_data, key(*code));
        }
        quit
    }

    #[test]
    fn navigation_keys_map_to_table_commands() {
        assert_eq!(
            table_command_for_key(key(KeyCode::Char('j'))),
            Some(TableCommand::MoveRow(1))
        );
        assert_eq!(
            table_command_for_key(key(KeyCode::Up)),
            Some(TableCommand::MoveRow(-1))
        );
        assert_eq!(
            table_command_for_key(key(KeyCode::Char('s'))),
            Some(TableCommand::SortCurrentColumn)
        );
        assert_eq!(
            table_command_for_key(key(KeyCode::Char(' '))),
            Some(TableCommand::ToggleSelectCurrent)
        );
        assert_eq!(
            table_command_for_key(key(KeyCode::Char('V'))),
            Some(TableCommand::CycleView(-1))
        );
        assert_eq!(table_command_for_key(key(KeyCode::Char('z'))), None);
        assert_eq!(
            table_command_for_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn tab_and_digits_switch_screens() -> Result<()> {
        let (mut state, mut runtime, mut view_data) = setup()?;
        press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Tab]);
        assert_eq!(state.active_screen, ScreenKind::Suppliers);
        press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Char('4')]);
        assert_eq!(state.active_screen, ScreenKind::Inventory);
        press(&mut state, &mut runtime, &mut view_data, &[KeyCode::BackTab]);
        assert_eq!(state.active_screen, ScreenKind::Payments);
        Ok(())
    }

    #[test]
    fn search_prompt_applies_query_on_enter() -> Result<()> {
        let (mut state, mut runtime, mut view_data) = setup()?;
        let first_id = view_data
            .desk()
            .alerts()
            .page_rows()
            .first()
            .map(|alert| alert.id.to_string())
            .ok_or_else(|| anyhow::anyhow!("fixture has alerts"))?;

        press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Char('/')]);
        assert_eq!(
            state.prompt.as_ref().map(|prompt| prompt.kind),
            Some(PromptKind::Query)
        );
        let mut codes = first_id.chars().map(KeyCode::Char).collect::<Vec<_>>();
        codes.push(KeyCode::Enter);
        let quit = press(&mut state, &mut runtime, &mut view_data, &codes);

        assert!(!quit);
        assert!(state.prompt.is_none());
        let table = view_data.desk().table(ScreenKind::Alerts);
        assert_eq!(table.filters().query(), first_id);
        assert_eq!(table.matching(), 1);
        assert_eq!(state.status_line.as_deref(), Some("1 matching"));
        Ok(())
    }

    #[test]
    fn save_view_prompt_adds_a_view() -> Result<()> {
        let (mut state, mut runtime, mut view_data) = setup()?;
        let before = view_data.desk().table(ScreenKind::Alerts).views().views().len();
        let mut codes = vec![KeyCode::Char('w')];
        codes.extend("mine".chars().map(KeyCode::Char));
        codes.push(KeyCode::Enter);
        press(&mut state, &mut runtime, &mut view_data, &codes);

        let views = view_data.desk().table(ScreenKind::Alerts).views();
        assert_eq!(views.views().len(), before + 1);
        assert_eq!(views.current().map(|view| view.name.as_str()), Some("mine"));
        Ok(())
    }

    #[test]
    fn enter_activates_cursor_row() -> Result<()> {
        let (mut state, mut runtime, mut view_data) = setup()?;
        press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Enter]);
        assert_eq!(runtime.activated.len(), 1);
        let expected = format!("opened {}", runtime.activated[0]);
        assert_eq!(state.status_line.as_deref(), Some(expected.as_str()));
        Ok(())
    }

    #[test]
    fn help_swallows_keys_until_closed() -> Result<()> {
        let (mut state, mut runtime, mut view_data) = setup()?;
        press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Char('?')]);
        assert!(state.show_help);
        let quit = press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Char('q')]);
        assert!(!quit);
        press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Esc]);
        assert!(!state.show_help);
        assert!(press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Char('q')]));
        Ok(())
    }

    #[test]
    fn expanding_shows_detail_text() -> Result<()> {
        let (mut state, mut runtime, mut view_data) = setup()?;
        press(&mut state, &mut runtime, &mut view_data, &[KeyCode::Char('e')]);
        let projection = view_data
            .desk()
            .table(ScreenKind::Alerts)
            .project(&FormatContext::new(reference_now()));
        let detail = render_detail_text(&projection).ok_or_else(|| anyhow::anyhow!("no detail"))?;
        assert!(detail.contains("Source: "), "{detail}");
        assert!(state.status_line.as_deref().is_some_and(|s| s.starts_with("expanded ")));
        Ok(())
    }

    #[test]
    fn header_label_marks_sort_direction() {
        let mut header = HeaderCell {
            field: "created".to_owned(),
            label: "Created".to_owned(),
            align: Align::Right,
            sortable: true,
            sorted: Some(SortDirection::Desc),
            action: false,
        };
        assert_eq!(header_label(&header), "Created ↓");
        header.sorted = Some(SortDirection::Asc);
        assert_eq!(header_label(&header), "Created ↑");
        header.sorted = None;
        assert_eq!(header_label(&header), "Created");
    }

    #[test]
    fn plain_text_shows_empty_message() -> Result<()> {
        let desk = Desk::new(
            DeskData::default(),
            &ScreenOptions::default(),
            reference_now().date(),
        )?;
        let projection = desk
            .table(ScreenKind::Payments)
            .project(&FormatContext::new(reference_now()));
        let text = plain_table_text(&projection, 2);
        assert!(text.contains("No payments match the current filters"));
        assert!(text.contains("Due ↑"));
        assert!(text.starts_with("Default View (0 of 0)"));
        Ok(())
    }

    #[test]
    fn plain_text_pads_rows_to_column_widths() -> Result<()> {
        let (_, _, view_data) = setup()?;
        let projection = view_data
            .desk()
            .table(ScreenKind::Suppliers)
            .project(&FormatContext::new(reference_now()));
        let widths = column_widths(&projection);
        let text = plain_table_text(&projection, 1);
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3 + projection.rows.len() + 1);
        assert_eq!(lines[2].chars().count(), widths.iter().sum::<usize>() + widths.len() - 1);
        Ok(())
    }

    #[test]
    fn title_lists_view_range_and_filters() -> Result<()> {
        let (_, _, mut view_data) = setup()?;
        let table = view_data.desk.table_mut(ScreenKind::Alerts);
        table.dispatch(TableCommand::SetQuery("ALT".to_owned()));
        table.dispatch(TableCommand::SelectAll);
        let projection = table.project(&FormatContext::new(reference_now()));
        let title = table_title(&projection);
        assert!(title.starts_with("Default View | 1-10 of 24 | page 1/3"), "{title}");
        assert!(title.contains("/ALT"), "{title}");
        assert!(title.contains("24 selected"), "{title}");
        Ok(())
    }

    #[test]
    fn status_shows_prompt_input() {
        let mut state = AppState::default();
        state.dispatch(supplydesk_app::AppCommand::OpenPrompt {
            kind: PromptKind::Query,
            initial: "acme".to_owned(),
        });
        assert!(status_text(&state).starts_with("search: acme_"));
    }

    #[test]
    fn counts_strip_lists_every_count() {
        let text = render_counts_text(DashboardCounts {
            critical_alerts: 3,
            overdue_payments: 2,
            low_stock_items: 7,
            suppliers_needing_attention: 5,
        });
        assert!(text.contains("critical alerts 3"));
        assert!(text.contains("suppliers needing attention 5"));
    }

    #[test]
    fn insights_list_one_line_per_recommendation() -> Result<()> {
        assert_eq!(render_insights_text(&[]), None);

        let (_, _, view_data) = setup()?;
        let recommendations = view_data.desk().recommendations();
        assert!(recommendations.len() <= RECOMMENDATION_LIMIT);
        match render_insights_text(&recommendations) {
            Some(text) => {
                assert_eq!(text.lines().count(), recommendations.len());
                assert!(text.lines().all(|line| line.contains(" -> ")), "{text}");
            }
            None => assert!(recommendations.is_empty()),
        }
        Ok(())
    }

    #[test]
    fn colors_parse_names_and_hex() -> Result<()> {
        assert_eq!(parse_color("cyan")?, Color::Cyan);
        assert_eq!(parse_color(" #00aaff ")?, Color::Rgb(0, 0xaa, 0xff));
        let error = parse_color("sparkly").expect_err("unknown color");
        assert!(error.to_string().contains("sparkly"));
        Ok(())
    }

    #[test]
    fn help_mentions_every_view_key() {
        let help = help_overlay_text();
        for needle in ["v/V", "w save", "x delete", "/ search"] {
            assert!(help.contains(needle), "{needle}");
        }
    }
}
