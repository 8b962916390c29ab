use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, StatefulWidget};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod cache;
pub mod cli;
pub mod config;
pub mod dedupe;
pub mod error_display;
pub mod fields;
pub mod filter;
pub mod identifier;
pub mod layout;
pub mod loader;
pub mod normalize;
pub mod session;
pub mod table;
pub mod views;
pub mod widgets;
pub mod worker;

pub use cache::CacheManager;
pub use cli::Args;
pub use config::{AppConfig, ConfigManager};
pub use session::{Session, Summary};

use fields::FILTER_FIELDS;
use filter::{FilterState, Selection};
use layout::{app_layout, centered_rect_fixed};
use table::Table;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::filter_grid::{grid_height, move_focus, FilterGrid, FocusMove};
use widgets::picker::{Picker, PickerState};
use widgets::preview::{autosize_widths, Preview, PreviewState};
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "grantview";

const TITLE: &str = "Grant Reporting Demo";
const SUBTITLE: &str =
    "Load export → de-duplicate clients → filter by grant requirements → preview client list";

/// Everything the event loop feeds the app. Load results carry the generation
/// of the request that produced them.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf),
    Status(u64, String),
    Loaded(u64, Box<Session>),
    LoadFailed(u64, String),
    Resize(u16, u16),
    Exit,
}

#[derive(Default)]
enum Popup {
    #[default]
    None,
    Views(PickerState),
    /// `choices[i]` is what picking row `i` of `picker` selects.
    Options {
        field: &'static str,
        choices: Vec<Selection>,
        picker: PickerState,
    },
    OpenPath(TextInput),
}

enum PickerAction {
    Stay,
    Cancel,
    Choose(usize),
}

fn picker_key(picker: &mut PickerState, key: &KeyEvent) -> PickerAction {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return PickerAction::Cancel,
        KeyCode::Enter => {
            return match picker.selected_index() {
                Some(index) => PickerAction::Choose(index),
                None => PickerAction::Cancel,
            }
        }
        KeyCode::Down | KeyCode::Char('j') => picker.next(),
        KeyCode::Up | KeyCode::Char('k') => picker.previous(),
        KeyCode::PageDown => picker.page_down(10),
        KeyCode::PageUp => picker.page_up(10),
        _ => {}
    }
    PickerAction::Stay
}

/// Footer lines: client counts, then row counts with the preview note.
pub fn count_lines(summary: &Summary, preview_rows: usize) -> (String, String) {
    let clients = format!(
        "Filtered clients: {} of {}",
        summary.shown_clients, summary.total_clients
    );
    let rows = if summary.shown_rows > preview_rows {
        format!(
            "Rows: {} of {} (preview shows first {})",
            summary.shown_rows, summary.total_rows, preview_rows
        )
    } else {
        format!("Rows: {} of {}", summary.shown_rows, summary.total_rows)
    };
    (clients, rows)
}

pub struct App {
    events: Sender<AppEvent>,
    config: AppConfig,
    session: Option<Session>,
    status: String,
    generation: u64,
    loading: bool,
    focused: usize,
    popup: Popup,
    preview: Table,
    widths: Vec<u16>,
    preview_state: PreviewState,
    throbber_frame: u8,
    debug: DebugState,
}

impl App {
    pub fn new(events: Sender<AppEvent>, config: AppConfig) -> App {
        let debug = DebugState {
            enabled: config.debug.enabled,
            ..DebugState::default()
        };
        App {
            events,
            config,
            session: None,
            status: "waiting for workbook…".to_string(),
            generation: 0,
            loading: false,
            focused: 0,
            popup: Popup::None,
            preview: Table::default(),
            widths: Vec::new(),
            preview_state: PreviewState::default(),
            throbber_frame: 0,
            debug,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Index of the focused filter field.
    pub fn focused(&self) -> usize {
        self.focused
    }

    /// Rows currently shown in the preview grid.
    pub fn preview(&self) -> &Table {
        &self.preview
    }

    /// Advance the busy throbber while a load is running.
    pub fn tick(&mut self) {
        if self.loading {
            self.throbber_frame = self.throbber_frame.wrapping_add(1);
        }
    }

    pub fn event(&mut self, event: AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(&key),
            AppEvent::Open(path) => {
                self.open(path);
                None
            }
            AppEvent::Status(generation, message) if generation == self.generation => {
                self.status = message;
                None
            }
            AppEvent::Loaded(generation, session) if generation == self.generation => {
                self.loaded(*session);
                None
            }
            AppEvent::LoadFailed(generation, message) if generation == self.generation => {
                log::warn!("load failed: {}", message);
                self.loading = false;
                self.status = format!("Error: {}", message);
                None
            }
            AppEvent::Status(..) | AppEvent::Loaded(..) | AppEvent::LoadFailed(..) => {
                self.debug.stale_events += 1;
                log::debug!("dropped event from a superseded load");
                None
            }
            AppEvent::Resize(..) | AppEvent::Exit => None,
        }
    }

    fn open(&mut self, path: PathBuf) {
        self.generation += 1;
        self.debug.generation = self.generation;
        self.debug.last_action = "open".to_string();
        self.loading = true;
        self.session = None;
        self.popup = Popup::None;
        self.focused = 0;
        self.refresh_preview();
        self.status = format!("Opening {}…", path.display());
        worker::spawn_load(
            path,
            self.config.filters.max_options,
            self.generation,
            self.events.clone(),
        );
    }

    fn loaded(&mut self, session: Session) {
        self.loading = false;
        if let Some(view) = session.current_view_name() {
            log::info!("default view: {} ({})", view, session.status());
        }
        self.status = if session.view_names().is_empty() {
            "Workbook has no readable tabs.".to_string()
        } else {
            "Workbook ready. Use grant filters to drill down.".to_string()
        };
        self.session = Some(session);
        self.focused = 0;
        self.refresh_preview();
    }

    fn refresh_preview(&mut self) {
        let display = &self.config.display;
        match &self.session {
            Some(session) => {
                self.preview = match session.preview(display.max_preview_rows) {
                    Ok(preview) => preview,
                    Err(e) => {
                        log::error!("failed to build preview: {:?}", e);
                        self.status = format!("Error: {}", e);
                        Table::default()
                    }
                };
                self.widths = autosize_widths(
                    &self.preview,
                    display.autosize_sample_rows,
                    display.column_min_width,
                    display.column_max_width,
                );
            }
            None => {
                self.preview = Table::default();
                self.widths.clear();
            }
        }
        self.preview_state.reset();
    }

    fn key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        self.debug.on_key(key);
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        match &mut self.popup {
            Popup::None => return self.main_key(key),
            Popup::Views(picker) => match picker_key(picker, key) {
                PickerAction::Stay => {}
                PickerAction::Cancel => self.popup = Popup::None,
                PickerAction::Choose(index) => {
                    let name = picker.items[index].clone();
                    self.popup = Popup::None;
                    self.select_view(&name);
                }
            },
            Popup::Options {
                field,
                choices,
                picker,
            } => {
                let field = *field;
                match picker_key(picker, key) {
                    PickerAction::Stay => {}
                    PickerAction::Cancel => self.popup = Popup::None,
                    PickerAction::Choose(index) => {
                        let choice = choices.get(index).cloned().unwrap_or_default();
                        self.popup = Popup::None;
                        self.select_option(field, choice);
                    }
                }
            }
            Popup::OpenPath(input) => match input.handle_key(key) {
                TextInputEvent::None => {}
                TextInputEvent::Cancel => self.popup = Popup::None,
                TextInputEvent::Submit => {
                    let path = input.value().trim().to_string();
                    self.popup = Popup::None;
                    if !path.is_empty() {
                        return Some(AppEvent::Open(PathBuf::from(path)));
                    }
                }
            },
        }
        None
    }

    fn main_key(&mut self, key: &KeyEvent) -> Option<AppEvent> {
        let fields = FILTER_FIELDS.len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppEvent::Exit),
            KeyCode::Char('o') => {
                let current = self
                    .session
                    .as_ref()
                    .map(|s| s.path().display().to_string())
                    .unwrap_or_default();
                self.popup = Popup::OpenPath(TextInput::with_value(&current));
            }
            KeyCode::Char('v') => self.open_view_picker(),
            KeyCode::Left => self.focused = move_focus(self.focused, FocusMove::Left, fields),
            KeyCode::Right => self.focused = move_focus(self.focused, FocusMove::Right, fields),
            KeyCode::Up => self.focused = move_focus(self.focused, FocusMove::Up, fields),
            KeyCode::Down => self.focused = move_focus(self.focused, FocusMove::Down, fields),
            KeyCode::Enter | KeyCode::Char(' ') => self.open_option_picker(),
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Char('j') => self.preview_state.scroll_down(1, self.preview.height()),
            KeyCode::Char('k') => self.preview_state.scroll_up(1),
            KeyCode::PageDown => self.preview_state.scroll_down(20, self.preview.height()),
            KeyCode::PageUp => self.preview_state.scroll_up(20),
            KeyCode::Char('l') => self.preview_state.scroll_right(self.preview.width()),
            KeyCode::Char('h') => self.preview_state.scroll_left(),
            KeyCode::Home => self.preview_state.reset(),
            _ => {}
        }
        None
    }

    fn open_view_picker(&mut self) {
        let Some(session) = &self.session else {
            self.status = "No workbook loaded.".to_string();
            return;
        };
        let names = session.view_names();
        let current = session
            .current_view_name()
            .and_then(|v| names.iter().position(|n| n == v));
        self.popup = Popup::Views(PickerState::new("Data view", names, current));
    }

    fn open_option_picker(&mut self) {
        let Some(session) = &self.session else {
            self.status = "No workbook loaded.".to_string();
            return;
        };
        let Some(filter) = session.filters().fields().get(self.focused) else {
            return;
        };
        if !filter.is_available() {
            self.status = format!("'{}' is not available for this view.", filter.field);
            return;
        }
        let choices: Vec<Selection> = std::iter::once(Selection::All)
            .chain(filter.options.iter().cloned().map(Selection::Value))
            .collect();
        let items: Vec<String> = choices.iter().map(|c| c.label().to_string()).collect();
        let current = choices.iter().position(|c| *c == filter.selection);
        self.popup = Popup::Options {
            field: filter.field,
            choices,
            picker: PickerState::new(filter.field, items, current),
        };
    }

    fn select_view(&mut self, name: &str) {
        self.debug.last_action = "select_view".to_string();
        let Some(session) = &mut self.session else {
            return;
        };
        match session.select_view(name) {
            Ok(()) => {
                self.status = format!("View: {}. {}", name, session.status());
                self.refresh_preview();
            }
            Err(e) => self.status = format!("Error: {}", e),
        }
    }

    fn select_option(&mut self, field: &str, choice: Selection) {
        self.debug.last_action = "select_option".to_string();
        let Some(session) = &mut self.session else {
            return;
        };
        match session.set_selection(field, choice.value()) {
            Ok(()) => {
                self.status = format!("Active filters: {}", session.filters().summary());
                self.refresh_preview();
            }
            Err(e) => self.status = format!("Error: {}", e),
        }
    }

    fn clear_filters(&mut self) {
        self.debug.last_action = "clear_filters".to_string();
        if let Some(session) = &mut self.session {
            self.status = match session.clear_filters() {
                Ok(()) => "Filters cleared.".to_string(),
                Err(e) => format!("Error: {}", e),
            };
            self.refresh_preview();
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(vec![
            Line::from(Span::styled(
                TITLE,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::Gray))),
        ])
        .render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let file = match &self.session {
            Some(s) => {
                let name = s
                    .path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match s.current_view_name() {
                    Some(view) => format!("Loaded: {} | View: {}", name, view),
                    None => format!("Loaded: {}", name),
                }
            }
            None => "No file loaded".to_string(),
        };
        let file_width = (file.chars().count() as u16).min(area.width / 2);
        let [left, right] = Layout::new(
            Direction::Horizontal,
            [Constraint::Fill(1), Constraint::Length(file_width)],
        )
        .areas(area);
        let status_style = if self.status.starts_with("Error:") {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        Paragraph::new(format!("Status: {}", self.status))
            .style(status_style)
            .render(left, buf);
        let file_style = if self.session.is_some() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Paragraph::new(file)
            .style(file_style)
            .right_aligned()
            .render(right, buf);
    }

    fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let summary = self
            .session
            .as_ref()
            .map(Session::summary)
            .unwrap_or_default();
        let (clients, rows) = count_lines(&summary, self.config.display.max_preview_rows);
        let active = self
            .session
            .as_ref()
            .map(|s| s.filters().summary().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(clients, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("    "),
                Span::raw(rows),
            ]),
            Line::from(Span::styled(
                format!("Active filters: {}", active),
                Style::default().fg(Color::Gray),
            )),
        ])
        .render(area, buf);
    }

    fn render_popup(&mut self, area: Rect, buf: &mut Buffer) {
        match &mut self.popup {
            Popup::None => {}
            Popup::Views(picker) | Popup::Options { picker, .. } => {
                Picker.render(area, buf, picker)
            }
            Popup::OpenPath(input) => {
                let popup = centered_rect_fixed(area, 72, 3);
                Clear.render(popup, buf);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(" Open workbook (Enter to load, Esc to cancel) ");
                let inner = block.inner(popup);
                block.render(popup, buf);
                (&*input).render(inner, buf);
            }
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;
        let layout = app_layout(area, grid_height(FILTER_FIELDS.len()), self.debug.enabled);

        self.render_header(layout.header, buf);
        self.render_status(layout.status, buf);

        let no_filters = FilterState::default();
        let (filters, enabled) = match &self.session {
            Some(s) => (s.filters(), true),
            None => (&no_filters, false),
        };
        FilterGrid::new(filters, self.focused)
            .enabled(enabled)
            .render(layout.filters, buf);

        Preview::new(&self.preview, &self.widths).render(
            layout.preview,
            buf,
            &mut self.preview_state,
        );

        self.render_footer(layout.footer, buf);
        (&Controls::new().with_busy(self.loading, self.throbber_frame))
            .render(layout.control_bar, buf);
        if let Some(debug_area) = layout.debug {
            (&self.debug).render(debug_area, buf);
        }

        self.render_popup(area, buf);
    }
}
