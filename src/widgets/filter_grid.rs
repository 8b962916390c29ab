use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::filter::FilterState;

/// Filter fields per grid row.
pub const GRID_COLUMNS: usize = 4;

/// Lines taken by the grid for `fields` filters, borders included.
pub fn grid_height(fields: usize) -> u16 {
    (fields.div_ceil(GRID_COLUMNS) * 2) as u16 + 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Up,
    Down,
    Left,
    Right,
}

/// Focus index after moving one cell in `dir` on a grid of `len` fields.
/// Moves that leave the grid keep the current focus.
pub fn move_focus(current: usize, dir: FocusMove, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = match dir {
        FocusMove::Left if current % GRID_COLUMNS > 0 => current - 1,
        FocusMove::Right if current % GRID_COLUMNS + 1 < GRID_COLUMNS => current + 1,
        FocusMove::Up if current >= GRID_COLUMNS => current - GRID_COLUMNS,
        FocusMove::Down => current + GRID_COLUMNS,
        _ => current,
    };
    if next < len {
        next
    } else {
        current
    }
}

/// Grant filter dropdowns laid out four to a row.
pub struct FilterGrid<'a> {
    pub filters: &'a FilterState,
    pub focused: usize,
    /// False while no workbook is loaded; every field renders disabled.
    pub enabled: bool,
}

impl<'a> FilterGrid<'a> {
    pub fn new(filters: &'a FilterState, focused: usize) -> Self {
        Self {
            filters,
            focused,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Widget for FilterGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Grant filters ");
        let inner = block.inner(area);
        block.render(area, buf);

        let fields = self.filters.fields();
        let rows = Layout::new(
            Direction::Vertical,
            vec![Constraint::Length(2); fields.len().div_ceil(GRID_COLUMNS)],
        )
        .split(inner);

        for (r, chunk) in fields.chunks(GRID_COLUMNS).enumerate() {
            let Some(&row_area) = rows.get(r) else {
                break;
            };
            let cells = Layout::new(
                Direction::Horizontal,
                vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS],
            )
            .split(row_area);

            for (c, filter) in chunk.iter().enumerate() {
                let index = r * GRID_COLUMNS + c;
                let available = self.enabled && filter.is_available();
                let focused = self.enabled && index == self.focused;

                let label_style = if focused {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let value_style = match (available, focused) {
                    (_, true) => Style::default().add_modifier(Modifier::REVERSED),
                    (false, false) => Style::default().fg(Color::DarkGray),
                    (true, false) if filter.selection.value().is_some() => {
                        Style::default().fg(Color::Yellow)
                    }
                    (true, false) => Style::default(),
                };
                let value = if self.enabled {
                    filter.selection.label()
                } else {
                    "(Not available)"
                };
                let marker = if available { " ▾" } else { "" };

                Paragraph::new(vec![
                    Line::from(Span::styled(filter.field, label_style)),
                    Line::from(Span::styled(format!("{}{}", value, marker), value_style)),
                ])
                .render(cells[c], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FILTER_FIELDS;

    #[test]
    fn test_move_focus_stays_in_grid() {
        let len = FILTER_FIELDS.len();
        assert_eq!(move_focus(0, FocusMove::Left, len), 0);
        assert_eq!(move_focus(0, FocusMove::Right, len), 1);
        assert_eq!(move_focus(3, FocusMove::Right, len), 3);
        assert_eq!(move_focus(1, FocusMove::Down, len), 5);
        assert_eq!(move_focus(5, FocusMove::Up, len), 1);
        // last row has two fields (12, 13)
        assert_eq!(move_focus(10, FocusMove::Down, len), 10);
        assert_eq!(move_focus(9, FocusMove::Down, len), 13);
        assert_eq!(move_focus(0, FocusMove::Down, 0), 0);
    }

    #[test]
    fn test_grid_height() {
        assert_eq!(grid_height(FILTER_FIELDS.len()), 10);
    }

    #[test]
    fn test_disabled_grid_shows_not_available() {
        let state = FilterState::default();
        let area = Rect::new(0, 0, 120, grid_height(FILTER_FIELDS.len()));
        let mut buf = Buffer::empty(area);
        FilterGrid::new(&state, 0).enabled(false).render(area, &mut buf);
        let line: String = (0..area.width).map(|x| buf[(x, 2)].symbol()).collect();
        assert!(line.contains("(Not available)"));
    }
}
