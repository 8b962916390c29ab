use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::table::Table as DataTable;

/// Column widths for a preview of `table`: each column fits its header and the
/// values of the first `sample_rows` rows, clamped to `min..=max` characters.
pub fn autosize_widths(table: &DataTable, sample_rows: usize, min: u16, max: u16) -> Vec<u16> {
    let max = max.max(min);
    let sample = table.height().min(sample_rows);
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let widest = (0..sample)
                .map(|row| table.text(row, col).chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0);
            (widest.min(u16::MAX as usize) as u16).clamp(min, max)
        })
        .collect()
}

/// Scroll position of the preview grid.
#[derive(Debug, Default)]
pub struct PreviewState {
    pub table_state: TableState,
    /// First column shown.
    pub col_offset: usize,
}

impl PreviewState {
    pub fn reset(&mut self) {
        self.table_state = TableState::default();
        self.col_offset = 0;
    }

    pub fn scroll_down(&mut self, rows: usize, len: usize) {
        if len == 0 {
            return;
        }
        let next = self.table_state.selected().map_or(0, |s| s + rows);
        self.table_state.select(Some(next.min(len - 1)));
    }

    pub fn scroll_up(&mut self, rows: usize) {
        let next = self.table_state.selected().unwrap_or(0).saturating_sub(rows);
        self.table_state.select(Some(next));
    }

    pub fn scroll_right(&mut self, columns: usize) {
        if self.col_offset + 1 < columns {
            self.col_offset += 1;
        }
    }

    pub fn scroll_left(&mut self) {
        self.col_offset = self.col_offset.saturating_sub(1);
    }
}

/// Excel-like grid over the first rows of the filtered view.
pub struct Preview<'a> {
    table: &'a DataTable,
    widths: &'a [u16],
    cell_padding: u16,
    header_fg: Color,
    alternate_row_bg: Option<Color>,
}

impl<'a> Preview<'a> {
    pub fn new(table: &'a DataTable, widths: &'a [u16]) -> Self {
        Self {
            table,
            widths,
            cell_padding: 1,
            header_fg: Color::Cyan,
            alternate_row_bg: Some(Color::Indexed(235)),
        }
    }
}

impl StatefulWidget for Preview<'_> {
    type State = PreviewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = Block::default().borders(Borders::TOP).title(" Preview ");
        let inner = block.inner(area);
        block.render(area, buf);

        if self.table.width() == 0 {
            Paragraph::new("No data to display.")
                .centered()
                .style(Style::default().fg(Color::DarkGray))
                .render(inner, buf);
            return;
        }

        let offset = state.col_offset.min(self.table.width() - 1);

        // take columns from the offset while they fit; the last one may be cut
        let mut used = 0u16;
        let mut visible: Vec<(usize, u16)> = Vec::new();
        for (i, &w) in self.widths.iter().enumerate().skip(offset) {
            if used >= inner.width {
                break;
            }
            let w = w.min(inner.width - used);
            visible.push((i, w));
            used = used.saturating_add(w + self.cell_padding);
        }

        let names = self.table.columns();
        let headers: Vec<Span> = visible
            .iter()
            .map(|&(i, _)| Span::raw(names[i].as_str()))
            .collect();
        let rows: Vec<Row> = (0..self.table.height())
            .map(|row_index| {
                let cells: Vec<Cell> = visible
                    .iter()
                    .map(|&(i, _)| Cell::from(self.table.text(row_index, i)))
                    .collect();
                let style = match self.alternate_row_bg {
                    Some(c) if row_index % 2 == 1 => Style::default().bg(c),
                    _ => Style::default(),
                };
                Row::new(cells).style(style)
            })
            .collect();
        let widths: Vec<Constraint> = visible.iter().map(|&(_, w)| Constraint::Length(w)).collect();

        StatefulWidget::render(
            Table::new(rows, widths)
                .column_spacing(self.cell_padding)
                .header(
                    Row::new(headers).style(
                        Style::default()
                            .fg(self.header_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                )
                .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
            inner,
            buf,
            &mut state.table_state,
        );
    }
}
