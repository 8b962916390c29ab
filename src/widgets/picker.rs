use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::layout::centered_rect_fixed;

/// Items and cursor of an open popup list.
#[derive(Debug, Clone, Default)]
pub struct PickerState {
    pub title: String,
    pub items: Vec<String>,
    pub list: ListState,
}

impl PickerState {
    /// Picker over `items` with the cursor on row `selected` when it is in
    /// range, otherwise on the first row.
    pub fn new(title: impl Into<String>, items: Vec<String>, selected: Option<usize>) -> Self {
        let index = selected
            .filter(|&i| i < items.len())
            .or(if items.is_empty() { None } else { Some(0) });
        let mut list = ListState::default();
        list.select(index);
        Self {
            title: title.into(),
            items,
            list,
        }
    }

    pub fn next(&mut self) {
        self.step(1);
    }

    pub fn previous(&mut self) {
        self.step(-1);
    }

    pub fn page_down(&mut self, page: usize) {
        self.step(page as isize);
    }

    pub fn page_up(&mut self, page: usize) {
        self.step(-(page as isize));
    }

    fn step(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() as isize - 1;
        let current = self.list.selected().unwrap_or(0) as isize;
        self.list.select(Some((current + delta).clamp(0, last) as usize));
    }

    /// Row under the cursor.
    pub fn selected_index(&self) -> Option<usize> {
        self.list.selected().filter(|&i| i < self.items.len())
    }
}

/// Centered popup list with a highlighted cursor row.
pub struct Picker;

impl Picker {
    const MAX_WIDTH: u16 = 72;
    const MAX_HEIGHT: u16 = 20;
}

impl StatefulWidget for Picker {
    type State = PickerState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let longest = state
            .items
            .iter()
            .map(|i| i.chars().count())
            .chain(std::iter::once(state.title.chars().count()))
            .max()
            .unwrap_or(0) as u16;
        let width = (longest + 6).clamp(24, Self::MAX_WIDTH);
        let height = (state.items.len() as u16 + 2).clamp(3, Self::MAX_HEIGHT);
        let popup = centered_rect_fixed(area, width, height);

        Clear.render(popup, buf);
        let items: Vec<ListItem> = state
            .items
            .iter()
            .map(|i| ListItem::new(i.as_str()))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(format!(" {} ", state.title)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        StatefulWidget::render(list, popup, buf, &mut state.list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<String> {
        ["All", "Female", "Male"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_starts_on_current_selection() {
        let state = PickerState::new("Gender", items(), Some(2));
        assert_eq!(state.selected_index(), Some(2));
        let state = PickerState::new("Gender", items(), Some(7));
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut state = PickerState::new("Gender", items(), None);
        state.previous();
        assert_eq!(state.selected_index(), Some(0));
        state.page_down(10);
        assert_eq!(state.selected_index(), Some(2));
        state.next();
        assert_eq!(state.selected_index(), Some(2));
    }

    #[test]
    fn test_empty_picker() {
        let mut state = PickerState::new("Views", Vec::new(), None);
        state.next();
        assert_eq!(state.selected_index(), None);
    }
}
