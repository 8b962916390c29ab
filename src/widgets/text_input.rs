use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Submit, // Enter pressed
    Cancel, // Esc pressed
}

/// Single-line text input widget wrapping tui-textarea
pub struct TextInput {
    textarea: TextArea<'static>,
    value: String,
}

impl TextInput {
    pub fn new() -> Self {
        let mut textarea = TextArea::default();
        textarea.set_cursor_line_style(Style::default());
        textarea.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        Self {
            textarea,
            value: String::new(),
        }
    }

    /// Input pre-filled with `value`, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        let mut input = Self::new();
        input.set_value(value);
        input
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        let single_line = value.replace(['\n', '\r'], " ");
        let mut textarea = TextArea::new(vec![single_line]);
        textarea.set_cursor_line_style(self.textarea.cursor_line_style());
        textarea.set_cursor_style(self.textarea.cursor_style());
        textarea.move_cursor(CursorMove::End);
        self.textarea = textarea;
        self.sync_from_textarea();
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn sync_from_textarea(&mut self) {
        self.value = self.textarea.lines().first().cloned().unwrap_or_default();
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TextInputEvent {
        match event.code {
            // single line: Enter submits instead of inserting a newline
            KeyCode::Enter => TextInputEvent::Submit,
            KeyCode::Esc => TextInputEvent::Cancel,
            _ => {
                let input = key_event_to_input(event);
                if input.key != Key::Null {
                    self.textarea.input(input);
                    self.sync_from_textarea();
                }
                TextInputEvent::None
            }
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert crossterm KeyEvent to tui_textarea::Input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Tab => Key::Tab,
        _ => Key::Null,
    };
    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::new();
        assert!(input.is_empty());
        for c in "report.xlsx".chars() {
            input.handle_key(&key(KeyCode::Char(c)));
        }
        assert_eq!(input.value(), "report.xlsx");
        input.handle_key(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "report.xls");
    }

    #[test]
    fn test_with_value_appends_at_end() {
        let mut input = TextInput::with_value("/tmp/");
        input.handle_key(&key(KeyCode::Char('a')));
        assert_eq!(input.value(), "/tmp/a");
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut input = TextInput::new();
        assert_eq!(input.handle_key(&key(KeyCode::Enter)), TextInputEvent::Submit);
        assert_eq!(input.handle_key(&key(KeyCode::Esc)), TextInputEvent::Cancel);
        assert!(input.is_empty());
    }
}
