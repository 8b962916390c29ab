use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph, Widget},
};

const DEFAULT_CONTROLS: [(&str, &str); 6] = [
    ("o", "Open"),
    ("v", "View"),
    ("Enter", "Pick filter"),
    ("c", "Clear filters"),
    ("j/k", "Scroll"),
    ("q", "Quit"),
];

/// Bottom toolbar: key hints on the left, a busy throbber at the far right.
pub struct Controls {
    pub bg_color: Color,
    pub key_color: Color,
    pub label_color: Color,
    pub throbber_color: Color,
    /// When true, animate the throbber
    pub busy: bool,
    pub throbber_frame: u8,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            bg_color: Color::Indexed(236),
            key_color: Color::Cyan,
            label_color: Color::White,
            throbber_color: Color::Cyan,
            busy: false,
            throbber_frame: 0,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_busy(mut self, busy: bool, throbber_frame: u8) -> Self {
        self.busy = busy;
        self.throbber_frame = throbber_frame;
        self
    }

}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Block::default()
            .style(Style::default().bg(self.bg_color))
            .render(area, buf);

        let controls = DEFAULT_CONTROLS;

        // Key: key.len() + 1 (one trailing space). Label: action.len() + 1 (gap before next key).
        let pair_width = |(key, action): &(&str, &str)| -> u16 {
            (key.chars().count() as u16 + 1) + (action.chars().count() as u16 + 1)
        };

        const THROBBER_WIDTH: u16 = 3;
        let mut available = area.width.saturating_sub(THROBBER_WIDTH + 1);
        let mut n_show = 0;
        for pair in controls.iter() {
            let need = pair_width(pair);
            if available < need {
                break;
            }
            available -= need;
            n_show += 1;
        }

        let mut constraints: Vec<Constraint> = controls
            .iter()
            .take(n_show)
            .flat_map(|(key, action)| {
                [
                    Constraint::Length(key.chars().count() as u16 + 1),
                    Constraint::Length(action.chars().count() as u16 + 1),
                ]
            })
            .collect();
        constraints.push(Constraint::Fill(1));
        constraints.push(Constraint::Length(THROBBER_WIDTH));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base = Style::default().bg(self.bg_color);
        let key_style = base.fg(self.key_color);
        let label_style = base.fg(self.label_color);

        for (i, (key, action)) in controls.iter().take(n_show).enumerate() {
            let j = i * 2;
            Paragraph::new(*key).style(key_style).render(layout[j], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[j + 1], buf);
        }

        // |/-\ while a workbook is loading
        const THROBBER_ASCII: [char; 4] = ['|', '/', '-', '\\'];
        let throbber = if self.busy {
            THROBBER_ASCII[self.throbber_frame as usize % 4].to_string()
        } else {
            " ".to_string()
        };
        Paragraph::new(throbber)
            .style(base.fg(self.throbber_color))
            .centered()
            .render(layout[n_show * 2 + 1], buf);
    }
}

/// `1234567` as `1,234,567`.
pub fn format_number_with_commas(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().rev().collect();

    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }

    result.chars().rev().collect()
}
