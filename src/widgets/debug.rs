use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct DebugState {
    pub num_events: usize,
    pub num_frames: usize,
    pub num_key_events: usize,
    pub last_key_event_name: String,
    /// Last action taken (e.g. "select_view") for debugging key handling.
    pub last_action: String,
    pub enabled: bool,
    /// Generation of the most recent load request.
    pub generation: u64,
    /// Events dropped because they belonged to a superseded load.
    pub stale_events: usize,
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key_event_name = format!("{:?}", event.code);
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(format!(
            "events={} keys={} last_key={} last_action={} frames={} gen={} stale={}",
            self.num_events,
            self.num_key_events,
            self.last_key_event_name,
            self.last_action,
            self.num_frames,
            self.generation,
            self.stale_events,
        ))
        .render(area, buf);
    }
}
