use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header: Rect,
    pub status: Rect,
    pub filters: Rect,
    pub preview: Rect,
    pub footer: Rect,
    pub control_bar: Rect,
    pub debug: Option<Rect>,
}

/// Header (2 rows), status (1), filter grid (`filters_height`), preview (fill),
/// footer (2), control bar (1), optional debug (1).
pub fn app_layout(area: Rect, filters_height: u16, debug_enabled: bool) -> AppLayout {
    let mut constraints = vec![
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(filters_height),
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Length(1),
    ];
    if debug_enabled {
        constraints.push(Constraint::Length(1));
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    AppLayout {
        header: layout[0],
        status: layout[1],
        filters: layout[2],
        preview: layout[3],
        footer: layout[4],
        control_bar: layout[5],
        debug: debug_enabled.then(|| layout[6]),
    }
}

/// Centered rect with fixed width and height, clamped to fit inside `r`.
pub fn centered_rect_fixed(r: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    let x = r.x + r.width.saturating_sub(w) / 2;
    let y = r.y + r.height.saturating_sub(h) / 2;
    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}
