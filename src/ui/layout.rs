use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Badge on top, recent transitions below, one help line at the bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayLayout {
    pub badge: Rect,
    pub transitions: Rect,
    pub help: Rect,
}

pub fn split_overlay_layout(area: Rect) -> OverlayLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    OverlayLayout {
        badge: chunks[0],
        transitions: chunks[1],
        help: chunks[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_splits_into_three_panes() {
        let area = Rect::new(0, 0, 60, 12);
        let panes = split_overlay_layout(area);

        assert_eq!(panes.badge.height, 1);
        assert_eq!(panes.transitions.height, 10);
        assert_eq!(panes.help.height, 1);
        assert_eq!(panes.badge.y, 0);
        assert_eq!(panes.transitions.y, 1);
        assert_eq!(panes.help.y, 11);
    }

    #[test]
    fn layout_keeps_badge_on_first_row_when_cramped() {
        let area = Rect::new(0, 0, 20, 3);
        let panes = split_overlay_layout(area);

        assert_eq!(panes.badge.y, 0);
        assert_eq!(panes.badge.height, 1);
        assert_eq!(panes.transitions.height, 1);
    }
}
