//! Draws a laid-out tree with ratatui.
//!
//! Docked content is painted first; flap popups and screen windows are
//! collected on the way down and painted on top, in that order.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::controller::DockController;
use crate::geometry::button_rects;
use crate::model::{HasChildren, NodeId, StationKind};

const FOCUSED: Color = Color::Cyan;
const FRONT_TAB: Color = Color::Yellow;
const PREVIEW: Color = Color::Magenta;

/// Lays out `root` in `area` and draws it.
pub fn render_root(frame: &mut Frame, ctrl: &mut DockController, root: NodeId, area: Rect) {
    ctrl.layout(root, area);
    let mut overlays = Vec::new();
    draw_node(frame, ctrl, root, &mut overlays);
    for node in overlays {
        if let Some(rect) = ctrl.bounds(node)
            && rect.area() > 0
        {
            frame.render_widget(Clear, rect);
            draw_node(frame, ctrl, node, &mut Vec::new());
        }
    }
}

/// Outline of the area a pending drop would occupy.
pub fn render_preview(frame: &mut Frame, rect: Rect) {
    if rect.area() == 0 {
        return;
    }
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PREVIEW).add_modifier(Modifier::BOLD)),
        rect,
    );
}

fn draw_node(frame: &mut Frame, ctrl: &DockController, node: NodeId, overlays: &mut Vec<NodeId>) {
    let tree = ctrl.tree();
    let Some(area) = ctrl.bounds(node).filter(|r| r.area() > 0) else {
        return;
    };
    if let Some(dockable) = tree.dockable(node) {
        let focused = ctrl.focused() == Some(node);
        let border = if focused {
            Style::default().fg(FOCUSED)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(dockable.title())
            .borders(Borders::ALL)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        dockable.content().render(frame, inner, focused);
        return;
    }
    let Some(station) = tree.station(node) else {
        return;
    };
    match station.kind() {
        StationKind::Split { .. } => {
            for child in station.children() {
                draw_node(frame, ctrl, *child, overlays);
            }
        }
        StationKind::Stack => {
            draw_strip(frame, ctrl, node, area);
            if let Some(front) = station.front() {
                draw_node(frame, ctrl, front, overlays);
            }
        }
        StationKind::Flap { .. } => {
            draw_strip(frame, ctrl, node, area);
            overlays.extend(station.front());
        }
        StationKind::Screen { .. } => overlays.extend(station.children().iter().copied()),
    }
}

fn draw_strip(frame: &mut Frame, ctrl: &DockController, station_id: NodeId, area: Rect) {
    let tree = ctrl.tree();
    let Some(station) = tree.station(station_id) else {
        return;
    };
    let strip = station.tab_strip(area);
    let buttons = button_rects(strip, station.strip_direction(), station.child_count());
    for (child, rect) in station.children().iter().zip(buttons) {
        let title = tree.title(*child).unwrap_or_default();
        let style = if station.front() == Some(*child) {
            Style::default().fg(FRONT_TAB).add_modifier(Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        frame.render_widget(Paragraph::new(title).style(style), rect);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::model::{Dockable, Station};

    #[test]
    fn stack_shows_tabs_and_front_body() {
        let mut ctrl = DockController::new();
        let root = ctrl.add_station(Station::stack("tabs"));
        ctrl.add_root(root).unwrap();
        let a = ctrl.add_dockable(Dockable::text("alpha"));
        let b = ctrl.add_dockable(Dockable::text("beta"));
        ctrl.drop(root, a).unwrap();
        ctrl.drop(root, b).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        terminal
            .draw(|frame| render_root(frame, &mut ctrl, root, frame.area()))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let top: String = (0..30).map(|x| buffer[(x, 0)].symbol().to_string()).collect();
        assert!(top.contains("alpha"));
        assert!(top.contains("beta"));
        assert!(ctrl.bounds(b).is_some_and(|r| r.area() > 0));
        assert_eq!(ctrl.bounds(a).map(|r| r.area()), Some(0));
    }
}
