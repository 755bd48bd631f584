use ratatui::layout::{Direction, Rect};

use crate::constants::{MAX_TAB_WIDTH, MIN_FLOATING_VISIBLE_MARGIN};

/// Signed floating rectangle origin with unsigned size.
///
/// Screen stations keep their windows in this form so a window dragged
/// partially off-screen keeps its real origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.x as i32,
            y: rect.y as i32,
            width: rect.width,
            height: rect.height,
        }
    }

    /// Centers a `width` x `height` window on the given cell.
    pub fn centered_on(column: u16, row: u16, width: u16, height: u16) -> Self {
        Self {
            x: column as i32 - (width / 2) as i32,
            y: row as i32 - (height / 2) as i32,
            width,
            height,
        }
    }

    /// The part of this rectangle that lies within `bounds`.
    pub fn visible_in(self, bounds: Rect) -> Rect {
        let bounds_x0 = bounds.x as i32;
        let bounds_y0 = bounds.y as i32;
        let bounds_x1 = bounds_x0 + bounds.width as i32;
        let bounds_y1 = bounds_y0 + bounds.height as i32;
        let x0 = self.x.max(bounds_x0);
        let y0 = self.y.max(bounds_y0);
        let x1 = (self.x + self.width as i32).min(bounds_x1);
        let y1 = (self.y + self.height as i32).min(bounds_y1);
        if x1 <= x0 || y1 <= y0 {
            return Rect::default();
        }
        Rect {
            x: x0 as u16,
            y: y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        }
    }

    /// Moves the rectangle so at least a margin of it stays inside `bounds`.
    pub fn keep_grabbable(self, bounds: Rect) -> Self {
        let margin = MIN_FLOATING_VISIBLE_MARGIN as i32;
        let min_x = bounds.x as i32 - self.width as i32 + margin;
        let max_x = bounds.x as i32 + bounds.width as i32 - margin;
        let min_y = bounds.y as i32;
        let max_y = bounds.y as i32 + bounds.height as i32 - 1;
        Self {
            x: self.x.clamp(min_x.min(max_x), max_x.max(min_x)),
            y: self.y.clamp(min_y.min(max_y), max_y.max(min_y)),
            ..self
        }
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

pub fn rect_is_empty(rect: Rect) -> bool {
    rect.width == 0 || rect.height == 0
}

/// Splits `area` along `direction` proportionally to `weights`; the last
/// child absorbs the rounding remainder.
pub fn split_weighted(direction: Direction, area: Rect, weights: &[f32]) -> Vec<Rect> {
    let count = weights.len();
    if count == 0 {
        return Vec::new();
    }
    let weights: Vec<f32> = if weights.iter().any(|w| *w > 0.0) {
        weights.iter().map(|w| w.max(0.0)).collect()
    } else {
        vec![1.0; count]
    };
    let total_weight: f32 = weights.iter().sum();
    let total = match direction {
        Direction::Horizontal => area.width,
        Direction::Vertical => area.height,
    };
    let mut sizes = Vec::with_capacity(count);
    let mut used: u16 = 0;
    for (idx, weight) in weights.iter().enumerate() {
        let size = if idx + 1 == count {
            total.saturating_sub(used)
        } else {
            let portion = ((*weight / total_weight) * total as f32).floor() as u16;
            let portion = portion.min(total.saturating_sub(used));
            used = used.saturating_add(portion);
            portion
        };
        sizes.push(size);
    }
    build_rects_from_sizes(direction, area, &sizes)
}

fn build_rects_from_sizes(direction: Direction, area: Rect, sizes: &[u16]) -> Vec<Rect> {
    let mut rects = Vec::with_capacity(sizes.len());
    let mut cursor_x = area.x;
    let mut cursor_y = area.y;
    for size in sizes {
        let rect = match direction {
            Direction::Horizontal => {
                let rect = Rect {
                    x: cursor_x,
                    y: area.y,
                    width: *size,
                    height: area.height,
                };
                cursor_x = cursor_x.saturating_add(*size);
                rect
            }
            Direction::Vertical => {
                let rect = Rect {
                    x: area.x,
                    y: cursor_y,
                    width: area.width,
                    height: *size,
                };
                cursor_y = cursor_y.saturating_add(*size);
                rect
            }
        };
        rects.push(rect);
    }
    rects
}

/// Lays out `count` buttons (tabs, flap entries) along a one-cell row or
/// column.
pub fn button_rects(strip: Rect, direction: Direction, count: usize) -> Vec<Rect> {
    if count == 0 || rect_is_empty(strip) {
        return vec![Rect::default(); count];
    }
    let extent = match direction {
        Direction::Horizontal => strip.width,
        Direction::Vertical => strip.height,
    };
    let per = (extent / count as u16).clamp(1, MAX_TAB_WIDTH);
    (0..count)
        .map(|idx| {
            let offset = per.saturating_mul(idx as u16);
            if offset >= extent {
                return Rect::default();
            }
            let size = per.min(extent - offset);
            match direction {
                Direction::Horizontal => Rect {
                    x: strip.x + offset,
                    width: size,
                    ..strip
                },
                Direction::Vertical => Rect {
                    y: strip.y + offset,
                    height: size,
                    ..strip
                },
            }
        })
        .collect()
}

/// Index at which a pointer at `(column, row)` inserts into a row of
/// buttons: before the button it hovers, after the last one otherwise.
pub fn insertion_index(buttons: &[Rect], direction: Direction, column: u16, row: u16) -> usize {
    for (idx, rect) in buttons.iter().enumerate() {
        if rect_is_empty(*rect) {
            continue;
        }
        let (pos, start, size) = match direction {
            Direction::Horizontal => (column, rect.x, rect.width),
            Direction::Vertical => (row, rect.y, rect.height),
        };
        if pos < start.saturating_add(size.div_ceil(2)) {
            return idx;
        }
    }
    buttons.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_weighted_even() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 11,
            height: 1,
        };
        let rects = split_weighted(Direction::Horizontal, area, &[1.0, 1.0]);
        assert_eq!(rects.len(), 2);
        // the last child absorbs what is left over
        assert_eq!(rects[0].width + rects[1].width, 11);
        assert_eq!(rects[1].x, rects[0].width);
    }

    #[test]
    fn split_weighted_vertical_uneven() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 4,
            height: 12,
        };
        let rects = split_weighted(Direction::Vertical, area, &[1.0, 2.0]);
        assert_eq!(rects[0].height, 4);
        assert_eq!(rects[1].height, 8);
        assert_eq!(rects[1].y, 4);
    }

    #[test]
    fn float_rect_visible_clips_negative_offsets() {
        let bounds = Rect {
            x: 0,
            y: 0,
            width: 20,
            height: 10,
        };
        let rect = FloatRect::new(-5, -2, 10, 6);
        let visible = rect.visible_in(bounds);
        assert_eq!(
            visible,
            Rect {
                x: 0,
                y: 0,
                width: 5,
                height: 4
            }
        );
        assert_eq!(FloatRect::new(30, 30, 5, 5).visible_in(bounds), Rect::default());
    }

    #[test]
    fn keep_grabbable_pulls_window_back() {
        let bounds = Rect {
            x: 0,
            y: 0,
            width: 40,
            height: 20,
        };
        let moved = FloatRect::new(100, 50, 10, 5).keep_grabbable(bounds);
        assert!(moved.x <= 40 - MIN_FLOATING_VISIBLE_MARGIN as i32);
        assert_eq!(moved.y, 19);
    }

    #[test]
    fn rect_contains_edge_cases() {
        let r = Rect {
            x: 0,
            y: 0,
            width: 0,
            height: 5,
        };
        assert!(!rect_contains(r, 0, 0));
        let r2 = Rect {
            x: 1,
            y: 1,
            width: 3,
            height: 3,
        };
        assert!(rect_contains(r2, 1, 1));
        assert!(!rect_contains(r2, 4, 1));
    }

    #[test]
    fn buttons_and_insertion_index() {
        let strip = Rect {
            x: 0,
            y: 0,
            width: 30,
            height: 1,
        };
        let buttons = button_rects(strip, Direction::Horizontal, 3);
        assert_eq!(buttons[0].width, 10);
        assert_eq!(buttons[2].x, 20);
        assert_eq!(insertion_index(&buttons, Direction::Horizontal, 1, 0), 0);
        assert_eq!(insertion_index(&buttons, Direction::Horizontal, 16, 0), 2);
        assert_eq!(insertion_index(&buttons, Direction::Horizontal, 29, 0), 3);
    }
}
