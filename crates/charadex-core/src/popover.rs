//! # Popover Positioning
//!
//! Anchored placement of a floating panel next to a trigger rectangle,
//! clamped to the viewport. Coordinates are integer cells (pixels in a
//! browser, character cells in a terminal); `y` grows downwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..self
        }
    }
}

/// Which side of the trigger the panel opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    #[default]
    Bottom,
    Left,
}

/// Alignment along the trigger edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopoverOptions {
    pub side: Side,
    pub align: Align,
    /// Distance between trigger and panel.
    pub gap: i32,
    /// Minimum distance between panel and viewport edges.
    pub padding: i32,
}

impl Default for PopoverOptions {
    fn default() -> Self {
        Self {
            side: Side::Bottom,
            align: Align::Start,
            gap: 1,
            padding: 1,
        }
    }
}

fn aligned(start: i32, trigger_len: i32, panel_len: i32, align: Align) -> i32 {
    match align {
        Align::Start => start,
        Align::Center => start.saturating_add(trigger_len.saturating_sub(panel_len) / 2),
        Align::End => start.saturating_add(trigger_len).saturating_sub(panel_len),
    }
}

/// Keep `[pos, pos + len)` inside `[lo, hi)`; pin to `lo` if it cannot fit.
fn clamp_axis(pos: i32, len: i32, lo: i32, hi: i32) -> i32 {
    let max = hi.saturating_sub(len);
    if max < lo { lo } else { pos.clamp(lo, max) }
}

/// Top-left corner of the panel for the given trigger and viewport.
#[must_use]
pub fn compute_position(
    trigger: Rect,
    panel: Size,
    viewport: Rect,
    options: PopoverOptions,
) -> Point {
    let raw = match options.side {
        Side::Bottom => Point {
            x: aligned(trigger.x, trigger.width, panel.width, options.align),
            y: trigger.bottom().saturating_add(options.gap),
        },
        Side::Top => Point {
            x: aligned(trigger.x, trigger.width, panel.width, options.align),
            y: trigger.y.saturating_sub(options.gap).saturating_sub(panel.height),
        },
        Side::Right => Point {
            x: trigger.right().saturating_add(options.gap),
            y: aligned(trigger.y, trigger.height, panel.height, options.align),
        },
        Side::Left => Point {
            x: trigger.x.saturating_sub(options.gap).saturating_sub(panel.width),
            y: aligned(trigger.y, trigger.height, panel.height, options.align),
        },
    };

    let pad = options.padding.max(0);
    Point {
        x: clamp_axis(
            raw.x,
            panel.width,
            viewport.x.saturating_add(pad),
            viewport.right().saturating_sub(pad),
        ),
        y: clamp_axis(
            raw.y,
            panel.height,
            viewport.y.saturating_add(pad),
            viewport.bottom().saturating_sub(pad),
        ),
    }
}

/// A panel anchored to a trigger, repositioned on open, resize and scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popover {
    trigger: Rect,
    panel: Size,
    options: PopoverOptions,
    viewport: Rect,
    position: Option<Point>,
}

impl Popover {
    #[must_use]
    pub fn new(trigger: Rect, panel: Size, options: PopoverOptions) -> Self {
        Self {
            trigger,
            panel,
            options,
            viewport: Rect::default(),
            position: None,
        }
    }

    /// Current top-left corner, `None` while closed.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.position.is_some()
    }

    pub fn open(&mut self, viewport: Rect) -> Point {
        self.viewport = viewport;
        self.recompute()
    }

    pub fn close(&mut self) {
        self.position = None;
    }

    /// The viewport changed size. No-op while closed.
    pub fn on_resize(&mut self, viewport: Rect) -> Option<Point> {
        self.viewport = viewport;
        self.position.map(|_| self.recompute())
    }

    /// Content scrolled by `(dx, dy)`; the trigger moves the opposite way.
    pub fn on_scroll(&mut self, dx: i32, dy: i32) -> Option<Point> {
        self.trigger = self.trigger.translated(dx.saturating_neg(), dy.saturating_neg());
        self.position.map(|_| self.recompute())
    }

    /// Resize the panel itself, e.g. after its content changed.
    pub fn set_panel_size(&mut self, panel: Size) -> Option<Point> {
        self.panel = panel;
        self.position.map(|_| self.recompute())
    }

    fn recompute(&mut self) -> Point {
        let point = compute_position(self.trigger, self.panel, self.viewport, self.options);
        self.position = Some(point);
        point
    }
}
