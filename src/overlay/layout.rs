//! Geometry of the overlay content view.
//!
//! Coordinates are logical points with the origin at the top-left corner of
//! the content area, matching Tauri's coordinate system.

use serde::{Deserialize, Serialize};

use super::chrome::ButtonRole;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Convert a point in AppKit view coordinates (origin bottom-left) into
/// top-left content coordinates for a view of size `bounds`.
pub fn to_top_left(location: Point, bounds: Size) -> Point {
    Point::new(location.x, bounds.height - location.y)
}

/// Traffic light geometry inside the drag strip.
pub const BUTTON_DIAMETER: f64 = 14.0;
pub const BUTTON_INSET: f64 = 8.0;
pub const BUTTON_SPACING: f64 = 6.0;

/// What a point in the content view lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    TrafficLight(ButtonRole),
    DragArea,
    Browser,
    Outside,
}

/// Frames of every subview for one content size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub content: Size,
    pub drag_area: Rect,
    pub browser: Rect,
}

impl OverlayLayout {
    /// Drag strip spans the full width at the top with a fixed height; the
    /// browser fills what remains below it.
    pub fn new(content: Size, drag_area_height: f64) -> Self {
        let width = content.width.max(0.0);
        let height = content.height.max(0.0);
        let strip = drag_area_height.min(height);
        Self {
            content: Size::new(width, height),
            drag_area: Rect::new(0.0, 0.0, width, strip),
            browser: Rect::new(0.0, strip, width, (height - strip).max(0.0)),
        }
    }

    pub fn button_frame(&self, role: ButtonRole) -> Rect {
        let index = match role {
            ButtonRole::Close => 0.0,
            ButtonRole::Minimize => 1.0,
            ButtonRole::Zoom => 2.0,
        };
        Rect::new(
            BUTTON_INSET + index * (BUTTON_DIAMETER + BUTTON_SPACING),
            BUTTON_INSET,
            BUTTON_DIAMETER,
            BUTTON_DIAMETER,
        )
    }

    /// Deepest-first hit test: buttons sit on top of the drag strip.
    pub fn hit_test(&self, p: Point) -> Region {
        if self.drag_area.contains(p) {
            for role in ButtonRole::ALL {
                if self.button_frame(role).contains(p) {
                    return Region::TrafficLight(role);
                }
            }
            return Region::DragArea;
        }
        if self.browser.contains(p) {
            return Region::Browser;
        }
        Region::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRIP: f64 = 30.0;

    #[test]
    fn initial_layout_splits_strip_and_browser() {
        let layout = OverlayLayout::new(Size::new(550.0, 580.0), STRIP);
        assert_eq!(layout.drag_area, Rect::new(0.0, 0.0, 550.0, 30.0));
        assert_eq!(layout.browser, Rect::new(0.0, 30.0, 550.0, 550.0));
    }

    #[test]
    fn resize_keeps_strip_height_and_tracks_width() {
        let before = OverlayLayout::new(Size::new(550.0, 580.0), STRIP);
        let after = OverlayLayout::new(Size::new(800.0, 900.0), STRIP);

        assert_eq!(after.drag_area.height, before.drag_area.height);
        assert_eq!(after.drag_area.width, 800.0);
        assert_eq!(after.drag_area.y, 0.0);
        assert_eq!(after.browser.width, 800.0);
        assert_eq!(after.browser.height, 900.0 - STRIP);
        assert_eq!(after.browser.y, STRIP);
    }

    #[test]
    fn tiny_window_clamps_browser_to_zero() {
        let layout = OverlayLayout::new(Size::new(100.0, 10.0), STRIP);
        assert_eq!(layout.drag_area.height, 10.0);
        assert_eq!(layout.browser.height, 0.0);
    }

    #[test]
    fn buttons_are_laid_out_left_to_right() {
        let layout = OverlayLayout::new(Size::new(550.0, 580.0), STRIP);
        assert_eq!(layout.button_frame(ButtonRole::Close), Rect::new(8.0, 8.0, 14.0, 14.0));
        assert_eq!(layout.button_frame(ButtonRole::Minimize), Rect::new(28.0, 8.0, 14.0, 14.0));
        assert_eq!(layout.button_frame(ButtonRole::Zoom), Rect::new(48.0, 8.0, 14.0, 14.0));
    }

    #[test]
    fn bottom_left_click_near_the_top_lands_on_the_strip() {
        let content = Size::new(550.0, 580.0);
        let layout = OverlayLayout::new(content, STRIP);

        let near_top = to_top_left(Point::new(300.0, 580.0 - 5.0), content);
        assert_eq!(near_top, Point::new(300.0, 5.0));
        assert_eq!(layout.hit_test(near_top), Region::DragArea);

        let near_bottom = to_top_left(Point::new(300.0, 5.0), content);
        assert_eq!(layout.hit_test(near_bottom), Region::Browser);
    }

    #[test]
    fn layout_follows_restored_frame_not_initial_one() {
        // Autosaved frame restored at launch differs from the configured one.
        let restored = OverlayLayout::new(Size::new(720.0, 640.0), STRIP);
        assert_eq!(restored.drag_area, Rect::new(0.0, 0.0, 720.0, 30.0));
        assert_eq!(restored.browser, Rect::new(0.0, 30.0, 720.0, 610.0));
    }

    #[test]
    fn hit_test_regions() {
        let layout = OverlayLayout::new(Size::new(550.0, 580.0), STRIP);

        assert_eq!(layout.hit_test(Point::new(300.0, 15.0)), Region::DragArea);
        assert_eq!(layout.hit_test(Point::new(2.0, 2.0)), Region::DragArea);
        assert_eq!(
            layout.hit_test(Point::new(15.0, 15.0)),
            Region::TrafficLight(ButtonRole::Close)
        );
        assert_eq!(
            layout.hit_test(Point::new(55.0, 10.0)),
            Region::TrafficLight(ButtonRole::Zoom)
        );
        // Gap between close and minimize belongs to the strip.
        assert_eq!(layout.hit_test(Point::new(24.0, 15.0)), Region::DragArea);
        assert_eq!(layout.hit_test(Point::new(300.0, 30.0)), Region::Browser);
        assert_eq!(layout.hit_test(Point::new(300.0, 579.0)), Region::Browser);
        assert_eq!(layout.hit_test(Point::new(300.0, 580.0)), Region::Outside);
        assert_eq!(layout.hit_test(Point::new(-1.0, 10.0)), Region::Outside);
    }
}
