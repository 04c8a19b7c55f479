//! Overlay placement: helper pane and floating action buttons.
//!
//! Pure geometry. Coordinates are CSS pixels; rects handed in by the host
//! are in the same space as the pointer events it forwards.

/// A point in host pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle (a DOM bounding box)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the right edge X coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom edge Y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Position anchor for overlays inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAnchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

/// Size and anchoring of an overlay
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub anchor: OverlayAnchor,
    pub width: f32,
    pub height: f32,
    /// Margin from the container edge in pixels
    pub margin: f32,
}

impl OverlayConfig {
    pub fn new(anchor: OverlayAnchor, width: f32, height: f32) -> Self {
        Self {
            anchor,
            width,
            height,
            margin: 4.0,
        }
    }

    /// Set the margin (builder pattern)
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Place the overlay inside `container` according to the anchor
    pub fn compute_bounds(&self, container: Rect) -> Rect {
        let x = match self.anchor {
            OverlayAnchor::TopLeft | OverlayAnchor::BottomLeft => container.x + self.margin,
            OverlayAnchor::TopRight | OverlayAnchor::BottomRight => {
                container.right() - self.width - self.margin
            }
            OverlayAnchor::Center => container.x + (container.width - self.width) / 2.0,
        };

        let y = match self.anchor {
            OverlayAnchor::TopLeft | OverlayAnchor::TopRight => container.y + self.margin,
            OverlayAnchor::BottomLeft | OverlayAnchor::BottomRight => {
                container.bottom() - self.height - self.margin
            }
            OverlayAnchor::Center => container.y + (container.height - self.height) / 2.0,
        };

        Rect::new(x, y, self.width, self.height)
    }
}

/// Shift `left` (container-relative) so a box of `width` ends at least
/// `margin` before the viewport's right edge
pub fn clamp_to_viewport(left: f32, container_x: f32, width: f32, viewport_width: f32, margin: f32) -> f32 {
    let max_left = viewport_width - margin - width - container_x;
    if left > max_left {
        max_left.max(margin - container_x)
    } else {
        left
    }
}

// ============================================================================
// Helper pane
// ============================================================================

/// Where the helper pane is drawn, relative to the editor container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneView {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl PaneView {
    /// The pane's rect in host coordinates
    pub fn bounds(&self, container: Rect) -> Rect {
        Rect::new(container.x + self.left, container.y + self.top, self.width, self.height)
    }

    /// The pane swallows its own mousedown so the editor never sees a
    /// focus change from a click inside it
    pub fn intercepts_mousedown(&self, container: Rect, p: Point) -> bool {
        self.bounds(container).contains(p)
    }
}

// ============================================================================
// Floating action buttons
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatingAction {
    Expand,
    Minimize,
    ToggleHelper,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingButton {
    pub action: FloatingAction,
    pub bounds: Rect,
}

pub const FLOATING_BUTTON_SIZE: f32 = 20.0;
const FLOATING_GAP: f32 = 2.0;

/// Lay out the floating buttons in a row anchored to the editor's top-right
/// corner. The layout does not depend on whether the helper pane is open.
pub fn layout_floating_actions(editor: Rect, in_expanded_mode: bool, has_helper: bool) -> Vec<FloatingButton> {
    let mut actions = Vec::with_capacity(3);
    if has_helper {
        actions.push(FloatingAction::ToggleHelper);
    }
    actions.push(if in_expanded_mode {
        FloatingAction::Minimize
    } else {
        FloatingAction::Expand
    });

    let count = actions.len() as f32;
    let width = count * FLOATING_BUTTON_SIZE + (count - 1.0) * FLOATING_GAP;
    let row = OverlayConfig::new(OverlayAnchor::TopRight, width, FLOATING_BUTTON_SIZE).compute_bounds(editor);

    actions
        .into_iter()
        .enumerate()
        .map(|(i, action)| FloatingButton {
            action,
            bounds: Rect::new(
                row.x + i as f32 * (FLOATING_BUTTON_SIZE + FLOATING_GAP),
                row.y,
                FLOATING_BUTTON_SIZE,
                FLOATING_BUTTON_SIZE,
            ),
        })
        .collect()
}

/// The floating button under `p`, if any
pub fn hit_floating_action(buttons: &[FloatingButton], p: Point) -> Option<FloatingAction> {
    buttons.iter().find(|b| b.bounds.contains(p)).map(|b| b.action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn test_overlay_anchor_top_left() {
        let config = OverlayConfig::new(OverlayAnchor::TopLeft, 100.0, 50.0).with_margin(10.0);
        let bounds = config.compute_bounds(container());

        assert_eq!(bounds.x, 10.0);
        assert_eq!(bounds.y, 10.0);
    }

    #[test]
    fn test_overlay_anchor_bottom_right() {
        let config = OverlayConfig::new(OverlayAnchor::BottomRight, 100.0, 50.0).with_margin(10.0);
        let bounds = config.compute_bounds(container());

        assert_eq!(bounds.x, 800.0 - 100.0 - 10.0);
        assert_eq!(bounds.y, 600.0 - 50.0 - 10.0);
    }

    #[test]
    fn test_overlay_anchor_center_offset_container() {
        let config = OverlayConfig::new(OverlayAnchor::Center, 100.0, 50.0);
        let bounds = config.compute_bounds(Rect::new(100.0, 100.0, 200.0, 100.0));

        assert_eq!(bounds.x, 150.0);
        assert_eq!(bounds.y, 125.0);
    }

    #[test]
    fn test_clamp_to_viewport() {
        // Fits: unchanged
        assert_eq!(clamp_to_viewport(100.0, 50.0, 400.0, 1000.0, 8.0), 100.0);
        // Overflows the right edge: shifted back
        assert_eq!(clamp_to_viewport(700.0, 50.0, 400.0, 1000.0, 8.0), 1000.0 - 8.0 - 400.0 - 50.0);
    }

    #[test]
    fn test_pane_intercepts_own_mousedown() {
        let pane = PaneView {
            top: 30.0,
            left: 10.0,
            width: 100.0,
            height: 100.0,
        };
        let editor = Rect::new(50.0, 50.0, 300.0, 30.0);
        assert!(pane.intercepts_mousedown(editor, Point::new(70.0, 90.0)));
        assert!(!pane.intercepts_mousedown(editor, Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_floating_actions_anchor_to_corner() {
        let editor = Rect::new(0.0, 0.0, 300.0, 40.0);
        let buttons = layout_floating_actions(editor, false, true);
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].action, FloatingAction::ToggleHelper);
        assert_eq!(buttons[1].action, FloatingAction::Expand);
        assert!(buttons[1].bounds.right() <= editor.right());

        let buttons = layout_floating_actions(editor, true, false);
        assert_eq!(buttons[0].action, FloatingAction::Minimize);
        let p = Point::new(buttons[0].bounds.x + 1.0, buttons[0].bounds.y + 1.0);
        assert_eq!(hit_floating_action(&buttons, p), Some(FloatingAction::Minimize));
    }
}
