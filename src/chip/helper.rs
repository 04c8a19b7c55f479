//! Helper pane state, open/close triggers and outside-click dismissal.

use serde::{Deserialize, Serialize};

use crate::editable::Selection;
use crate::overlay::{clamp_to_viewport, PaneView, Point, Rect};
use crate::util::last_non_space_before;

/// Pane height preset, passed through to the host's pane renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneHeight {
    #[default]
    Default,
    Small,
    Full,
}

impl PaneHeight {
    pub fn pixels(self) -> f32 {
        match self {
            PaneHeight::Default => 300.0,
            PaneHeight::Small => 150.0,
            PaneHeight::Full => 500.0,
        }
    }
}

/// Open state and container-relative position of the pane
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HelperPaneState {
    pub is_open: bool,
    pub top: f32,
    pub left: f32,
}

impl HelperPaneState {
    pub fn view(&self, width: f32, height: PaneHeight) -> Option<PaneView> {
        self.is_open.then_some(PaneView {
            top: self.top,
            left: self.left,
            width,
            height: height.pixels(),
        })
    }
}

/// Options the helper pane sends with a chosen value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelperOptions {
    pub close_helper_pane: bool,
    pub replace_full_text: bool,
}

/// Whether an edit should leave the pane open.
///
/// Open for an empty document, a trigger character as the last non-space
/// character before the cursor, or a non-empty selection.
pub fn should_open_after_change(doc: &str, selection: Selection, triggers: &[char]) -> bool {
    if doc.is_empty() || !selection.is_empty() {
        return true;
    }
    last_non_space_before(doc, selection.head).is_some_and(|c| triggers.contains(&c))
}

/// Pane position for the manual toggle: just below the button, relative to
/// the editor container, kept inside the viewport's right edge.
pub fn anchor_below(button: Rect, container: Rect, pane_width: f32, viewport_width: f32, margin: f32) -> (f32, f32) {
    let top = button.bottom() - container.y;
    let left = button.x - container.x;
    (top, clamp_to_viewport(left, container.x, pane_width, viewport_width, margin))
}

/// Everything a pointer-down may land on without dismissing the pane
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DismissTargets {
    pub editor: Rect,
    pub pane: Option<Rect>,
    pub toggle: Option<Rect>,
    pub toolbar: Option<Rect>,
}

impl DismissTargets {
    pub fn is_outside(&self, p: Point) -> bool {
        let inside = self.editor.contains(p)
            || self.pane.is_some_and(|r| r.contains(p))
            || self.toggle.is_some_and(|r| r.contains(p))
            || self.toolbar.is_some_and(|r| r.contains(p));
        !inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGERS: &[char] = &['+', ':'];

    #[test]
    fn test_triggers() {
        assert!(should_open_after_change("", Selection::cursor(0), TRIGGERS));
        assert!(should_open_after_change("a +", Selection::cursor(3), TRIGGERS));
        assert!(should_open_after_change("key: ", Selection::cursor(5), TRIGGERS));
        assert!(!should_open_after_change("ab", Selection::cursor(2), TRIGGERS));
        assert!(should_open_after_change("ab", Selection::new(0, 2), TRIGGERS));
    }

    #[test]
    fn test_trigger_is_before_cursor_not_document_end() {
        assert!(should_open_after_change("a+b", Selection::cursor(2), TRIGGERS));
        assert!(!should_open_after_change("a+b", Selection::cursor(3), TRIGGERS));
    }

    #[test]
    fn test_anchor_below_clamps_right_edge() {
        let container = Rect::new(100.0, 50.0, 600.0, 30.0);
        let button = Rect::new(650.0, 55.0, 20.0, 20.0);
        let (top, left) = anchor_below(button, container, 400.0, 800.0, 8.0);
        assert_eq!(top, 25.0);
        assert_eq!(left, 800.0 - 8.0 - 400.0 - 100.0);
    }

    #[test]
    fn test_dismiss_targets() {
        let targets = DismissTargets {
            editor: Rect::new(0.0, 0.0, 100.0, 20.0),
            pane: Some(Rect::new(0.0, 20.0, 100.0, 100.0)),
            toggle: None,
            toolbar: Some(Rect::new(200.0, 0.0, 50.0, 20.0)),
        };
        assert!(!targets.is_outside(Point::new(10.0, 10.0)));
        assert!(!targets.is_outside(Point::new(10.0, 50.0)));
        assert!(!targets.is_outside(Point::new(210.0, 10.0)));
        assert!(targets.is_outside(Point::new(150.0, 300.0)));
    }
}
