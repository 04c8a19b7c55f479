//! Expanded editor: a modal shell hosting one mode view.

use crate::commands::Cmd;

use super::ModeView;

/// Container element the host portals the modal into
pub const PORTAL_CONTAINER_ID: &str = "chip-editor-expanded-portal";

/// Where a pointer event landed relative to the modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Backdrop,
    /// The dialog or anything inside it
    Content,
}

/// Modal shell. A backdrop click only closes when the matching mousedown
/// also hit the backdrop, so a drag that starts inside the dialog and ends
/// on the backdrop keeps it open.
#[derive(Debug)]
pub struct ExpandedEditor {
    view: ModeView,
    container_id: String,
    pressed_on_backdrop: bool,
}

impl ExpandedEditor {
    /// Wrap a view that was built with `is_in_expanded_mode` set
    pub fn open(view: ModeView) -> Self {
        tracing::debug!(mode = ?view.mode(), "expanded editor opened");
        Self {
            view,
            container_id: PORTAL_CONTAINER_ID.to_string(),
            pressed_on_backdrop: false,
        }
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn view(&self) -> &ModeView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ModeView {
        &mut self.view
    }

    pub fn on_mousedown(&mut self, target: PointerTarget) {
        self.pressed_on_backdrop = target == PointerTarget::Backdrop;
    }

    /// Returns `true` when the click is a close request
    pub fn on_click(&mut self, target: PointerTarget) -> bool {
        let close = self.pressed_on_backdrop && target == PointerTarget::Backdrop;
        self.pressed_on_backdrop = false;
        if close {
            tracing::debug!("expanded editor: backdrop click");
        }
        close
    }

    /// Escape goes to the hosted view first (pane, dialog); only an
    /// unclaimed Escape closes the modal
    pub fn on_escape(&mut self) -> (bool, Option<Cmd>) {
        if self.view.has_overlay_open() {
            return (false, self.view.dismiss());
        }
        (true, None)
    }

    /// Tear down the hosted view
    pub fn close(mut self) -> Option<Cmd> {
        tracing::debug!("expanded editor closed");
        self.view.unmount()
    }
}
